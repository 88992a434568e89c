use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

use crate::models::{Spin, Symbol};

// `seq` porte l'ordre d'insertion : c'est lui, et non l'horodatage, qui fait foi.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS spins (
    seq        INTEGER PRIMARY KEY AUTOINCREMENT,
    id         TEXT NOT NULL UNIQUE,
    number     INTEGER NOT NULL,
    timestamp  INTEGER NOT NULL
);
";

pub fn db_path() -> std::path::PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("laroue.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Impossible de créer le répertoire {:?}", parent))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Impossible d'ouvrir la base {:?}", path))?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("Échec de la migration")?;
    Ok(())
}

pub fn insert_spin(conn: &Connection, spin: &Spin) -> Result<bool> {
    let changed = conn.execute(
        "INSERT OR IGNORE INTO spins (id, number, timestamp) VALUES (?1, ?2, ?3)",
        rusqlite::params![spin.id, spin.symbol.value(), spin.timestamp],
    ).context("Échec de l'insertion")?;
    Ok(changed > 0)
}

fn row_to_spin(row: &rusqlite::Row<'_>) -> rusqlite::Result<Spin> {
    let value: u8 = row.get(1)?;
    let symbol = Symbol::from_value(value).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            rusqlite::types::Type::Integer,
            format!("valeur {} hors roue", value).into(),
        )
    })?;
    Ok(Spin {
        id: row.get(0)?,
        symbol,
        timestamp: row.get(2)?,
    })
}

/// Historique complet, du plus ancien au plus récent.
pub fn fetch_history(conn: &Connection) -> Result<Vec<Spin>> {
    let mut stmt = conn.prepare(
        "SELECT id, number, timestamp FROM spins ORDER BY seq ASC"
    )?;
    let spins = stmt.query_map([], row_to_spin)?
        .collect::<Result<Vec<_>, _>>()
        .context("Lecture de l'historique impossible")?;
    Ok(spins)
}

/// Derniers tours, le plus récent en premier.
pub fn fetch_last_spins(conn: &Connection, limit: u32) -> Result<Vec<Spin>> {
    let mut stmt = conn.prepare(
        "SELECT id, number, timestamp FROM spins ORDER BY seq DESC LIMIT ?1"
    )?;
    let spins = stmt.query_map([limit], row_to_spin)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(spins)
}

pub fn count_spins(conn: &Connection) -> Result<u32> {
    let count: u32 = conn.query_row("SELECT COUNT(*) FROM spins", [], |row| row.get(0))?;
    Ok(count)
}

/// Supprime le dernier tour enregistré et le renvoie.
pub fn delete_last_spin(conn: &Connection) -> Result<Option<Spin>> {
    let last = fetch_last_spins(conn, 1)?.into_iter().next();
    if let Some(spin) = &last {
        conn.execute("DELETE FROM spins WHERE id = ?1", [&spin.id])
            .context("Échec de la suppression")?;
    }
    Ok(last)
}

pub fn clear_spins(conn: &Connection) -> Result<usize> {
    let removed = conn.execute("DELETE FROM spins", [])
        .context("Échec de la purge")?;
    Ok(removed)
}

/// Remplace tout l'historique en une seule transaction. Renvoie le nombre de tours insérés.
pub fn replace_history(conn: &Connection, spins: &[Spin]) -> Result<u32> {
    let tx = conn.unchecked_transaction()
        .context("Impossible de démarrer la transaction")?;
    tx.execute("DELETE FROM spins", [])
        .context("Échec de la purge")?;

    let mut inserted = 0u32;
    for spin in spins {
        if insert_spin(&tx, spin)? {
            inserted += 1;
        } else {
            log::warn!("Identifiant en double ignoré : {}", spin.id);
        }
    }

    tx.commit().context("Échec du commit")?;
    log::info!("Historique remplacé : {} tours", inserted);
    Ok(inserted)
}
