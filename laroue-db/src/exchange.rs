use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde_json::Value;

use crate::models::{generate_id, Spin, Symbol};

/// Document d'échange : `{ "history": [...], "timestamp": <ms> }`.
#[derive(Debug, Serialize)]
pub struct HistoryDocument<'a> {
    pub history: &'a [Spin],
    pub timestamp: i64,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ImportReport {
    pub total_records: usize,
    pub accepted: usize,
    pub skipped: usize,
}

pub fn export_json(spins: &[Spin]) -> Result<String> {
    let doc = HistoryDocument {
        history: spins,
        timestamp: chrono::Utc::now().timestamp_millis(),
    };
    let json = serde_json::to_string_pretty(&doc)
        .context("Échec de la sérialisation de l'historique")?;
    log::info!("Export de {} tours", spins.len());
    Ok(json)
}

/// Lecture tolérante : les entrées sans valeur de roue valide sont ignorées,
/// un identifiant ou un horodatage manquant est reconstitué.
pub fn import_json(json: &str) -> Result<(Vec<Spin>, ImportReport)> {
    let doc: Value = serde_json::from_str(json)
        .context("JSON invalide")?;
    let entries = match doc.get("history").and_then(Value::as_array) {
        Some(entries) => entries,
        None => bail!("Champ 'history' absent ou invalide"),
    };

    let now = chrono::Utc::now().timestamp_millis();
    let mut report = ImportReport {
        total_records: entries.len(),
        ..ImportReport::default()
    };
    let mut spins = Vec::with_capacity(entries.len());

    for (i, entry) in entries.iter().enumerate() {
        match sanitize_entry(entry, now) {
            Some(spin) => spins.push(spin),
            None => {
                log::warn!("Entrée {} ignorée : {}", i, entry);
                report.skipped += 1;
            }
        }
    }
    report.accepted = spins.len();
    log::info!("Import : {} acceptés, {} ignorés", report.accepted, report.skipped);
    Ok((spins, report))
}

/// Valeur de roue depuis un nombre JSON ; `2.0` vaut `2`, `2.5` est rejeté.
fn wheel_value(raw: &Value) -> Option<Symbol> {
    let value = match raw.as_u64() {
        Some(v) => v,
        None => {
            let f = raw.as_f64()?;
            if f.fract() != 0.0 || !(0.0..=u8::MAX as f64).contains(&f) {
                return None;
            }
            f as u64
        }
    };
    Symbol::from_value(u8::try_from(value).ok()?)
}

fn sanitize_entry(entry: &Value, now: i64) -> Option<Spin> {
    let obj = entry.as_object()?;
    let symbol = wheel_value(obj.get("number")?)?;

    let timestamp = obj
        .get("timestamp")
        .and_then(Value::as_f64)
        .map(|t| t as i64)
        .unwrap_or(now);
    let id = match obj.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => generate_id(timestamp),
    };

    Some(Spin { id, symbol, timestamp })
}
