mod display;
mod interactive;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use laroue_analysis::analyze_history;
use laroue_analysis::combinations::{CombinationSource, CombinationStats};
use laroue_analysis::streaks::compute_streak_breaks;
use laroue_analysis::config::{validate_config, AnalysisConfig, DEFAULT_CONFIG};
use laroue_db::db::{
    clear_spins, count_spins, db_path, delete_last_spin, fetch_history, fetch_last_spins,
    insert_spin, migrate, open_db, replace_history,
};
use laroue_db::exchange::{export_json, import_json};
use laroue_db::models::{new_spin, parse_symbol, symbols_of, Symbol};
use laroue_db::rusqlite::Connection;
use crate::display::{
    display_combinations, display_import_summary, display_probabilities,
    display_recommendations, display_spins, display_stats, display_streaks,
};

#[derive(Parser)]
#[command(name = "laroue", about = "Analyse des tours de roue (2, 3, 5, 10)")]
struct Cli {
    /// Fichier de configuration JSON (défaut : configuration intégrée)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Enregistrer un ou plusieurs tours
    Add {
        /// Valeurs sorties, dans l'ordre (2, 3, 5 ou 10)
        #[arg(required = true)]
        values: Vec<String>,
    },

    /// Annuler le dernier tour
    Undo,

    /// Lister les derniers tours
    List {
        /// Nombre de tours à afficher
        #[arg(short, long, default_value = "20")]
        last: u32,
    },

    /// Statistiques par valeur
    Stats,

    /// Scores et recommandations pour le prochain tour
    Predict {
        /// Sortie JSON complète
        #[arg(long)]
        json: bool,
    },

    /// Tables de transitions (1 = paires, 2 = triplets, 3 = quadruplets)
    Combos {
        #[arg(short, long, default_value = "1", value_parser = clap::value_parser!(u8).range(1..=3))]
        order: u8,

        /// Préfixe, ex : 2,2,3
        #[arg(short, long)]
        prefix: Option<String>,
    },

    /// Distribution des longueurs de séries
    Streaks,

    /// Importer un historique JSON (remplace l'historique courant)
    Import {
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Exporter l'historique en JSON
    Export {
        #[arg(short, long, default_value = "laroue-export.json")]
        file: PathBuf,
    },

    /// Effacer tout l'historique
    Clear,

    /// Afficher le chemin de la base de données
    DbPath,

    /// Afficher la configuration effective
    Config,

    /// Mode interactif
    Interactive,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let path = db_path();
    let conn = open_db(&path)?;
    migrate(&conn)?;

    match cli.command {
        Command::Add { values } => cmd_add(&conn, &values),
        Command::Undo => cmd_undo(&conn),
        Command::List { last } => cmd_list(&conn, last),
        Command::Stats => cmd_stats(&conn, &config),
        Command::Predict { json } => cmd_predict(&conn, &config, json),
        Command::Combos { order, prefix } => cmd_combos(&conn, order, prefix.as_deref()),
        Command::Streaks => cmd_streaks(&conn),
        Command::Import { file } => cmd_import(&conn, &file),
        Command::Export { file } => cmd_export(&conn, &file),
        Command::Clear => cmd_clear(&conn),
        Command::DbPath => {
            println!("{}", path.display());
            Ok(())
        }
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
        Command::Interactive => interactive::run_interactive(&conn, &config),
    }
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    let Some(path) = path else {
        return Ok(DEFAULT_CONFIG);
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    let config: AnalysisConfig = serde_json::from_str(&raw)
        .with_context(|| format!("Configuration invalide dans {}", path.display()))?;
    validate_config(&config)?;
    log::info!("Configuration chargée depuis {}", path.display());
    Ok(config)
}

fn parse_values(values: &[String]) -> Result<Vec<Symbol>> {
    values
        .iter()
        .flat_map(|v| v.split(','))
        .filter(|v| !v.trim().is_empty())
        .map(parse_symbol)
        .collect()
}

fn cmd_add(conn: &Connection, values: &[String]) -> Result<()> {
    let symbols = parse_values(values)?;
    if symbols.is_empty() {
        bail!("Aucune valeur à enregistrer");
    }
    for symbol in symbols {
        let spin = new_spin(symbol);
        if insert_spin(conn, &spin)? {
            println!("Tour {} enregistré.", symbol);
        } else {
            println!("Ce tour existe déjà (doublon ignoré).");
        }
    }
    Ok(())
}

fn cmd_undo(conn: &Connection) -> Result<()> {
    match delete_last_spin(conn)? {
        Some(spin) => println!("Tour {} annulé.", spin.symbol),
        None => println!("Aucun tour à annuler."),
    }
    Ok(())
}

fn cmd_list(conn: &Connection, last: u32) -> Result<()> {
    if count_spins(conn)? == 0 {
        println!("Historique vide. Lancez d'abord : laroue add <valeur>");
        return Ok(());
    }
    let spins = fetch_last_spins(conn, last)?;
    display_spins(&spins);
    Ok(())
}

fn cmd_stats(conn: &Connection, config: &AnalysisConfig) -> Result<()> {
    let history = fetch_history(conn)?;
    let result = analyze_history(&history, config);
    display_stats(&result.symbol_stats, result.total_spins);
    Ok(())
}

fn cmd_predict(conn: &Connection, config: &AnalysisConfig, json: bool) -> Result<()> {
    let history = fetch_history(conn)?;
    let result = analyze_history(&history, config);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    display_probabilities(&result.probabilities, result.total_spins);
    display_recommendations(&result.recommendations);
    Ok(())
}

fn cmd_combos(conn: &Connection, order: u8, prefix: Option<&str>) -> Result<()> {
    let source = match order {
        1 => CombinationSource::Pair,
        2 => CombinationSource::Triple,
        _ => CombinationSource::Quadruple,
    };
    let prefix = match prefix {
        Some(raw) => {
            let symbols = parse_values(&[raw.to_string()])?;
            if symbols.len() != source.order() {
                bail!(
                    "Le préfixe doit contenir {} valeur(s) pour l'ordre {}",
                    source.order(),
                    order
                );
            }
            Some(symbols)
        }
        None => None,
    };

    let history = fetch_history(conn)?;
    let combinations = CombinationStats::compute(&symbols_of(&history));
    display_combinations(combinations.table(source), source, prefix.as_deref());
    Ok(())
}

fn cmd_streaks(conn: &Connection) -> Result<()> {
    let history = fetch_history(conn)?;
    display_streaks(&compute_streak_breaks(&symbols_of(&history)));
    Ok(())
}

fn cmd_import(conn: &Connection, file: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("Impossible de lire {}", file.display()))?;
    let (spins, mut report) = import_json(&raw)?;
    let inserted = replace_history(conn, &spins)? as usize;
    // doublons d'identifiant écartés par la base
    report.skipped += report.accepted - inserted;
    report.accepted = inserted;
    display_import_summary(&report);
    Ok(())
}

fn cmd_export(conn: &Connection, file: &Path) -> Result<()> {
    let history = fetch_history(conn)?;
    let json = export_json(&history)?;
    std::fs::write(file, json)
        .with_context(|| format!("Impossible d'écrire {}", file.display()))?;
    println!("{} tours exportés vers {}", history.len(), file.display());
    Ok(())
}

fn cmd_clear(conn: &Connection) -> Result<()> {
    let removed = clear_spins(conn)?;
    println!("{} tours supprimés.", removed);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_values_accepts_commas() {
        let values = vec!["2,3".to_string(), "10".to_string()];
        assert_eq!(
            parse_values(&values).unwrap(),
            vec![Symbol::Two, Symbol::Three, Symbol::Ten]
        );
    }

    #[test]
    fn test_parse_values_rejects_unknown() {
        assert!(parse_values(&["4".to_string()]).is_err());
        assert!(parse_values(&["deux".to_string()]).is_err());
    }

    #[test]
    fn test_load_config_default() {
        assert_eq!(load_config(None).unwrap(), DEFAULT_CONFIG);
    }

    #[test]
    fn test_cli_parses_global_config() {
        let cli = Cli::try_parse_from(["laroue", "predict", "--json", "--config", "c.json"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("c.json")));
        assert!(matches!(cli.command, Command::Predict { json: true }));
    }

    #[test]
    fn test_cli_rejects_order_out_of_range() {
        assert!(Cli::try_parse_from(["laroue", "combos", "--order", "4"]).is_err());
        assert!(Cli::try_parse_from(["laroue", "combos", "--order", "3", "--prefix", "2,2,3"]).is_ok());
    }
}
