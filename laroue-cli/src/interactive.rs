use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use laroue_analysis::analyze_history;
use laroue_analysis::config::AnalysisConfig;
use laroue_db::db::{fetch_history, insert_spin};
use laroue_db::models::{new_spin, Spin, Symbol};
use laroue_db::rusqlite::Connection;

use crate::display::display_recommendations;

#[derive(Debug, PartialEq)]
enum InteractiveCommand {
    Record(Symbol),
    Undo,
    Predict,
    History,
    Stats,
    Help,
    Quit,
}

fn parse_command(input: &str) -> Option<InteractiveCommand> {
    let input = input.trim().to_lowercase();
    if let Some(symbol) = input.parse::<u8>().ok().and_then(Symbol::from_value) {
        return Some(InteractiveCommand::Record(symbol));
    }
    match input.as_str() {
        "annuler" | "undo" | "u" => Some(InteractiveCommand::Undo),
        "predire" | "prédire" | "predict" | "pred" | "p" => Some(InteractiveCommand::Predict),
        "historique" | "history" | "hist" | "h" => Some(InteractiveCommand::History),
        "stats" | "s" => Some(InteractiveCommand::Stats),
        "aide" | "help" | "?" => Some(InteractiveCommand::Help),
        "quitter" | "quit" | "q" | "exit" => Some(InteractiveCommand::Quit),
        _ => None,
    }
}

fn display_menu() {
    println!();
    println!("── Mode interactif ──");
    println!("  2 | 3 | 5 | 10  Enregistrer le tour sorti");
    println!("  annuler         Annuler le dernier tour");
    println!("  predire         Scores détaillés");
    println!("  historique      20 derniers tours");
    println!("  stats           Statistiques par valeur");
    println!("  aide            Afficher ce menu");
    println!("  quitter         Quitter");
    println!();
}

fn prompt(msg: &str) -> Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut input = String::new();
    let read = io::stdin()
        .read_line(&mut input)
        .context("Erreur de lecture")?;
    if read == 0 {
        bail!("Fin de l'entrée");
    }
    Ok(input.trim().to_string())
}

/// Enregistre le tour puis affiche les recommandations. Renvoie `false` si
/// le tour était déjà en base.
fn cmd_record(conn: &Connection, config: &AnalysisConfig, spin: &Spin) -> Result<bool> {
    let inserted = insert_spin(conn, spin)?;
    let history = fetch_history(conn)?;
    if inserted {
        println!("Tour {} enregistré ({} tours).", spin.symbol, history.len());
    } else {
        println!("Ce tour existe déjà (doublon ignoré).");
    }
    let result = analyze_history(&history, config);
    display_recommendations(&result.recommendations);
    Ok(inserted)
}

pub fn run_interactive(conn: &Connection, config: &AnalysisConfig) -> Result<()> {
    println!("Bienvenue dans le mode interactif de laroue !");
    display_menu();

    loop {
        let input = match prompt("> ") {
            Ok(s) => s,
            Err(_) => break, // EOF / Ctrl+D
        };

        if input.is_empty() {
            continue;
        }

        let outcome = match parse_command(&input) {
            Some(InteractiveCommand::Quit) => {
                println!("Au revoir !");
                break;
            }
            Some(InteractiveCommand::Record(symbol)) => {
                cmd_record(conn, config, &new_spin(symbol)).map(|_| ())
            }
            Some(InteractiveCommand::Undo) => super::cmd_undo(conn),
            Some(InteractiveCommand::Predict) => super::cmd_predict(conn, config, false),
            Some(InteractiveCommand::History) => super::cmd_list(conn, 20),
            Some(InteractiveCommand::Stats) => super::cmd_stats(conn, config),
            Some(InteractiveCommand::Help) => {
                display_menu();
                Ok(())
            }
            None => {
                println!("Commande inconnue : '{}'. Tapez 2, 3, 5, 10 ou un nom de commande.", input);
                Ok(())
            }
        };
        if let Err(e) = outcome {
            println!("Erreur: {e:#}");
        }
    }

    Ok(())
}
