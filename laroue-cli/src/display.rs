use comfy_table::{Table, ContentArrangement, presets::UTF8_FULL, Cell, Color};

use laroue_analysis::combinations::{CombinationSource, TransitionGroup, TransitionTable};
use laroue_analysis::recommend::Recommendation;
use laroue_analysis::scoring::ProbabilityAnalysis;
use laroue_analysis::stats::SymbolStats;
use laroue_analysis::streaks::StreakBreakStats;
use laroue_db::exchange::ImportReport;
use laroue_db::models::{Spin, Symbol};

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn format_timestamp(timestamp: i64) -> String {
    match chrono::DateTime::from_timestamp_millis(timestamp) {
        Some(dt) => dt
            .with_timezone(&chrono::Local)
            .format("%d/%m/%Y %H:%M:%S")
            .to_string(),
        None => "—".to_string(),
    }
}

fn format_path(symbols: &[Symbol]) -> String {
    symbols
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(" → ")
}

pub fn display_spins(spins: &[Spin]) {
    if spins.is_empty() {
        println!("Aucun tour à afficher.");
        return;
    }

    let mut table = new_table(vec!["Date", "Valeur", "Identifiant"]);
    for spin in spins {
        table.add_row(vec![
            format_timestamp(spin.timestamp),
            format!("{:>2}", spin.symbol),
            spin.id.clone(),
        ]);
    }
    println!("{table}");
}

pub fn display_import_summary(report: &ImportReport) {
    println!("Import terminé :");
    println!("  Entrées lues      : {}", report.total_records);
    println!("  Insérées          : {}", report.accepted);
    if report.skipped > 0 {
        println!("  Ignorées          : {}", report.skipped);
    }
}

fn hot_cold_cell(stats: &SymbolStats) -> Cell {
    if stats.is_hot {
        Cell::new("Chaud").fg(Color::Red)
    } else if stats.is_cold {
        Cell::new("Froid").fg(Color::Blue)
    } else {
        Cell::new("Normal")
    }
}

pub fn display_stats(stats: &[SymbolStats], total_spins: usize) {
    println!("\n📊 Statistiques sur {} tours\n", total_spins);

    let mut table = new_table(vec![
        "Valeur", "Sorties", "Part", "Dernière", "Intervalle moy.",
        "5 derniers", "10 derniers", "20 derniers", "Tendance",
    ]);

    for s in stats {
        let last_seen = match s.last_seen_index {
            Some(0) => "dernier tour".to_string(),
            Some(n) => format!("il y a {} tours", n),
            None => "jamais".to_string(),
        };
        table.add_row(vec![
            Cell::new(format!("{:>2}", s.symbol)),
            Cell::new(s.count),
            Cell::new(format!("{:.2}%", s.percentage)),
            Cell::new(last_seen),
            Cell::new(format!("{:.1}", s.average_interval)),
            Cell::new(format!("{} ({:.0}%)", s.count_last5, s.pct_last5)),
            Cell::new(format!("{} ({:.0}%)", s.count_last10, s.pct_last10)),
            Cell::new(format!("{} ({:.0}%)", s.count_last20, s.pct_last20)),
            hot_cold_cell(s),
        ]);
    }
    println!("{table}");
}

pub fn display_probabilities(probs: &[ProbabilityAnalysis], total_spins: usize) {
    println!("\n🎯 Scores pour le prochain tour ({} tours analysés)\n", total_spins);

    let mut table = new_table(vec![
        "Valeur", "Score", "Fréquence", "Chaud/froid", "Tendance", "Combinaison", "Confiance",
    ]);

    let mut sorted = probs.to_vec();
    sorted.sort_by(|a, b| b.probability.partial_cmp(&a.probability).unwrap_or(std::cmp::Ordering::Equal));

    for p in &sorted {
        let combination = match p.combination_source {
            Some(source) => format!("{} {:.1}% ({}×)", source, p.combination_score, p.combination_count),
            None => "—".to_string(),
        };
        table.add_row(vec![
            format!("{:>2}", p.symbol),
            format!("{:.2}", p.probability),
            format!("{:.2}", p.frequency_score),
            format!("{:.2}", p.hot_cold_score),
            format!("{:.2}", p.trend_score),
            combination,
            format!("{:.0}%", p.confidence * 100.0),
        ]);
    }
    println!("{table}");
}

pub fn display_recommendations(recommendations: &[Recommendation]) {
    println!("\n🎲 Recommandations\n");
    for (i, rec) in recommendations.iter().enumerate() {
        println!(
            "  {}. {:>2}  (score {:.2}, confiance {:.0}%)",
            i + 1,
            rec.symbol,
            rec.probability,
            rec.confidence * 100.0
        );
        println!("     {}", rec.reason);
    }
}

fn add_group_rows(table: &mut Table, group: &TransitionGroup) {
    for t in &group.transitions {
        let color = if t.count == 0 { Color::DarkGrey } else { Color::Reset };
        table.add_row(vec![
            Cell::new(format_path(&group.prefix)),
            Cell::new(t.next).fg(color),
            Cell::new(t.count).fg(color),
            Cell::new(format!("{:.2}%", t.percentage)).fg(color),
        ]);
    }
}

pub fn display_combinations(
    table: &TransitionTable,
    source: CombinationSource,
    prefix: Option<&[Symbol]>,
) {
    println!("\n🔗 Transitions par {} ({} observations)\n", source, table.total);

    let mut out = new_table(vec!["Après", "Suivant", "Nombre", "Part"]);
    match prefix {
        Some(prefix) => match table.group(prefix) {
            Some(group) if group.total > 0 => add_group_rows(&mut out, group),
            _ => {
                println!("Préfixe {} jamais observé.", format_path(prefix));
                return;
            }
        },
        None => {
            let observed: Vec<&TransitionGroup> =
                table.groups.iter().filter(|g| g.total > 0).collect();
            if observed.is_empty() {
                println!("Pas encore assez de tours.");
                return;
            }
            for group in observed {
                add_group_rows(&mut out, group);
            }
        }
    }
    println!("{out}");
}

pub fn display_streaks(streaks: &[StreakBreakStats]) {
    println!("\n📈 Longueur des séries\n");

    let mut table = new_table(vec![
        "Valeur", "Séries", "Longueur moy.", "Max", "Arrêt le plus fréquent", "Distribution",
    ]);

    for s in streaks {
        let distribution = s
            .break_distribution
            .iter()
            .filter(|b| b.count > 0)
            .map(|b| format!("{}: {:.0}%", b.streak_length, b.percentage))
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            format!("{:>2}", s.symbol),
            s.total_streaks.to_string(),
            format!("{:.2}", s.average_streak_length),
            s.max_observed_streak.to_string(),
            s.most_common_break_after.to_string(),
            distribution,
        ]);
    }
    println!("{table}");
}
