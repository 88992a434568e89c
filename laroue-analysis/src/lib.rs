pub mod combinations;
pub mod config;
pub mod percent;
pub mod recommend;
pub mod scoring;
pub mod stats;
pub mod streaks;

use serde::Serialize;

use laroue_db::models::{symbols_of, Spin, Symbol};
use crate::combinations::CombinationStats;
use crate::config::AnalysisConfig;
use crate::recommend::{generate_recommendations, Recommendation};
use crate::scoring::{analyze_probabilities, ProbabilityAnalysis};
use crate::stats::{compute_symbol_stats, SymbolStats};
use crate::streaks::{compute_streak_breaks, StreakBreakStats};

/// Résultat complet d'une analyse, recalculé entièrement à chaque appel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallStatistics {
    pub total_spins: usize,
    pub symbol_stats: Vec<SymbolStats>,
    pub probabilities: Vec<ProbabilityAnalysis>,
    pub recommendations: Vec<Recommendation>,
    pub combinations: CombinationStats,
    pub streak_breaks: Vec<StreakBreakStats>,
}

/// spins[0] = tour le plus ancien. L'ordre du tableau fait foi, pas l'horodatage.
pub fn analyze_history(spins: &[Spin], config: &AnalysisConfig) -> OverallStatistics {
    analyze_sequence(&symbols_of(spins), config)
}

pub fn analyze_sequence(history: &[Symbol], config: &AnalysisConfig) -> OverallStatistics {
    let symbol_stats = compute_symbol_stats(history, config);
    let combinations = CombinationStats::compute(history);
    let streak_breaks = compute_streak_breaks(history);
    let probabilities = analyze_probabilities(
        &symbol_stats,
        history,
        &combinations,
        &streak_breaks,
        config,
    );
    let recommendations = generate_recommendations(
        &probabilities,
        &symbol_stats,
        history,
        &combinations,
        &streak_breaks,
    );

    log::debug!(
        "Analyse : {} tours, {} paires, {} triplets, {} quadruplets",
        history.len(),
        combinations.total_pairs(),
        combinations.total_triples(),
        combinations.total_quadruples()
    );

    OverallStatistics {
        total_spins: history.len(),
        symbol_stats,
        probabilities,
        recommendations,
        combinations,
        streak_breaks,
    }
}

/// Séquence déterministe sans motif trivial, pour les tests.
pub fn make_test_history(n: usize) -> Vec<Symbol> {
    (0..n)
        .map(|i| Symbol::ALL[(i * 7 + i / 3 + (i * i) % 5) % Symbol::COUNT])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinations::CombinationSource;
    use crate::config::DEFAULT_CONFIG;
    use laroue_db::models::Symbol::{Three, Two};

    fn spins_of(symbols: &[Symbol]) -> Vec<Spin> {
        symbols
            .iter()
            .enumerate()
            .map(|(i, &symbol)| Spin {
                id: format!("{:03}", i),
                symbol,
                // horodatages volontairement décroissants
                timestamp: 1_000_000 - i as i64,
            })
            .collect()
    }

    #[test]
    fn test_empty_history() {
        let result = analyze_history(&[], &DEFAULT_CONFIG);
        assert_eq!(result.total_spins, 0);
        assert!(result.symbol_stats.iter().all(|s| s.count == 0 && s.percentage == 0.0));
        assert!(result.probabilities.iter().all(|p| p.confidence == 0.2));
        assert_eq!(result.recommendations.len(), 2);
        assert_eq!(result.combinations.total_pairs(), 0);
        assert_eq!(result.combinations.total_quadruples(), 0);
        assert!(result.streak_breaks.iter().all(|s| s.total_streaks == 0));
    }

    #[test]
    fn test_idempotent() {
        let spins = spins_of(&make_test_history(45));
        let first = analyze_history(&spins, &DEFAULT_CONFIG);
        let second = analyze_history(&spins, &DEFAULT_CONFIG);
        assert_eq!(first, second);
        let a = serde_json::to_string(&first).unwrap();
        let b = serde_json::to_string(&second).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_array_order_is_chronology() {
        let symbols = vec![Two, Two, Three];
        let result = analyze_history(&spins_of(&symbols), &DEFAULT_CONFIG);
        let three = result.symbol_stats.iter().find(|s| s.symbol == Three).unwrap();
        assert_eq!(three.last_seen_index, Some(0));
    }

    #[test]
    fn test_end_to_end_alternating() {
        let symbols = vec![Two, Two, Three, Two, Two, Three, Two, Two, Three];
        let result = analyze_history(&spins_of(&symbols), &DEFAULT_CONFIG);
        assert_eq!(result.total_spins, 9);

        let from_two = result.combinations.pairs.group(&[Two]).unwrap();
        assert_eq!(from_two.total, 6);
        assert_eq!(from_two.find(Two).unwrap().count, 3);
        assert_eq!(from_two.find(Three).unwrap().count, 3);
        assert!((from_two.find(Two).unwrap().percentage - 50.0).abs() < 1e-9);

        let top = &result.recommendations[0];
        assert_eq!(top.symbol, Two);
        assert_eq!(top.combination_source, Some(CombinationSource::Quadruple));
        assert!(top.reason.contains("après 2→2→3"), "{}", top.reason);
    }

    #[test]
    fn test_confidence_boundaries_without_bonus() {
        // une série constante n'alimente aucune combinaison pour les autres symboles
        for (n, expected) in [(5usize, 0.4), (15, 0.6), (30, 0.75), (50, 0.9)] {
            let result = analyze_sequence(&vec![Two; n], &DEFAULT_CONFIG);
            let three = result.probabilities.iter().find(|p| p.symbol == Three).unwrap();
            assert_eq!(three.combination_count, 0);
            assert_eq!(three.confidence, expected, "n = {}", n);
        }
    }

    #[test]
    fn test_totals_for_lengths() {
        for n in [0usize, 1, 2, 3, 4, 10] {
            let result = analyze_sequence(&make_test_history(n), &DEFAULT_CONFIG);
            assert_eq!(result.combinations.total_pairs(), n.saturating_sub(1));
            assert_eq!(result.combinations.total_triples(), n.saturating_sub(2));
            assert_eq!(result.combinations.total_quadruples(), n.saturating_sub(3));
        }
    }

    #[test]
    fn test_make_test_history_uses_all_symbols() {
        let history = make_test_history(40);
        for symbol in Symbol::ALL {
            assert!(history.contains(&symbol), "{} absent", symbol);
        }
    }
}
