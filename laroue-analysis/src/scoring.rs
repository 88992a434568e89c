use serde::Serialize;

use laroue_db::models::Symbol;
use crate::combinations::{CombinationSource, CombinationStats};
use crate::config::AnalysisConfig;
use crate::stats::{current_streak, recent_ratio, tail, SymbolStats};
use crate::streaks::StreakBreakStats;

/// Score neutre quand l'historique ne dit rien.
pub const NEUTRAL_SCORE: f64 = 25.0;

const TREND_WINDOW: usize = 20;
const MAX_STREAK_PENALTY: f64 = 35.0;
const MIN_PROBABILITY: f64 = 5.0;
const UNSEEN_COMBINATION_CAP: f64 = 15.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbabilityAnalysis {
    pub symbol: Symbol,
    /// Score heuristique sur 0..100, pas une probabilité calibrée.
    pub probability: f64,
    pub frequency_score: f64,
    pub hot_cold_score: f64,
    pub trend_score: f64,
    pub confidence: f64,
    pub combination_score: f64,
    pub combination_source: Option<CombinationSource>,
    pub combination_count: u32,
}

pub fn frequency_score(stats: &SymbolStats, total_spins: usize) -> f64 {
    if total_spins == 0 {
        return NEUTRAL_SCORE;
    }
    stats.percentage
}

pub fn hot_cold_score(stats: &SymbolStats, history: &[Symbol], recent_window: usize) -> f64 {
    if tail(history, recent_window).is_empty() {
        return NEUTRAL_SCORE;
    }
    let recent_pct = recent_ratio(history, stats.symbol, recent_window) * 100.0;

    if stats.is_hot {
        return (recent_pct * 1.5).min(100.0);
    }
    // Pénalité modérée : un symbole froid peut être « dû ».
    if stats.is_cold {
        return (recent_pct * 0.5 + 15.0).max(10.0);
    }
    recent_pct
}

/// Part pondérée sur les 20 derniers tours (poids croissant vers le présent)
/// plus un bonus de fraîcheur.
pub fn trend_score(stats: &SymbolStats, history: &[Symbol]) -> f64 {
    if history.is_empty() {
        return NEUTRAL_SCORE;
    }

    let mut weighted_sum = 0.0f64;
    let mut total_weight = 0.0f64;
    for (i, &symbol) in tail(history, TREND_WINDOW).iter().enumerate() {
        let weight = (i + 1) as f64;
        total_weight += weight;
        if symbol == stats.symbol {
            weighted_sum += weight;
        }
    }
    if total_weight == 0.0 {
        return NEUTRAL_SCORE;
    }
    let weighted_pct = weighted_sum / total_weight * 100.0;

    match stats.last_seen_index {
        Some(last_seen) => {
            let recency_bonus = (20.0 - last_seen as f64 * 2.0).max(0.0);
            (weighted_pct + recency_bonus).min(100.0)
        }
        None => weighted_pct,
    }
}

/// Confiance en fonction de la taille de l'historique, avec un bonus si une
/// combinaison observée a servi.
pub fn confidence(total_spins: usize, combination_used: bool) -> f64 {
    let base = match total_spins {
        n if n >= 50 => 0.9,
        n if n >= 30 => 0.75,
        n if n >= 15 => 0.6,
        n if n >= 5 => 0.4,
        _ => 0.2,
    };
    if combination_used {
        (base + 0.1f64).min(0.95)
    } else {
        base
    }
}

/// Pénalité liée à la série en cours, d'après la distribution des arrêts.
pub fn streak_penalty(streak: &StreakBreakStats, current: usize) -> f64 {
    let share = streak
        .break_at(current)
        .map(|b| b.percentage)
        .unwrap_or_else(|| streak.cumulative_break_pct(current) * 0.5);
    (share * 0.8).min(MAX_STREAK_PENALTY)
}

pub fn analyze_probabilities(
    symbol_stats: &[SymbolStats],
    history: &[Symbol],
    combinations: &CombinationStats,
    streak_breaks: &[StreakBreakStats],
    config: &AnalysisConfig,
) -> Vec<ProbabilityAnalysis> {
    let total_spins = history.len();

    symbol_stats
        .iter()
        .map(|stats| {
            let frequency_score = frequency_score(stats, total_spins);
            let hot_cold_score = hot_cold_score(stats, history, config.recent_window);
            let trend_score = trend_score(stats, history);
            let combination = combinations.lookup(history, stats.symbol);

            let mut probability = match combination.source {
                Some(_) if total_spins >= 1 => {
                    if combination.score == 0.0 {
                        // combinaison jamais suivie de ce symbole : pas de zéro sec
                        (frequency_score * 0.5).min(UNSEEN_COMBINATION_CAP)
                    } else {
                        combination.score
                    }
                }
                _ => {
                    frequency_score * config.frequency_weight
                        + hot_cold_score * config.hot_cold_weight
                        + trend_score * config.trend_weight
                }
            };

            let streak = current_streak(history, stats.symbol);
            if streak >= 1 {
                let profile = streak_breaks
                    .iter()
                    .find(|s| s.symbol == stats.symbol)
                    .filter(|s| !s.break_distribution.is_empty());
                if let Some(profile) = profile {
                    let penalty = streak_penalty(profile, streak);
                    probability = (probability - penalty).max(MIN_PROBABILITY);
                }
            }

            ProbabilityAnalysis {
                symbol: stats.symbol,
                probability,
                frequency_score,
                hot_cold_score,
                trend_score,
                confidence: confidence(total_spins, combination.source.is_some() && combination.count > 0),
                combination_score: combination.score,
                combination_source: combination.source,
                combination_count: combination.count,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_CONFIG;
    use crate::stats::compute_symbol_stats;
    use crate::streaks::compute_streak_breaks;
    use laroue_db::models::Symbol::{Five, Ten, Three, Two};

    fn analyze(history: &[Symbol]) -> Vec<ProbabilityAnalysis> {
        let stats = compute_symbol_stats(history, &DEFAULT_CONFIG);
        let combinations = CombinationStats::compute(history);
        let streaks = compute_streak_breaks(history);
        analyze_probabilities(&stats, history, &combinations, &streaks, &DEFAULT_CONFIG)
    }

    fn prob_for(probs: &[ProbabilityAnalysis], symbol: Symbol) -> &ProbabilityAnalysis {
        probs.iter().find(|p| p.symbol == symbol).unwrap()
    }

    #[test]
    fn test_empty_history_neutral_scores() {
        let probs = analyze(&[]);
        assert_eq!(probs.len(), 4);
        for p in &probs {
            assert_eq!(p.frequency_score, NEUTRAL_SCORE);
            assert_eq!(p.hot_cold_score, NEUTRAL_SCORE);
            assert_eq!(p.trend_score, NEUTRAL_SCORE);
            assert_eq!(p.confidence, 0.2);
            assert_eq!(p.combination_source, None);
            // 25 * (0.6 + 0.2 + 0.2)
            assert!((p.probability - 25.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_blend_uses_each_weight() {
        let config = AnalysisConfig {
            frequency_weight: 1.0,
            hot_cold_weight: 0.5,
            trend_weight: 0.0,
            ..DEFAULT_CONFIG
        };
        let history: Vec<Symbol> = Vec::new();
        let stats = compute_symbol_stats(&history, &config);
        let combinations = CombinationStats::compute(&history);
        let streaks = compute_streak_breaks(&history);
        let probs = analyze_probabilities(&stats, &history, &combinations, &streaks, &config);
        for p in &probs {
            // 25 * 1.0 + 25 * 0.5 + 25 * 0.0
            assert!((p.probability - 37.5).abs() < 1e-9, "{:?}", p);
        }

        let trend_only = AnalysisConfig {
            frequency_weight: 0.0,
            hot_cold_weight: 0.0,
            trend_weight: 2.0,
            ..DEFAULT_CONFIG
        };
        let probs = analyze_probabilities(&stats, &history, &combinations, &streaks, &trend_only);
        assert!(probs.iter().all(|p| (p.probability - 50.0).abs() < 1e-9));
    }

    #[test]
    fn test_confidence_steps() {
        assert_eq!(confidence(0, false), 0.2);
        assert_eq!(confidence(4, false), 0.2);
        assert_eq!(confidence(5, false), 0.4);
        assert_eq!(confidence(15, false), 0.6);
        assert_eq!(confidence(30, false), 0.75);
        assert_eq!(confidence(50, false), 0.9);
        assert!((confidence(5, true) - 0.5).abs() < 1e-12);
        assert_eq!(confidence(50, true), 0.95);
    }

    #[test]
    fn test_trend_score_weights_recent() {
        let history = vec![Two, Three];
        let stats = compute_symbol_stats(&history, &DEFAULT_CONFIG);
        let two = stats.iter().find(|s| s.symbol == Two).unwrap();
        let three = stats.iter().find(|s| s.symbol == Three).unwrap();
        // poids 1 et 2 sur un total de 3, bonus 18 et 20
        assert!((trend_score(two, &history) - (100.0 / 3.0 + 18.0)).abs() < 1e-9);
        assert!((trend_score(three, &history) - (200.0 / 3.0 + 20.0)).abs() < 1e-9);

        let ten = stats.iter().find(|s| s.symbol == Ten).unwrap();
        assert_eq!(trend_score(ten, &history), 0.0);
    }

    #[test]
    fn test_trend_score_capped() {
        let history = vec![Five; 10];
        let stats = compute_symbol_stats(&history, &DEFAULT_CONFIG);
        let five = stats.iter().find(|s| s.symbol == Five).unwrap();
        assert_eq!(trend_score(five, &history), 100.0);
    }

    #[test]
    fn test_hot_cold_score() {
        let history: Vec<Symbol> = [Two; 12].into_iter().chain([Three; 3]).collect();
        let stats = compute_symbol_stats(&history, &DEFAULT_CONFIG);
        let two = stats.iter().find(|s| s.symbol == Two).unwrap();
        let three = stats.iter().find(|s| s.symbol == Three).unwrap();
        let ten = stats.iter().find(|s| s.symbol == Ten).unwrap();
        assert!(two.is_hot);
        assert_eq!(hot_cold_score(two, &history, 15), 100.0);
        // 20 % : ni chaud ni froid
        assert!((hot_cold_score(three, &history, 15) - 20.0).abs() < 1e-9);
        assert!(ten.is_cold);
        assert_eq!(hot_cold_score(ten, &history, 15), 15.0);
    }

    #[test]
    fn test_unseen_combination_is_not_zero() {
        // contexte 2 -> 2 -> 3 jamais suivi de 3
        let history = vec![Two, Two, Three, Two, Two, Three, Two, Two, Three];
        let probs = analyze(&history);
        let two = prob_for(&probs, Two);
        assert_eq!(two.combination_source, Some(CombinationSource::Quadruple));
        assert_eq!(two.probability, 100.0);
        assert!((two.confidence - 0.5).abs() < 1e-12);

        let five = prob_for(&probs, Five);
        assert_eq!(five.combination_count, 0);
        assert_eq!(five.probability, 0.0);
        assert_eq!(five.confidence, 0.4);
    }

    #[test]
    fn test_streak_penalty_floor() {
        // 3 est en série de 1 et ses séries s'arrêtent toujours à 1
        let history = vec![Two, Two, Three, Two, Two, Three, Two, Two, Three];
        let probs = analyze(&history);
        let three = prob_for(&probs, Three);
        // min(15, 33.3 * 0.5) = 15, pénalité min(35, 80) = 35, plancher 5
        assert_eq!(three.probability, MIN_PROBABILITY);
    }

    #[test]
    fn test_streak_penalty_value() {
        let history = vec![Two, Three, Two, Three, Two, Three, Two, Two];
        let streaks = compute_streak_breaks(&history);
        let two = streaks.iter().find(|s| s.symbol == Two).unwrap();
        // séries de 2 : longueurs 1, 1, 1, 2 -> 75 % / 25 %
        assert!((streak_penalty(two, 2) - 20.0).abs() < 1e-9);
        assert_eq!(streak_penalty(two, 1), MAX_STREAK_PENALTY);
        // longueur jamais atteinte : moitié de la part cumulée
        assert_eq!(streak_penalty(two, 3), MAX_STREAK_PENALTY);
    }

    #[test]
    fn test_frequency_monotonic() {
        let low = vec![Two, Three, Five, Ten, Three, Five];
        let high = vec![Two, Three, Five, Ten, Two, Five];
        let low_two = prob_for(&analyze(&low), Two).frequency_score;
        let high_two = prob_for(&analyze(&high), Two).frequency_score;
        assert!(high_two >= low_two);
    }

    #[test]
    fn test_probabilities_bounded() {
        let history = crate::make_test_history(120);
        for p in analyze(&history) {
            assert!(p.probability >= 0.0 && p.probability <= 100.0, "{:?}", p);
            assert!(p.confidence <= 0.95);
        }
    }
}
