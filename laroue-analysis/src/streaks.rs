use serde::Serialize;

use laroue_db::models::Symbol;
use crate::percent::{exact_percent, normalize_percentages, sort_by_share_desc, Share};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakBreakItem {
    pub streak_length: usize,
    /// Nombre de séries qui se sont arrêtées à cette longueur.
    pub count: u32,
    pub percentage: f64,
}

impl Share for StreakBreakItem {
    fn count(&self) -> u32 {
        self.count
    }
    fn percentage(&self) -> f64 {
        self.percentage
    }
    fn percentage_mut(&mut self) -> &mut f64 {
        &mut self.percentage
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakBreakStats {
    pub symbol: Symbol,
    /// Longueurs 1..=max, triées par part décroissante.
    pub break_distribution: Vec<StreakBreakItem>,
    pub total_streaks: u32,
    pub average_streak_length: f64,
    pub most_common_break_after: usize,
    pub max_observed_streak: usize,
}

impl StreakBreakStats {
    pub fn break_at(&self, streak_length: usize) -> Option<&StreakBreakItem> {
        self.break_distribution
            .iter()
            .find(|b| b.streak_length == streak_length)
    }

    /// Part cumulée des arrêts à une longueur inférieure ou égale.
    pub fn cumulative_break_pct(&self, streak_length: usize) -> f64 {
        self.break_distribution
            .iter()
            .filter(|b| b.streak_length <= streak_length)
            .map(|b| b.percentage)
            .sum()
    }
}

/// Découpe l'historique en séries maximales de symboles identiques.
pub fn runs(history: &[Symbol]) -> Vec<(Symbol, usize)> {
    let mut runs: Vec<(Symbol, usize)> = Vec::new();
    for &symbol in history {
        match runs.last_mut() {
            Some((last, len)) if *last == symbol => *len += 1,
            _ => runs.push((symbol, 1)),
        }
    }
    runs
}

pub fn compute_streak_breaks(history: &[Symbol]) -> Vec<StreakBreakStats> {
    let mut lengths_by_symbol: [Vec<usize>; Symbol::COUNT] = Default::default();
    for (symbol, len) in runs(history) {
        lengths_by_symbol[symbol.index()].push(len);
    }

    Symbol::ALL
        .iter()
        .map(|&symbol| {
            let lengths = &lengths_by_symbol[symbol.index()];
            let total_streaks = lengths.len() as u32;
            let max_observed_streak = lengths.iter().copied().max().unwrap_or(0);
            let average_streak_length = if lengths.is_empty() {
                0.0
            } else {
                lengths.iter().sum::<usize>() as f64 / lengths.len() as f64
            };

            let mut count_by_length = vec![0u32; max_observed_streak + 1];
            for &len in lengths {
                count_by_length[len] += 1;
            }

            let mut break_distribution = Vec::with_capacity(max_observed_streak);
            let mut most_common_break_after = 1;
            let mut max_count = 0;
            for len in 1..=max_observed_streak {
                let count = count_by_length[len];
                break_distribution.push(StreakBreakItem {
                    streak_length: len,
                    count,
                    percentage: exact_percent(count as f64, total_streaks as f64),
                });
                if count > max_count {
                    max_count = count;
                    most_common_break_after = len;
                }
            }
            normalize_percentages(&mut break_distribution);
            sort_by_share_desc(&mut break_distribution);

            StreakBreakStats {
                symbol,
                break_distribution,
                total_streaks,
                average_streak_length,
                most_common_break_after,
                max_observed_streak,
            }
        })
        .collect()
}
