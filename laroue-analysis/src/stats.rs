use serde::Serialize;

use laroue_db::models::Symbol;
use crate::config::AnalysisConfig;
use crate::percent::exact_percent;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolStats {
    pub symbol: Symbol,
    pub count: u32,
    pub percentage: f64,
    /// Distance depuis la fin de l'historique (0 = dernier tour).
    pub last_seen_index: Option<usize>,
    pub average_interval: f64,
    pub is_hot: bool,
    pub is_cold: bool,
    pub count_last5: u32,
    pub count_last10: u32,
    pub count_last20: u32,
    pub pct_last5: f64,
    pub pct_last10: f64,
    pub pct_last20: f64,
}

/// Les `n` derniers éléments (tout l'historique s'il est plus court).
pub(crate) fn tail(history: &[Symbol], n: usize) -> &[Symbol] {
    &history[history.len().saturating_sub(n)..]
}

pub(crate) fn count_of(history: &[Symbol], symbol: Symbol) -> u32 {
    history.iter().filter(|&&s| s == symbol).count() as u32
}

/// Part (0..1) du symbole dans la fenêtre récente ; 0 si la fenêtre est vide.
pub(crate) fn recent_ratio(history: &[Symbol], symbol: Symbol, window: usize) -> f64 {
    let recent = tail(history, window);
    if recent.is_empty() {
        return 0.0;
    }
    count_of(recent, symbol) as f64 / recent.len() as f64
}

/// Longueur de la série en cours du symbole à la fin de l'historique.
pub fn current_streak(history: &[Symbol], symbol: Symbol) -> usize {
    history.iter().rev().take_while(|&&s| s == symbol).count()
}

pub fn compute_symbol_stats(history: &[Symbol], config: &AnalysisConfig) -> Vec<SymbolStats> {
    let total = history.len();

    Symbol::ALL
        .iter()
        .map(|&symbol| {
            let count = count_of(history, symbol);
            let percentage = exact_percent(count as f64, total as f64);

            let last_seen_index = history.iter().rev().position(|&s| s == symbol);

            let positions: Vec<usize> = history
                .iter()
                .enumerate()
                .filter(|(_, s)| **s == symbol)
                .map(|(i, _)| i)
                .collect();
            let average_interval = if positions.len() > 1 {
                let gaps: usize = positions.windows(2).map(|w| w[1] - w[0]).sum();
                gaps as f64 / (positions.len() - 1) as f64
            } else {
                0.0
            };

            let recent_len = tail(history, config.recent_window).len();
            let ratio = recent_ratio(history, symbol, config.recent_window);
            let is_hot = ratio >= config.hot_threshold;
            // Un historique trop court ne classe jamais un symbole comme froid.
            let is_cold = ratio <= config.cold_threshold && recent_len >= config.recent_window;

            let window_share = |window: usize| -> (u32, f64) {
                let c = count_of(tail(history, window), symbol);
                let denom = if total > 0 { window.min(total) } else { 1 };
                (c, exact_percent(c as f64, denom as f64))
            };
            let (count_last5, pct_last5) = window_share(5);
            let (count_last10, pct_last10) = window_share(10);
            let (count_last20, pct_last20) = window_share(20);

            SymbolStats {
                symbol,
                count,
                percentage,
                last_seen_index,
                average_interval,
                is_hot,
                is_cold,
                count_last5,
                count_last10,
                count_last20,
                pct_last5,
                pct_last10,
                pct_last20,
            }
        })
        .collect()
}
