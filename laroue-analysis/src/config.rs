use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisConfig {
    /// Fenêtre des derniers tours pour le classement chaud/froid.
    pub recent_window: usize,
    pub hot_threshold: f64,
    pub cold_threshold: f64,
    pub frequency_weight: f64,
    pub hot_cold_weight: f64,
    pub trend_weight: f64,
}

pub const DEFAULT_CONFIG: AnalysisConfig = AnalysisConfig {
    recent_window: 15,
    hot_threshold: 0.35,
    cold_threshold: 0.1,
    frequency_weight: 0.6,
    hot_cold_weight: 0.2,
    trend_weight: 0.2,
};

impl Default for AnalysisConfig {
    fn default() -> Self {
        DEFAULT_CONFIG
    }
}

/// Contrôle à la frontière : le moteur lui-même ne valide rien.
pub fn validate_config(config: &AnalysisConfig) -> Result<()> {
    if config.recent_window == 0 {
        bail!("recentWindow doit être au moins 1");
    }
    for (name, value) in [
        ("hotThreshold", config.hot_threshold),
        ("coldThreshold", config.cold_threshold),
    ] {
        if !(0.0..=1.0).contains(&value) {
            bail!("{} hors de [0, 1] : {}", name, value);
        }
    }
    for (name, value) in [
        ("frequencyWeight", config.frequency_weight),
        ("hotColdWeight", config.hot_cold_weight),
        ("trendWeight", config.trend_weight),
    ] {
        if !value.is_finite() || value < 0.0 {
            bail!("{} doit être un réel positif : {}", name, value);
        }
    }
    Ok(())
}
