use serde::{Deserialize, Serialize};

/// Settings shared by the appendix studies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppendixConfig {
    /// Rolling correlation window, in observations.
    pub correlation_window: usize,
    /// Composite score below which the market is in Extreme Fear.
    pub extreme_fear_threshold: f64,
    /// Composite score at which the market counts as recovered.
    pub neutral_threshold: f64,
    /// Forward-return horizons, in trading days.
    pub horizons: Vec<usize>,
}

impl Default for AppendixConfig {
    fn default() -> Self {
        Self {
            correlation_window: 60,
            extreme_fear_threshold: 25.0,
            neutral_threshold: 45.0,
            horizons: vec![21, 63, 126, 252], // 1, 3, 6, 12 months
        }
    }
}
