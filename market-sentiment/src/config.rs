//! Run configuration.
//!
//! Every section has defaults matching the published methodology, so an empty
//! JSON object is a valid config file.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::appendix::AppendixConfig;
use crate::data::CacheConfig;
use crate::options::{PutCallConfig, SkewConfig};
use crate::sentiment::IndicatorConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Symbols for each input series.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TickerConfig {
    /// Broad equity market.
    pub spy: String,
    /// Volatility index.
    pub vix: String,
    /// Intermediate Treasuries, the safe-haven leg.
    pub treasury: String,
    /// Growth style ETF.
    pub growth: String,
    /// Value style ETF.
    pub value: String,
    /// Underlying whose option chain is analyzed.
    pub options: String,
    /// Years of price history to load.
    pub history_years: u32,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            spy: "SPY".to_string(),
            vix: "^VIX".to_string(),
            treasury: "IEF".to_string(),
            growth: "IVW".to_string(),
            value: "IVE".to_string(),
            options: "SPY".to_string(),
            history_years: 10,
        }
    }
}

impl TickerConfig {
    /// All price tickers, SPY first.
    pub fn price_tickers(&self) -> Vec<&str> {
        vec![
            self.spy.as_str(),
            self.vix.as_str(),
            self.treasury.as_str(),
            self.growth.as_str(),
            self.value.as_str(),
        ]
    }
}

/// Options analytics settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionsConfig {
    pub put_call: PutCallConfig,
    pub skew: SkewConfig,
}

/// Complete pipeline configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentConfig {
    pub tickers: TickerConfig,
    pub indicators: IndicatorConfig,
    pub options: OptionsConfig,
    pub appendix: AppendixConfig,
    pub cache: CacheConfig,
}

impl SentimentConfig {
    /// Load and validate a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would silently produce no output.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ind = &self.indicators;
        let windows = [
            ("indicators.spy_ma_period", ind.spy_ma_period),
            ("indicators.spy_rank_window", ind.spy_rank_window),
            ("indicators.vix_ma_period", ind.vix_ma_period),
            ("indicators.vix_rank_window", ind.vix_rank_window),
            ("indicators.safe_haven_return_period", ind.safe_haven_return_period),
            ("indicators.safe_haven_rank_window", ind.safe_haven_rank_window),
            ("indicators.growth_value_return_period", ind.growth_value_return_period),
            ("indicators.growth_value_rank_window", ind.growth_value_rank_window),
            ("options.put_call.expirations", self.options.put_call.expirations),
            ("options.skew.expirations", self.options.skew.expirations),
            ("options.skew.smoothing_window", self.options.skew.smoothing_window),
        ];
        for (name, value) in windows {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{} must be positive", name)));
            }
        }

        let skew = &self.options.skew;
        if skew.atm_band <= 0.0 || skew.otm_band <= 0.0 {
            return Err(ConfigError::Invalid(
                "options.skew bands must be positive".to_string(),
            ));
        }
        if skew.atm_band >= skew.otm_band {
            return Err(ConfigError::Invalid(format!(
                "options.skew.atm_band ({}) must be narrower than otm_band ({})",
                skew.atm_band, skew.otm_band
            )));
        }

        let appendix = &self.appendix;
        if appendix.correlation_window < 2 {
            return Err(ConfigError::Invalid(
                "appendix.correlation_window must be at least 2".to_string(),
            ));
        }
        if appendix.extreme_fear_threshold >= appendix.neutral_threshold {
            return Err(ConfigError::Invalid(format!(
                "appendix.extreme_fear_threshold ({}) must be below neutral_threshold ({})",
                appendix.extreme_fear_threshold, appendix.neutral_threshold
            )));
        }
        if appendix.horizons.is_empty() || appendix.horizons.contains(&0) {
            return Err(ConfigError::Invalid(
                "appendix.horizons must be non-empty and positive".to_string(),
            ));
        }

        if self.cache.ttl_seconds <= 0 {
            return Err(ConfigError::Invalid(
                "cache.ttl_seconds must be positive".to_string(),
            ));
        }
        if self.tickers.history_years == 0 {
            return Err(ConfigError::Invalid(
                "tickers.history_years must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
