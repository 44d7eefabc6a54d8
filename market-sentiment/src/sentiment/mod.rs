//! Time-series sentiment scoring.
//!
//! Four indicators, each ranked into a 0-100 score and labeled on a
//! five-level scale from Extreme Fear to Extreme Greed:
//! - S&P 500 trend: >= 76 Extreme Greed, >= 56 Greed, >= 45 Neutral, >= 25 Fear
//! - Volatility (VIX, inverted): >= 95 / 80 / 20 / 5
//! - Safe-haven demand: <= 25 Extreme Fear, <= 40 Fear, <= 60 Neutral, <= 75 Greed
//! - Growth vs value: >= 90 / 70 / 40 / 20
//!
//! The composite averages whichever indicators are present on each date.

pub mod composite;
pub mod indicators;
pub mod label;

pub use composite::{CompositeAggregator, CompositeScore};
pub use indicators::{
    Indicator, IndicatorConfig, IndicatorScore, IndicatorScorer, LabeledPoint, LatestReading,
};
pub use label::{SentimentLabel, ThresholdDirection, ThresholdTable};
