//! Statistical building blocks.
//!
//! - Trailing-window transforms (moving average, percent change, percentile rank,
//!   rolling correlation)
//! - Whole-sample summaries (Z-scores, boxplot summaries)

pub mod descriptive;
pub mod rolling;

pub use descriptive::{zscores, BoxSummary};
pub use rolling::{
    centered_mean, pct_change, pearson, rolling_correlation, rolling_percentile_rank,
    simple_moving_average,
};
