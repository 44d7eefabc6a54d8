//! Rolling correlation of standardized daily changes.
//!
//! The composite score and SPY close are inner-joined on date, turned into
//! one-period percent changes, Z-scored over the full sample, and correlated
//! over a trailing window.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::TimeSeries;
use crate::stats::{pct_change, rolling_correlation, zscores};

/// One aligned observation of the study.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPoint {
    pub date: NaiveDate,
    pub composite_z: f64,
    pub spy_z: f64,
    /// `None` until the window is full or when a window has no variation.
    pub correlation: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationStudy {
    pub window: usize,
    pub points: Vec<CorrelationPoint>,
}

impl CorrelationStudy {
    pub fn compute(composite: &TimeSeries, spy: &TimeSeries, window: usize) -> Self {
        let joined = composite.align(spy);
        let composite_values: Vec<f64> = joined.iter().map(|(_, c, _)| *c).collect();
        let spy_values: Vec<f64> = joined.iter().map(|(_, _, s)| *s).collect();

        let composite_changes = pct_change(&composite_values, 1);
        let spy_changes = pct_change(&spy_values, 1);

        let mut dates = Vec::new();
        let mut composite_kept = Vec::new();
        let mut spy_kept = Vec::new();
        for (i, (date, _, _)) in joined.iter().enumerate() {
            if let (Some(c), Some(s)) = (composite_changes[i], spy_changes[i]) {
                dates.push(*date);
                composite_kept.push(c);
                spy_kept.push(s);
            }
        }

        let (Some(composite_z), Some(spy_z)) = (zscores(&composite_kept), zscores(&spy_kept)) else {
            debug!("Correlation study skipped: {} usable changes", dates.len());
            return Self {
                window,
                points: Vec::new(),
            };
        };

        let correlations = rolling_correlation(&composite_z, &spy_z, window);
        let points = dates
            .into_iter()
            .zip(composite_z)
            .zip(spy_z)
            .zip(correlations)
            .map(|(((date, composite_z), spy_z), correlation)| CorrelationPoint {
                date,
                composite_z,
                spy_z,
                correlation,
            })
            .collect();

        Self { window, points }
    }

    /// Most recent defined correlation.
    pub fn latest(&self) -> Option<(NaiveDate, f64)> {
        self.points
            .iter()
            .rev()
            .find_map(|p| p.correlation.map(|c| (p.date, c)))
    }
}
