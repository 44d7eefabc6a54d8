//! Composite sentiment: per-date mean of the available indicator scores.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::indicators::{label_series, latest_reading, IndicatorScore, LabeledPoint, LatestReading};
use super::label::ThresholdTable;
use crate::data::TimeSeries;

/// Composite score series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositeScore {
    pub scores: TimeSeries,
    pub labels: Vec<LabeledPoint>,
    /// Number of indicators averaged on each date.
    pub contributors: Vec<(NaiveDate, usize)>,
    pub latest: Option<LatestReading>,
}

/// Outer-joins indicator scores and averages whatever is present per date.
#[derive(Debug, Clone)]
pub struct CompositeAggregator {
    table: ThresholdTable,
}

impl Default for CompositeAggregator {
    fn default() -> Self {
        Self {
            table: ThresholdTable::composite(),
        }
    }
}

impl CompositeAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregate raw score series.
    pub fn aggregate_series(&self, series: &[&TimeSeries]) -> CompositeScore {
        let mut by_date: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
        for s in series {
            for point in s.points() {
                let entry = by_date.entry(point.date).or_insert((0.0, 0));
                entry.0 += point.value;
                entry.1 += 1;
            }
        }

        let contributors: Vec<(NaiveDate, usize)> =
            by_date.iter().map(|(date, (_, n))| (*date, *n)).collect();
        let scores = TimeSeries::new(
            "composite",
            by_date
                .into_iter()
                .map(|(date, (sum, n))| (date, sum / n as f64)),
        );

        let labels = label_series(&scores, &self.table);
        let latest = latest_reading(&scores, &labels);

        CompositeScore {
            scores,
            labels,
            contributors,
            latest,
        }
    }

    /// Aggregate scored indicators.
    pub fn aggregate(&self, indicators: &[&IndicatorScore]) -> CompositeScore {
        let series: Vec<&TimeSeries> = indicators.iter().map(|i| &i.scores).collect();
        self.aggregate_series(&series)
    }
}
