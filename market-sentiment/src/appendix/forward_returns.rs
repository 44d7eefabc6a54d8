//! Forward SPY returns grouped by the composite label on the starting date.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::data::TimeSeries;
use crate::sentiment::{LabeledPoint, SentimentLabel};
use crate::stats::BoxSummary;

/// Returns for one (label, horizon) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForwardReturnCell {
    pub label: SentimentLabel,
    pub horizon_days: usize,
    /// Forward returns in percent.
    pub returns: Vec<f64>,
    pub summary: Option<BoxSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForwardReturnStudy {
    /// Every label crossed with every horizon, fear first.
    pub cells: Vec<ForwardReturnCell>,
}

impl ForwardReturnStudy {
    /// Horizons are counted in SPY observations, not calendar days.
    pub fn compute(spy: &TimeSeries, labels: &[LabeledPoint], horizons: &[usize]) -> Self {
        let label_by_date: HashMap<_, _> = labels.iter().map(|p| (p.date, p.label)).collect();
        let closes = spy.points();

        let mut grouped: HashMap<(SentimentLabel, usize), Vec<f64>> = HashMap::new();
        for (i, start) in closes.iter().enumerate() {
            let Some(label) = label_by_date.get(&start.date) else {
                continue;
            };
            if start.value == 0.0 {
                continue;
            }
            for &horizon in horizons {
                if let Some(end) = closes.get(i + horizon) {
                    let ret = (end.value / start.value - 1.0) * 100.0;
                    grouped.entry((*label, horizon)).or_default().push(ret);
                }
            }
        }

        let cells = SentimentLabel::ALL
            .iter()
            .flat_map(|label| horizons.iter().map(move |h| (*label, *h)))
            .map(|(label, horizon_days)| {
                let returns = grouped.remove(&(label, horizon_days)).unwrap_or_default();
                let summary = BoxSummary::from_values(&returns);
                ForwardReturnCell {
                    label,
                    horizon_days,
                    returns,
                    summary,
                }
            })
            .collect();

        Self { cells }
    }

    pub fn cell(&self, label: SentimentLabel, horizon_days: usize) -> Option<&ForwardReturnCell> {
        self.cells
            .iter()
            .find(|c| c.label == label && c.horizon_days == horizon_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, n).unwrap()
    }

    #[test]
    fn test_returns_grouped_by_label_and_horizon() {
        let spy = TimeSeries::new(
            "SPY",
            vec![(day(1), 100.0), (day(2), 110.0), (day(3), 121.0), (day(4), 99.0)],
        );
        let labels: Vec<LabeledPoint> = [
            (day(1), SentimentLabel::Fear),
            (day(2), SentimentLabel::Greed),
            (day(3), SentimentLabel::Fear),
        ]
        .into_iter()
        .map(|(date, label)| LabeledPoint { date, label })
        .collect();

        let study = ForwardReturnStudy::compute(&spy, &labels, &[1, 2]);
        assert_eq!(study.cells.len(), SentimentLabel::ALL.len() * 2);

        let fear_1 = study.cell(SentimentLabel::Fear, 1).unwrap();
        assert_eq!(fear_1.returns.len(), 2);
        assert_relative_eq!(fear_1.returns[0], 10.0, epsilon = 1e-9);
        assert_relative_eq!(fear_1.returns[1], -18.181818181818183, epsilon = 1e-9);

        // Day 3 has no close two steps ahead.
        let fear_2 = study.cell(SentimentLabel::Fear, 2).unwrap();
        assert_eq!(fear_2.returns.len(), 1);
        assert_relative_eq!(fear_2.returns[0], 21.0, epsilon = 1e-9);

        let greed_2 = study.cell(SentimentLabel::Greed, 2).unwrap();
        assert_relative_eq!(greed_2.returns[0], -10.0, epsilon = 1e-9);
        assert_eq!(greed_2.summary.as_ref().unwrap().count, 1);
    }

    #[test]
    fn test_unlabeled_dates_are_ignored() {
        let spy = TimeSeries::new("SPY", vec![(day(1), 100.0), (day(2), 110.0)]);
        let study = ForwardReturnStudy::compute(&spy, &[], &[1]);
        assert!(study.cells.iter().all(|c| c.returns.is_empty() && c.summary.is_none()));
    }
}
