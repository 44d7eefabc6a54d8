//! Time from entering Extreme Fear back to Neutral.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::data::TimeSeries;
use crate::stats::BoxSummary;

/// One recovered Extreme Fear episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryEvent {
    /// First date of the Extreme Fear run.
    pub entry_date: NaiveDate,
    /// First later date with a Neutral-or-better score.
    pub recovery_date: NaiveDate,
    /// Calendar days between the two.
    pub days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryStudy {
    pub events: Vec<RecoveryEvent>,
    /// Entries with no recovery before the series ends.
    pub unrecovered: usize,
    /// Distribution of `days`; `None` when nothing recovered.
    pub summary: Option<BoxSummary>,
}

impl RecoveryStudy {
    /// Find rising-edge entries below `fear_threshold` and their first
    /// recovery at or above `recovery_threshold`.
    pub fn compute(composite: &TimeSeries, fear_threshold: f64, recovery_threshold: f64) -> Self {
        let points = composite.points();
        let mut events = Vec::new();
        let mut unrecovered = 0;

        let mut was_fearful = false;
        for (i, point) in points.iter().enumerate() {
            let fearful = point.value < fear_threshold;
            if fearful && !was_fearful {
                match points[i + 1..].iter().find(|p| p.value >= recovery_threshold) {
                    Some(recovered) => events.push(RecoveryEvent {
                        entry_date: point.date,
                        recovery_date: recovered.date,
                        days: (recovered.date - point.date).num_days(),
                    }),
                    None => unrecovered += 1,
                }
            }
            was_fearful = fearful;
        }

        let durations: Vec<f64> = events.iter().map(|e| e.days as f64).collect();
        let summary = BoxSummary::from_values(&durations);

        Self {
            events,
            unrecovered,
            summary,
        }
    }

    pub fn entries(&self) -> usize {
        self.events.len() + self.unrecovered
    }
}
