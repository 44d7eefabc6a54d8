//! Sentiment labels and threshold tables.
//!
//! Every indicator maps its 0-100 score onto the same five labels, each with
//! its own cut points. A `ThresholdTable` holds one indicator's cut points.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Five-level sentiment classification, ordered from fear to greed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    ExtremeFear,
    Fear,
    Neutral,
    Greed,
    ExtremeGreed,
}

impl SentimentLabel {
    /// All labels, fear first.
    pub const ALL: [SentimentLabel; 5] = [
        Self::ExtremeFear,
        Self::Fear,
        Self::Neutral,
        Self::Greed,
        Self::ExtremeGreed,
    ];

    /// Display text.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExtremeFear => "Extreme Fear",
            Self::Fear => "Fear",
            Self::Neutral => "Neutral",
            Self::Greed => "Greed",
            Self::ExtremeGreed => "Extreme Greed",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which way a table's cut points are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdDirection {
    /// Scan highest cut point first; a score at or above it takes its label.
    Descending,
    /// Scan lowest cut point first; a score at or below it takes its label.
    Ascending,
}

/// Ordered cut points mapping a score to a label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdTable {
    direction: ThresholdDirection,
    cutoffs: Vec<(f64, SentimentLabel)>,
    fallback: SentimentLabel,
}

impl ThresholdTable {
    /// Table where `score >= cutoff` wins, highest cutoff first.
    /// Scores below every cutoff are Extreme Fear.
    pub fn descending(cutoffs: &[(f64, SentimentLabel)]) -> Self {
        let mut cutoffs = cutoffs.to_vec();
        cutoffs.sort_by(|a, b| b.0.total_cmp(&a.0));
        Self {
            direction: ThresholdDirection::Descending,
            cutoffs,
            fallback: SentimentLabel::ExtremeFear,
        }
    }

    /// Table where `score <= cutoff` wins, lowest cutoff first.
    /// Scores above every cutoff are Extreme Greed.
    pub fn ascending(cutoffs: &[(f64, SentimentLabel)]) -> Self {
        let mut cutoffs = cutoffs.to_vec();
        cutoffs.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self {
            direction: ThresholdDirection::Ascending,
            cutoffs,
            fallback: SentimentLabel::ExtremeGreed,
        }
    }

    /// Composite score: 76 / 56 / 45 / 25.
    pub fn composite() -> Self {
        Self::descending(&[
            (76.0, SentimentLabel::ExtremeGreed),
            (56.0, SentimentLabel::Greed),
            (45.0, SentimentLabel::Neutral),
            (25.0, SentimentLabel::Fear),
        ])
    }

    /// SPY trend shares the composite cut points.
    pub fn spy_trend() -> Self {
        Self::composite()
    }

    /// VIX (inverted rank): 95 / 80 / 20 / 5.
    pub fn volatility() -> Self {
        Self::descending(&[
            (95.0, SentimentLabel::ExtremeGreed),
            (80.0, SentimentLabel::Greed),
            (20.0, SentimentLabel::Neutral),
            (5.0, SentimentLabel::Fear),
        ])
    }

    /// Safe-haven demand, low score = fear: <=25 / <=40 / <=60 / <=75.
    pub fn safe_haven() -> Self {
        Self::ascending(&[
            (25.0, SentimentLabel::ExtremeFear),
            (40.0, SentimentLabel::Fear),
            (60.0, SentimentLabel::Neutral),
            (75.0, SentimentLabel::Greed),
        ])
    }

    /// Growth vs value: 90 / 70 / 40 / 20.
    pub fn growth_value() -> Self {
        Self::descending(&[
            (90.0, SentimentLabel::ExtremeGreed),
            (70.0, SentimentLabel::Greed),
            (40.0, SentimentLabel::Neutral),
            (20.0, SentimentLabel::Fear),
        ])
    }

    pub fn direction(&self) -> ThresholdDirection {
        self.direction
    }

    pub fn cutoffs(&self) -> &[(f64, SentimentLabel)] {
        &self.cutoffs
    }

    /// Label for a score. NaN and infinite scores have no label.
    pub fn classify(&self, score: f64) -> Option<SentimentLabel> {
        if !score.is_finite() {
            return None;
        }

        let hit = match self.direction {
            ThresholdDirection::Descending => self
                .cutoffs
                .iter()
                .find(|(cutoff, _)| score >= *cutoff),
            ThresholdDirection::Ascending => self
                .cutoffs
                .iter()
                .find(|(cutoff, _)| score <= *cutoff),
        };

        Some(hit.map(|(_, label)| *label).unwrap_or(self.fallback))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SentimentLabel::*;

    #[test]
    fn test_composite_boundaries_take_higher_label() {
        let table = ThresholdTable::composite();
        assert_eq!(table.classify(76.0), Some(ExtremeGreed));
        assert_eq!(table.classify(75.999), Some(Greed));
        assert_eq!(table.classify(56.0), Some(Greed));
        assert_eq!(table.classify(45.0), Some(Neutral));
        assert_eq!(table.classify(25.0), Some(Fear));
        assert_eq!(table.classify(24.999), Some(ExtremeFear));
        assert_eq!(table.classify(0.0), Some(ExtremeFear));
        assert_eq!(table.classify(100.0), Some(ExtremeGreed));
    }

    #[test]
    fn test_volatility_boundaries() {
        let table = ThresholdTable::volatility();
        assert_eq!(table.classify(95.0), Some(ExtremeGreed));
        assert_eq!(table.classify(80.0), Some(Greed));
        assert_eq!(table.classify(20.0), Some(Neutral));
        assert_eq!(table.classify(5.0), Some(Fear));
        assert_eq!(table.classify(4.9), Some(ExtremeFear));
    }

    #[test]
    fn test_growth_value_boundaries() {
        let table = ThresholdTable::growth_value();
        assert_eq!(table.classify(90.0), Some(ExtremeGreed));
        assert_eq!(table.classify(70.0), Some(Greed));
        assert_eq!(table.classify(40.0), Some(Neutral));
        assert_eq!(table.classify(20.0), Some(Fear));
        assert_eq!(table.classify(19.0), Some(ExtremeFear));
    }

    #[test]
    fn test_safe_haven_is_ascending() {
        let table = ThresholdTable::safe_haven();
        assert_eq!(table.direction(), ThresholdDirection::Ascending);
        assert_eq!(table.classify(0.0), Some(ExtremeFear));
        assert_eq!(table.classify(25.0), Some(ExtremeFear));
        assert_eq!(table.classify(25.1), Some(Fear));
        assert_eq!(table.classify(40.0), Some(Fear));
        assert_eq!(table.classify(60.0), Some(Neutral));
        assert_eq!(table.classify(75.0), Some(Greed));
        assert_eq!(table.classify(75.1), Some(ExtremeGreed));
        assert_eq!(table.classify(100.0), Some(ExtremeGreed));
    }

    #[test]
    fn test_every_score_in_range_has_a_label() {
        let tables = [
            ThresholdTable::composite(),
            ThresholdTable::volatility(),
            ThresholdTable::safe_haven(),
            ThresholdTable::growth_value(),
        ];
        for table in &tables {
            let mut previous: Option<SentimentLabel> = None;
            for step in 0..=1000 {
                let label = table.classify(step as f64 / 10.0).unwrap();
                // Labels never move back toward fear as the score rises.
                if let Some(prev) = previous {
                    assert!(label >= prev);
                }
                previous = Some(label);
            }
        }
    }

    #[test]
    fn test_nan_has_no_label() {
        assert_eq!(ThresholdTable::composite().classify(f64::NAN), None);
    }

    #[test]
    fn test_cutoffs_sorted_regardless_of_input_order() {
        let table = ThresholdTable::descending(&[(25.0, Fear), (76.0, ExtremeGreed)]);
        assert_eq!(table.cutoffs()[0].0, 76.0);
        assert_eq!(table.classify(50.0), Some(Fear));
    }

    #[test]
    fn test_label_display() {
        assert_eq!(ExtremeFear.to_string(), "Extreme Fear");
        assert_eq!(Greed.as_str(), "Greed");
    }
}
