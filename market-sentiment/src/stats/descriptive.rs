//! Whole-sample descriptive statistics.

use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, OrderStatistics, Statistics};

/// Standardize values against the sample mean and sample standard deviation.
///
/// Returns `None` for fewer than two values or a constant sample.
pub fn zscores(values: &[f64]) -> Option<Vec<f64>> {
    if values.len() < 2 {
        return None;
    }

    let mean = values.iter().mean();
    let std_dev = values.iter().std_dev();
    if !std_dev.is_finite() || std_dev == 0.0 {
        return None;
    }

    Some(values.iter().map(|v| (v - mean) / std_dev).collect())
}

/// Boxplot-style summary of a distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxSummary {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub iqr: f64,
    /// Lowest value within 1.5 IQR below Q1.
    pub lower_whisker: f64,
    /// Highest value within 1.5 IQR above Q3.
    pub upper_whisker: f64,
    /// Values beyond the whiskers.
    pub outliers: Vec<f64>,
}

impl BoxSummary {
    /// Summarize a sample. Non-finite values are ignored.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(|a, b| a.total_cmp(b));

        let mean = sorted.iter().mean();
        let mut data = Data::new(sorted.clone());
        let q1 = data.quantile(0.25);
        let median = data.quantile(0.5);
        let q3 = data.quantile(0.75);
        let iqr = q3 - q1;

        let low_fence = q1 - 1.5 * iqr;
        let high_fence = q3 + 1.5 * iqr;
        let lower_whisker = sorted
            .iter()
            .copied()
            .find(|&v| v >= low_fence)
            .unwrap_or(sorted[0]);
        let upper_whisker = sorted
            .iter()
            .rev()
            .copied()
            .find(|&v| v <= high_fence)
            .unwrap_or(sorted[sorted.len() - 1]);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|&v| v < low_fence || v > high_fence)
            .collect();

        Some(Self {
            count: sorted.len(),
            mean,
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            q1,
            median,
            q3,
            iqr,
            lower_whisker,
            upper_whisker,
            outliers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zscores_have_zero_mean_unit_sample_std() {
        let z = zscores(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        let mean = z.iter().sum::<f64>() / z.len() as f64;
        let var = z.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (z.len() - 1) as f64;
        assert_relative_eq!(mean, 0.0, epsilon = 1e-12);
        assert_relative_eq!(var, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zscores_reject_degenerate_samples() {
        assert!(zscores(&[1.0]).is_none());
        assert!(zscores(&[3.0, 3.0, 3.0]).is_none());
    }

    #[test]
    fn test_box_summary_median_and_outliers() {
        let summary = BoxSummary::from_values(&[1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
        assert_eq!(summary.count, 5);
        assert_relative_eq!(summary.median, 3.0);
        assert_relative_eq!(summary.min, 1.0);
        assert_relative_eq!(summary.max, 100.0);
        assert!(summary.q1 <= summary.median && summary.median <= summary.q3);
        assert_eq!(summary.outliers, vec![100.0]);
        assert_relative_eq!(summary.upper_whisker, 4.0);
    }

    #[test]
    fn test_box_summary_empty() {
        assert!(BoxSummary::from_values(&[]).is_none());
        assert!(BoxSummary::from_values(&[f64::NAN]).is_none());
    }
}
