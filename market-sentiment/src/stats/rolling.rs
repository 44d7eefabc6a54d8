//! Trailing-window transforms over plain value slices.
//!
//! Every function returns one slot per input value. A slot is `None` until its
//! window is full; windows are never expanded to cover a short prefix.

/// Simple moving average over `period` values.
///
/// Each window is summed on its own, so equal windows always give
/// bit-identical averages no matter what preceded them.
pub fn simple_moving_average(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }

    (0..values.len())
        .map(|i| {
            (i + 1 >= period)
                .then(|| values[i + 1 - period..=i].iter().sum::<f64>() / period as f64)
        })
        .collect()
}

/// Fractional change versus the value `periods` steps earlier.
///
/// A zero base has no defined change and leaves the slot empty.
pub fn pct_change(values: &[f64], periods: usize) -> Vec<Option<f64>> {
    if periods == 0 {
        return vec![None; values.len()];
    }

    values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            if i < periods {
                return None;
            }
            let base = values[i - periods];
            if base == 0.0 {
                None
            } else {
                Some(v / base - 1.0)
            }
        })
        .collect()
}

/// Percentile rank of each value within its trailing window, in [0, 100].
///
/// rank(t) = (count of window values <= value(t)) / window * 100. Ties count
/// inclusively, so the scored value always counts itself.
pub fn rolling_percentile_rank(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    values
        .iter()
        .enumerate()
        .map(|(i, &current)| {
            if i + 1 < window {
                return None;
            }
            let slice = &values[i + 1 - window..=i];
            let at_or_below = slice.iter().filter(|&&v| v <= current).count();
            Some(at_or_below as f64 / window as f64 * 100.0)
        })
        .collect()
}

/// Pearson correlation of two equally long slices.
///
/// Returns `None` when either side has no variation.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (xi, yi) in x.iter().zip(y.iter()) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denominator = (var_x * var_y).sqrt();
    if denominator < 1e-12 {
        None
    } else {
        Some((cov / denominator).clamp(-1.0, 1.0))
    }
}

/// Rolling Pearson correlation between two aligned slices.
pub fn rolling_correlation(x: &[f64], y: &[f64], window: usize) -> Vec<Option<f64>> {
    let n = x.len().min(y.len());
    if window < 2 {
        return vec![None; n];
    }

    (0..n)
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            let start = i + 1 - window;
            pearson(&x[start..=i], &y[start..=i])
        })
        .collect()
}

/// Centered rolling mean that accepts partial windows at the edges.
pub fn centered_mean(values: &[f64], window: usize) -> Vec<f64> {
    if window <= 1 {
        return values.to_vec();
    }

    let before = window / 2;
    let after = window - 1 - before;
    (0..values.len())
        .map(|i| {
            let start = i.saturating_sub(before);
            let end = (i + after).min(values.len() - 1);
            let slice = &values[start..=end];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sma_waits_for_full_window() {
        let sma = simple_moving_average(&[1.0, 2.0, 3.0, 4.0], 3);
        assert_eq!(sma[0], None);
        assert_eq!(sma[1], None);
        assert_relative_eq!(sma[2].unwrap(), 2.0);
        assert_relative_eq!(sma[3].unwrap(), 3.0);
    }

    #[test]
    fn test_sma_is_identical_across_a_flat_stretch() {
        let mut values: Vec<f64> = (0..200)
            .map(|i| 100.0 + 37.0 * ((i as f64) * 0.7).sin() + (i % 13) as f64 * 0.137)
            .collect();
        values.extend(std::iter::repeat(123.456).take(100));

        let sma = simple_moving_average(&values, 25);
        let flat: Vec<f64> = sma[224..].iter().map(|v| v.unwrap()).collect();
        assert!(flat.iter().all(|v| *v == flat[0]));
        assert_relative_eq!(flat[0], 123.456, epsilon = 1e-9);
    }

    #[test]
    fn test_pct_change_guards_zero_base() {
        let changes = pct_change(&[0.0, 100.0, 110.0], 1);
        assert_eq!(changes[0], None);
        assert_eq!(changes[1], None);
        assert_relative_eq!(changes[2].unwrap(), 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_percentile_rank_counts_ties_inclusively() {
        let ranks = rolling_percentile_rank(&[5.0, 5.0, 5.0, 5.0], 4);
        assert_eq!(ranks[..3], [None, None, None]);
        assert_relative_eq!(ranks[3].unwrap(), 100.0);

        let ranks = rolling_percentile_rank(&[4.0, 3.0, 2.0, 1.0], 4);
        assert_relative_eq!(ranks[3].unwrap(), 25.0);
    }

    #[test]
    fn test_percentile_rank_stays_in_range() {
        let values: Vec<f64> = (0..200).map(|i| ((i * 37) % 101) as f64 - 50.0).collect();
        for rank in rolling_percentile_rank(&values, 30).into_iter().flatten() {
            assert!((0.0..=100.0).contains(&rank));
        }
    }

    #[test]
    fn test_percentile_rank_is_monotone_in_scored_value() {
        let mut values = vec![3.0, 9.0, 1.0, 7.0, 5.0];
        let mut previous = 0.0;
        for candidate in [-1.0, 2.0, 4.0, 6.0, 8.0, 10.0] {
            values[4] = candidate;
            let rank = rolling_percentile_rank(&values, 5)[4].unwrap();
            assert!(rank >= previous);
            previous = rank;
        }
    }

    #[test]
    fn test_zero_window_scores_nothing() {
        assert!(rolling_percentile_rank(&[1.0, 2.0], 0).iter().all(Option::is_none));
    }

    #[test]
    fn test_pearson() {
        let x = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(pearson(&x, &[2.0, 4.0, 6.0, 8.0]).unwrap(), 1.0);
        assert_relative_eq!(pearson(&x, &[8.0, 6.0, 4.0, 2.0]).unwrap(), -1.0);
        assert_eq!(pearson(&x, &[1.0, 1.0, 1.0, 1.0]), None);
    }

    #[test]
    fn test_rolling_correlation_alignment() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [1.0, 2.0, 3.0, 2.0, 1.0];
        let corr = rolling_correlation(&x, &y, 3);
        assert_eq!(corr[..2], [None, None]);
        assert_relative_eq!(corr[2].unwrap(), 1.0);
        assert_relative_eq!(corr[4].unwrap(), -1.0);
    }

    #[test]
    fn test_centered_mean_partial_edges() {
        let smoothed = centered_mean(&[1.0, 2.0, 3.0, 4.0, 5.0], 5);
        assert_relative_eq!(smoothed[0], 2.0);
        assert_relative_eq!(smoothed[2], 3.0);
        assert_relative_eq!(smoothed[4], 4.0);
    }
}
