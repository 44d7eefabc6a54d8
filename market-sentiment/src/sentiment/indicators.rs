//! The four time-series sentiment indicators.
//!
//! Each indicator derives a raw metric from price history, ranks it against
//! its own trailing window and labels the rank:
//! - SPY trend: close minus its 125-day moving average
//! - Volatility: VIX minus its 50-day moving average, rank inverted
//! - Safe-haven demand: 20-day SPY return minus 20-day IEF return
//! - Growth vs value: 1-year IVW excess return minus 1-year IVE excess return

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::label::{SentimentLabel, ThresholdTable};
use crate::data::TimeSeries;
use crate::stats::{pct_change, rolling_percentile_rank, simple_moving_average};

/// Time-series indicator identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Indicator {
    SpyTrend,
    Volatility,
    SafeHaven,
    GrowthValue,
}

impl Indicator {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SpyTrend => "S&P 500 Trend",
            Self::Volatility => "Volatility (VIX)",
            Self::SafeHaven => "Safe-Haven Demand",
            Self::GrowthValue => "Growth vs Value",
        }
    }

    /// What a high score means for this indicator.
    pub fn description(&self) -> &'static str {
        match self {
            Self::SpyTrend => "SPY trading far above its 125-day average",
            Self::Volatility => "VIX calm relative to its 50-day average",
            Self::SafeHaven => "Stocks outperforming Treasuries over 20 days",
            Self::GrowthValue => "Growth outperforming value over one year",
        }
    }

    /// Label cut points for this indicator.
    pub fn threshold_table(&self) -> ThresholdTable {
        match self {
            Self::SpyTrend => ThresholdTable::spy_trend(),
            Self::Volatility => ThresholdTable::volatility(),
            Self::SafeHaven => ThresholdTable::safe_haven(),
            Self::GrowthValue => ThresholdTable::growth_value(),
        }
    }
}

/// Windows and periods for the four indicators.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    /// SPY moving-average period.
    pub spy_ma_period: usize,
    /// SPY percentile-rank window.
    pub spy_rank_window: usize,
    /// VIX moving-average period.
    pub vix_ma_period: usize,
    /// VIX percentile-rank window.
    pub vix_rank_window: usize,
    /// Return period for the stock/bond spread.
    pub safe_haven_return_period: usize,
    /// Percentile-rank window for the stock/bond spread.
    pub safe_haven_rank_window: usize,
    /// Return period for growth/value excess returns.
    pub growth_value_return_period: usize,
    /// Percentile-rank window for growth/value.
    pub growth_value_rank_window: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            spy_ma_period: 125,
            spy_rank_window: 365,
            vix_ma_period: 50,
            vix_rank_window: 252,
            safe_haven_return_period: 20,
            safe_haven_rank_window: 252,
            growth_value_return_period: 252, // 1 year of trading days
            growth_value_rank_window: 252,
        }
    }
}

/// A dated label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabeledPoint {
    pub date: NaiveDate,
    pub label: SentimentLabel,
}

/// Most recent score and label of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatestReading {
    pub date: NaiveDate,
    pub score: f64,
    pub label: SentimentLabel,
}

/// Label every score in a series with `table`.
pub fn label_series(scores: &TimeSeries, table: &ThresholdTable) -> Vec<LabeledPoint> {
    scores
        .points()
        .iter()
        .filter_map(|p| {
            table
                .classify(p.value)
                .map(|label| LabeledPoint { date: p.date, label })
        })
        .collect()
}

/// Latest (score, label) pair of a labeled series.
pub fn latest_reading(scores: &TimeSeries, labels: &[LabeledPoint]) -> Option<LatestReading> {
    let last = labels.last()?;
    let score = scores.get(last.date)?;
    Some(LatestReading {
        date: last.date,
        score,
        label: last.label,
    })
}

/// Scored output of one indicator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorScore {
    pub indicator: Indicator,
    /// Raw metric before ranking.
    pub raw: TimeSeries,
    /// 0-100 scores.
    pub scores: TimeSeries,
    pub labels: Vec<LabeledPoint>,
    pub latest: Option<LatestReading>,
}

impl IndicatorScore {
    /// Rank a raw metric and label the result.
    fn from_raw(indicator: Indicator, raw: TimeSeries, window: usize, invert: bool) -> Self {
        let dates = raw.dates();
        let ranks = rolling_percentile_rank(&raw.values(), window);
        let scores: Vec<Option<f64>> = ranks
            .into_iter()
            .map(|rank| rank.map(|r| if invert { 100.0 - r } else { r }))
            .collect();
        let scores = TimeSeries::from_optional(format!("{:?} score", indicator), &dates, &scores);

        let labels = label_series(&scores, &indicator.threshold_table());
        let latest = latest_reading(&scores, &labels);

        Self {
            indicator,
            raw,
            scores,
            labels,
            latest,
        }
    }
}

/// Computes the four indicators from price series.
#[derive(Debug, Clone, Default)]
pub struct IndicatorScorer {
    config: IndicatorConfig,
}

impl IndicatorScorer {
    pub fn new(config: IndicatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    /// Close minus its moving average.
    pub fn spy_trend_metric(&self, spy: &TimeSeries) -> TimeSeries {
        distance_from_average("spy_ma_diff", spy, self.config.spy_ma_period)
    }

    /// VIX minus its moving average.
    pub fn volatility_metric(&self, vix: &TimeSeries) -> TimeSeries {
        distance_from_average("vix_ma_diff", vix, self.config.vix_ma_period)
    }

    /// SPY return minus IEF return over the configured period.
    pub fn safe_haven_metric(&self, spy: &TimeSeries, ief: &TimeSeries) -> TimeSeries {
        let joined = spy.align(ief);
        let dates: Vec<NaiveDate> = joined.iter().map(|(d, _, _)| *d).collect();
        let spy_values: Vec<f64> = joined.iter().map(|(_, s, _)| *s).collect();
        let ief_values: Vec<f64> = joined.iter().map(|(_, _, i)| *i).collect();

        let period = self.config.safe_haven_return_period;
        let spy_returns = pct_change(&spy_values, period);
        let ief_returns = pct_change(&ief_values, period);

        let spread: Vec<Option<f64>> = spy_returns
            .iter()
            .zip(ief_returns.iter())
            .map(|(s, i)| Some((*s)? - (*i)?))
            .collect();

        TimeSeries::from_optional("stock_bond_spread", &dates, &spread)
    }

    /// Growth excess return minus value excess return, in percentage points.
    pub fn growth_value_metric(
        &self,
        spy: &TimeSeries,
        ivw: &TimeSeries,
        ive: &TimeSeries,
    ) -> TimeSeries {
        let joined: Vec<(NaiveDate, f64, f64, f64)> = spy
            .align(ivw)
            .into_iter()
            .filter_map(|(date, s, g)| ive.get(date).map(|v| (date, s, g, v)))
            .collect();

        let dates: Vec<NaiveDate> = joined.iter().map(|j| j.0).collect();
        let period = self.config.growth_value_return_period;
        let spy_returns = pct_change(&joined.iter().map(|j| j.1).collect::<Vec<_>>(), period);
        let ivw_returns = pct_change(&joined.iter().map(|j| j.2).collect::<Vec<_>>(), period);
        let ive_returns = pct_change(&joined.iter().map(|j| j.3).collect::<Vec<_>>(), period);

        let diff: Vec<Option<f64>> = (0..dates.len())
            .map(|i| {
                let spy_ret = spy_returns[i]?;
                let growth_dev = (ivw_returns[i]? - spy_ret) * 100.0;
                let value_dev = (ive_returns[i]? - spy_ret) * 100.0;
                Some(growth_dev - value_dev)
            })
            .collect();

        TimeSeries::from_optional("growth_value_diff", &dates, &diff)
    }

    pub fn score_spy_trend(&self, spy: &TimeSeries) -> IndicatorScore {
        IndicatorScore::from_raw(
            Indicator::SpyTrend,
            self.spy_trend_metric(spy),
            self.config.spy_rank_window,
            false,
        )
    }

    /// A VIX spike above its average is fear, so the rank is inverted.
    pub fn score_volatility(&self, vix: &TimeSeries) -> IndicatorScore {
        IndicatorScore::from_raw(
            Indicator::Volatility,
            self.volatility_metric(vix),
            self.config.vix_rank_window,
            true,
        )
    }

    pub fn score_safe_haven(&self, spy: &TimeSeries, ief: &TimeSeries) -> IndicatorScore {
        IndicatorScore::from_raw(
            Indicator::SafeHaven,
            self.safe_haven_metric(spy, ief),
            self.config.safe_haven_rank_window,
            false,
        )
    }

    pub fn score_growth_value(
        &self,
        spy: &TimeSeries,
        ivw: &TimeSeries,
        ive: &TimeSeries,
    ) -> IndicatorScore {
        IndicatorScore::from_raw(
            Indicator::GrowthValue,
            self.growth_value_metric(spy, ivw, ive),
            self.config.growth_value_rank_window,
            false,
        )
    }
}

fn distance_from_average(name: &str, series: &TimeSeries, period: usize) -> TimeSeries {
    let values = series.values();
    let averages = simple_moving_average(&values, period);
    let diffs: Vec<Option<f64>> = values
        .iter()
        .zip(averages.iter())
        .map(|(v, avg)| avg.map(|a| v - a))
        .collect();
    TimeSeries::from_optional(name, &series.dates(), &diffs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::Duration;

    fn series(name: &str, values: &[f64]) -> TimeSeries {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        TimeSeries::new(
            name,
            values
                .iter()
                .enumerate()
                .map(|(i, v)| (start + Duration::days(i as i64), *v)),
        )
    }

    fn small_config() -> IndicatorConfig {
        IndicatorConfig {
            spy_ma_period: 3,
            spy_rank_window: 4,
            vix_ma_period: 3,
            vix_rank_window: 4,
            safe_haven_return_period: 2,
            safe_haven_rank_window: 3,
            growth_value_return_period: 2,
            growth_value_rank_window: 3,
        }
    }

    #[test]
    fn test_default_windows() {
        let config = IndicatorConfig::default();
        assert_eq!(config.spy_ma_period, 125);
        assert_eq!(config.spy_rank_window, 365);
        assert_eq!(config.vix_ma_period, 50);
        assert_eq!(config.vix_rank_window, 252);
        assert_eq!(config.safe_haven_return_period, 20);
        assert_eq!(config.growth_value_return_period, 252);
    }

    #[test]
    fn test_spy_metric_drops_partial_average_window() {
        let scorer = IndicatorScorer::new(small_config());
        let raw = scorer.spy_trend_metric(&series("SPY", &[1.0, 2.0, 3.0, 4.0, 5.0]));
        assert_eq!(raw.len(), 3);
        assert_relative_eq!(raw.values()[0], 1.0); // 3 - mean(1,2,3)
    }

    #[test]
    fn test_spy_score_waits_for_full_rank_window() {
        let scorer = IndicatorScorer::new(small_config());
        let prices: Vec<f64> = (0..10).map(|i| 100.0 * 1.01f64.powi(i)).collect();
        let score = scorer.score_spy_trend(&series("SPY", &prices));
        // 10 prices -> 8 raw values -> 5 full rank windows.
        assert_eq!(score.raw.len(), 8);
        assert_eq!(score.scores.len(), 5);
        assert!(score.scores.values().iter().all(|s| (*s - 100.0).abs() < 1e-9));
        assert_eq!(score.latest.unwrap().label, SentimentLabel::ExtremeGreed);
    }

    #[test]
    fn test_flat_prices_after_noise_rank_as_ties() {
        let scorer = IndicatorScorer::new(IndicatorConfig {
            spy_ma_period: 25,
            spy_rank_window: 40,
            ..small_config()
        });
        let mut prices: Vec<f64> = (0..200)
            .map(|i| 400.0 + 55.0 * ((i as f64) * 0.3).sin() + (i % 7) as f64 * 1.31)
            .collect();
        prices.extend(std::iter::repeat(123.456).take(100));

        let score = scorer.score_spy_trend(&series("SPY", &prices));
        // The last 37 rank windows hold only flat-stretch distances.
        let tail = &score.scores.values()[score.scores.len() - 37..];
        assert!(tail.iter().all(|s| *s == 100.0));
        assert_eq!(score.latest.unwrap().label, SentimentLabel::ExtremeGreed);
    }

    #[test]
    fn test_volatility_rank_is_inverted() {
        let scorer = IndicatorScorer::new(small_config());
        // Rising VIX: each diff is the highest in its window -> rank 100 -> score 0.
        let vix: Vec<f64> = (0..10).map(|i| 12.0 * 1.05f64.powi(i)).collect();
        let score = scorer.score_volatility(&series("^VIX", &vix));
        let latest = score.latest.unwrap();
        assert_relative_eq!(latest.score, 0.0);
        assert_eq!(latest.label, SentimentLabel::ExtremeFear);
    }

    #[test]
    fn test_safe_haven_spread() {
        let scorer = IndicatorScorer::new(small_config());
        let spy = series("SPY", &[100.0, 100.0, 110.0, 121.0]);
        let ief = series("IEF", &[100.0, 100.0, 100.0, 100.0]);
        let raw = scorer.safe_haven_metric(&spy, &ief);
        assert_eq!(raw.len(), 2);
        assert_relative_eq!(raw.values()[0], 0.10, epsilon = 1e-12);
        assert_relative_eq!(raw.values()[1], 0.21, epsilon = 1e-12);
    }

    #[test]
    fn test_growth_value_diff_in_points() {
        let scorer = IndicatorScorer::new(small_config());
        let spy = series("SPY", &[100.0, 100.0, 110.0]);
        let ivw = series("IVW", &[100.0, 100.0, 120.0]);
        let ive = series("IVE", &[100.0, 100.0, 105.0]);
        let raw = scorer.growth_value_metric(&spy, &ivw, &ive);
        // (20 - 10) - (5 - 10) = 15 points
        assert_eq!(raw.len(), 1);
        assert_relative_eq!(raw.values()[0], 15.0, epsilon = 1e-9);
    }

    #[test]
    fn test_multi_ticker_metrics_inner_join() {
        let scorer = IndicatorScorer::new(small_config());
        let spy = series("SPY", &[100.0, 101.0, 102.0, 103.0, 104.0]);
        let ief = series("IEF", &[100.0, 100.0, 100.0]);
        let raw = scorer.safe_haven_metric(&spy, &ief);
        assert_eq!(raw.len(), 1);
    }

    #[test]
    fn test_scores_always_in_range() {
        let scorer = IndicatorScorer::new(small_config());
        let noisy: Vec<f64> = (0..60)
            .map(|i| 100.0 + ((i * 17) % 23) as f64 - (i % 5) as f64)
            .collect();
        let spy = series("SPY", &noisy);
        for score in [scorer.score_spy_trend(&spy), scorer.score_volatility(&spy)] {
            assert!(!score.scores.is_empty());
            for s in score.scores.values() {
                assert!((0.0..=100.0).contains(&s));
            }
            assert_eq!(score.labels.len(), score.scores.len());
        }
    }
}
