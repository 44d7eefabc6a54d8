//! Core data types for sentiment scoring.
//!
//! Price history is carried as a date-ordered `TimeSeries` of closes; option
//! activity is carried as an `OptionsSnapshot` of per-expiration chains, in the
//! shape the vendor delivers it.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Option type (call or put).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

/// A single dated observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

/// A date-ordered series of values.
///
/// Dates are strictly increasing and every value is finite. Construction
/// sorts the input, keeps the last value for a repeated date and drops
/// NaN/infinite values, so downstream rolling windows never see gaps
/// that are not real missing trading days. Deserialized series go through
/// the same construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawTimeSeries")]
pub struct TimeSeries {
    /// Ticker or metric name.
    pub name: String,
    points: Vec<Observation>,
}

#[derive(Deserialize)]
struct RawTimeSeries {
    name: String,
    #[serde(default)]
    points: Vec<Observation>,
}

impl From<RawTimeSeries> for TimeSeries {
    fn from(raw: RawTimeSeries) -> Self {
        Self::new(raw.name, raw.points.into_iter().map(|p| (p.date, p.value)))
    }
}

impl TimeSeries {
    /// Build a series from unordered (date, value) pairs.
    pub fn new(name: impl Into<String>, pairs: impl IntoIterator<Item = (NaiveDate, f64)>) -> Self {
        let mut points: Vec<Observation> = pairs
            .into_iter()
            .filter(|(_, v)| v.is_finite())
            .map(|(date, value)| Observation { date, value })
            .collect();

        // Stable sort keeps input order among equal dates, so the last one wins below.
        points.sort_by_key(|p| p.date);
        let mut deduped: Vec<Observation> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if last.date == point.date => *last = point,
                _ => deduped.push(point),
            }
        }

        Self {
            name: name.into(),
            points: deduped,
        }
    }

    /// Build a series from parallel date/value slots, skipping empty slots.
    pub fn from_optional(
        name: impl Into<String>,
        dates: &[NaiveDate],
        values: &[Option<f64>],
    ) -> Self {
        Self::new(
            name,
            dates
                .iter()
                .zip(values.iter())
                .filter_map(|(d, v)| v.map(|v| (*d, v))),
        )
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Observation] {
        &self.points
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn latest(&self) -> Option<&Observation> {
        self.points.last()
    }

    /// Value on an exact date.
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.position(date).map(|idx| self.points[idx].value)
    }

    /// Index of an exact date.
    pub fn position(&self, date: NaiveDate) -> Option<usize> {
        self.points.binary_search_by_key(&date, |p| p.date).ok()
    }

    /// Keep observations on or after `start`.
    pub fn since(&self, start: NaiveDate) -> Self {
        let from = self.points.partition_point(|p| p.date < start);
        Self {
            name: self.name.clone(),
            points: self.points[from..].to_vec(),
        }
    }

    /// Keep observations on or before `end`.
    pub fn until(&self, end: NaiveDate) -> Self {
        let to = self.points.partition_point(|p| p.date <= end);
        Self {
            name: self.name.clone(),
            points: self.points[..to].to_vec(),
        }
    }

    /// Inner join on date with another series.
    pub fn align(&self, other: &TimeSeries) -> Vec<(NaiveDate, f64, f64)> {
        let mut out = Vec::with_capacity(self.len().min(other.len()));
        let (mut i, mut j) = (0, 0);
        while i < self.points.len() && j < other.points.len() {
            let (a, b) = (&self.points[i], &other.points[j]);
            match a.date.cmp(&b.date) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    out.push((a.date, a.value, b.value));
                    i += 1;
                    j += 1;
                }
            }
        }
        out
    }
}

/// One option contract row from a chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionContract {
    /// Strike price
    pub strike: Decimal,

    /// Trading volume (vendor may omit it for untraded strikes)
    #[serde(default)]
    pub volume: i64,

    /// Open interest
    #[serde(default)]
    pub open_interest: i64,

    /// Implied volatility as a fraction (0.20 = 20%)
    #[serde(default)]
    pub implied_volatility: f64,
}

impl OptionContract {
    /// Strike divided by spot.
    pub fn moneyness(&self, spot: f64) -> Option<f64> {
        if spot <= 0.0 {
            return None;
        }
        let strike: f64 = self.strike.try_into().ok()?;
        Some(strike / spot)
    }
}

/// All options for a single expiration date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsChain {
    /// Expiration date for this chain
    pub expiration: NaiveDate,

    /// Call rows
    #[serde(default)]
    pub calls: Vec<OptionContract>,

    /// Put rows
    #[serde(default)]
    pub puts: Vec<OptionContract>,
}

impl OptionsChain {
    /// Create a new empty chain.
    pub fn new(expiration: NaiveDate) -> Self {
        Self {
            expiration,
            calls: Vec::new(),
            puts: Vec::new(),
        }
    }

    /// Rows for one side of the chain.
    pub fn side(&self, option_type: OptionType) -> &[OptionContract] {
        match option_type {
            OptionType::Call => &self.calls,
            OptionType::Put => &self.puts,
        }
    }

    /// Days to expiration as of `date`.
    pub fn dte(&self, date: NaiveDate) -> i64 {
        (self.expiration - date).num_days()
    }
}

/// Option chains for one underlying as of one date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsSnapshot {
    /// Date the chains were captured
    pub date: NaiveDate,

    /// Underlying symbol
    pub ticker: String,

    /// Spot price of the underlying
    pub underlying_price: Decimal,

    /// Chains keyed by expiration
    #[serde(default)]
    pub chains: Vec<OptionsChain>,
}

impl OptionsSnapshot {
    /// Create a new empty snapshot.
    pub fn new(date: NaiveDate, ticker: String, underlying_price: Decimal) -> Self {
        Self {
            date,
            ticker,
            underlying_price,
            chains: Vec::new(),
        }
    }

    /// Spot as f64, if representable and positive.
    pub fn spot(&self) -> Option<f64> {
        let spot: f64 = self.underlying_price.try_into().ok()?;
        (spot > 0.0).then_some(spot)
    }

    /// The `n` nearest expirations, ordered by expiration date.
    pub fn nearest_expirations(&self, n: usize) -> Vec<&OptionsChain> {
        let mut chains: Vec<&OptionsChain> = self.chains.iter().collect();
        chains.sort_by_key(|c| c.expiration);
        chains.truncate(n);
        chains
    }

    /// Total number of contract rows in this snapshot.
    pub fn total_contracts(&self) -> usize {
        self.chains
            .iter()
            .map(|c| c.calls.len() + c.puts.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, n).unwrap()
    }

    #[test]
    fn test_series_sorts_dedups_and_drops_nan() {
        let series = TimeSeries::new(
            "SPY",
            vec![(day(3), 3.0), (day(1), 1.0), (day(2), f64::NAN), (day(3), 4.0)],
        );
        assert_eq!(series.dates(), vec![day(1), day(3)]);
        assert_eq!(series.get(day(3)), Some(4.0));
        assert_eq!(series.get(day(2)), None);
    }

    #[test]
    fn test_deserialized_series_is_normalized() {
        let json = r#"{
            "name": "SPY",
            "points": [
                {"date": "2024-01-03", "value": 3.0},
                {"date": "2024-01-01", "value": 1.0},
                {"date": "2024-01-03", "value": 4.0}
            ]
        }"#;
        let series: TimeSeries = serde_json::from_str(json).unwrap();
        assert_eq!(series.dates(), vec![day(1), day(3)]);
        assert_eq!(series.get(day(3)), Some(4.0));
        assert_eq!(series.position(day(1)), Some(0));
    }

    #[test]
    fn test_align_is_inner_join() {
        let a = TimeSeries::new("a", vec![(day(1), 1.0), (day(2), 2.0), (day(4), 4.0)]);
        let b = TimeSeries::new("b", vec![(day(2), 20.0), (day(3), 30.0), (day(4), 40.0)]);
        let joined = a.align(&b);
        assert_eq!(joined, vec![(day(2), 2.0, 20.0), (day(4), 4.0, 40.0)]);
    }

    #[test]
    fn test_since_and_until_trim_dates() {
        let series = TimeSeries::new("a", (1..=5).map(|d| (day(d), d as f64)));
        assert_eq!(series.since(day(4)).values(), vec![4.0, 5.0]);
        assert_eq!(series.until(day(2)).values(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_nearest_expirations_sorted_and_truncated() {
        let mut snapshot = OptionsSnapshot::new(day(1), "SPY".to_string(), dec!(500));
        for d in [20, 5, 12] {
            snapshot.chains.push(OptionsChain::new(day(d)));
        }
        let nearest: Vec<NaiveDate> = snapshot
            .nearest_expirations(2)
            .iter()
            .map(|c| c.expiration)
            .collect();
        assert_eq!(nearest, vec![day(5), day(12)]);
        assert_eq!(snapshot.chains[0].dte(day(1)), 19);
    }

    #[test]
    fn test_moneyness() {
        let contract = OptionContract {
            strike: dec!(550),
            volume: 0,
            open_interest: 0,
            implied_volatility: 0.2,
        };
        assert!((contract.moneyness(500.0).unwrap() - 1.1).abs() < 1e-12);
        assert_eq!(contract.moneyness(0.0), None);
    }
}
