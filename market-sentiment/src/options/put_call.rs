//! Put/call ratio quadrants.
//!
//! Volume PCR reads as immediate flow, open-interest PCR as standing
//! commitment. Their averages over the nearest expirations place the market
//! in one of four quadrants:
//! - Capitulation: both ratios > 1
//! - Bullish Setup: both ratios <= 1
//! - Tactical Hedging: volume > 1, open interest <= 1
//! - Short Covering: volume <= 1, open interest > 1

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::data::{OptionContract, OptionsChain, OptionsSnapshot};

/// Put/call positioning quadrant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionsQuadrant {
    ShortCovering,
    Capitulation,
    BullishSetup,
    TacticalHedging,
}

impl OptionsQuadrant {
    /// All quadrants, high-OI row first, low-volume column first.
    pub const ALL: [OptionsQuadrant; 4] = [
        Self::ShortCovering,
        Self::Capitulation,
        Self::BullishSetup,
        Self::TacticalHedging,
    ];

    /// Place a (volume PCR, OI PCR) pair.
    pub fn classify(volume_ratio: f64, oi_ratio: f64) -> Self {
        match (volume_ratio > 1.0, oi_ratio > 1.0) {
            (true, true) => Self::Capitulation,
            (false, false) => Self::BullishSetup,
            (true, false) => Self::TacticalHedging,
            (false, true) => Self::ShortCovering,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Capitulation => "Capitulation",
            Self::BullishSetup => "Bullish Setup",
            Self::TacticalHedging => "Tactical Hedging",
            Self::ShortCovering => "Short Covering",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Capitulation => "Extreme fear: heavy put flow on top of heavy put positioning",
            Self::BullishSetup => "Extreme greed: calls dominate both flow and positioning",
            Self::TacticalHedging => "Panic buying of puts against call-heavy positioning",
            Self::ShortCovering => "Put-heavy positioning being unwound by call flow",
        }
    }
}

/// Analyzer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PutCallConfig {
    /// Number of nearest expirations to include.
    pub expirations: usize,
}

impl Default for PutCallConfig {
    fn default() -> Self {
        Self { expirations: 14 }
    }
}

/// Ratios for one expiration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpirationRatios {
    pub expiration: NaiveDate,
    pub dte: i64,
    pub call_volume: i64,
    pub put_volume: i64,
    pub call_open_interest: i64,
    pub put_open_interest: i64,
    /// Put volume / call volume (0 when there is no call volume).
    pub volume_ratio: f64,
    /// Put OI / call OI (0 when there is no call open interest).
    pub oi_ratio: f64,
    pub quadrant: OptionsQuadrant,
}

/// Put/call result across the nearest expirations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PutCallSummary {
    pub as_of: NaiveDate,
    pub expirations: Vec<ExpirationRatios>,
    pub avg_volume_ratio: f64,
    pub avg_oi_ratio: f64,
    /// Quadrant of the averaged ratios.
    pub quadrant: OptionsQuadrant,
    /// How many expirations fall in each quadrant on their own.
    pub quadrant_counts: Vec<(OptionsQuadrant, usize)>,
    /// Quadrant holding the most expirations.
    pub dominant_quadrant: OptionsQuadrant,
}

/// Put/call ratio analyzer.
#[derive(Debug, Clone, Default)]
pub struct PutCallAnalyzer {
    config: PutCallConfig,
}

impl PutCallAnalyzer {
    pub fn new(config: PutCallConfig) -> Self {
        Self { config }
    }

    /// Analyze the nearest expirations. `None` when the snapshot has no chains.
    pub fn analyze(&self, snapshot: &OptionsSnapshot) -> Option<PutCallSummary> {
        let expirations: Vec<ExpirationRatios> = snapshot
            .nearest_expirations(self.config.expirations)
            .into_iter()
            .map(|chain| Self::expiration_ratios(chain, snapshot.date))
            .collect();

        if expirations.is_empty() {
            return None;
        }

        let n = expirations.len() as f64;
        let avg_volume_ratio = expirations.iter().map(|e| e.volume_ratio).sum::<f64>() / n;
        let avg_oi_ratio = expirations.iter().map(|e| e.oi_ratio).sum::<f64>() / n;

        let quadrant_counts: Vec<(OptionsQuadrant, usize)> = OptionsQuadrant::ALL
            .iter()
            .map(|q| (*q, expirations.iter().filter(|e| e.quadrant == *q).count()))
            .collect();

        // First quadrant wins a tie on count.
        let mut dominant_quadrant = quadrant_counts[0].0;
        let mut best = quadrant_counts[0].1;
        for (quadrant, count) in &quadrant_counts[1..] {
            if *count > best {
                best = *count;
                dominant_quadrant = *quadrant;
            }
        }

        Some(PutCallSummary {
            as_of: snapshot.date,
            expirations,
            avg_volume_ratio,
            avg_oi_ratio,
            quadrant: OptionsQuadrant::classify(avg_volume_ratio, avg_oi_ratio),
            quadrant_counts,
            dominant_quadrant,
        })
    }

    /// Sum both sides of one chain and form the two ratios.
    pub fn expiration_ratios(chain: &OptionsChain, as_of: NaiveDate) -> ExpirationRatios {
        let call_volume = sum_by(&chain.calls, |c| c.volume);
        let put_volume = sum_by(&chain.puts, |c| c.volume);
        let call_open_interest = sum_by(&chain.calls, |c| c.open_interest);
        let put_open_interest = sum_by(&chain.puts, |c| c.open_interest);

        let volume_ratio = ratio_or_zero(put_volume, call_volume);
        let oi_ratio = ratio_or_zero(put_open_interest, call_open_interest);

        ExpirationRatios {
            expiration: chain.expiration,
            dte: chain.dte(as_of),
            call_volume,
            put_volume,
            call_open_interest,
            put_open_interest,
            volume_ratio,
            oi_ratio,
            quadrant: OptionsQuadrant::classify(volume_ratio, oi_ratio),
        }
    }
}

fn sum_by(rows: &[OptionContract], field: impl Fn(&OptionContract) -> i64) -> i64 {
    rows.iter().map(|r| field(r).max(0)).sum()
}

fn ratio_or_zero(numerator: i64, denominator: i64) -> f64 {
    if denominator > 0 {
        numerator as f64 / denominator as f64
    } else {
        0.0
    }
}
