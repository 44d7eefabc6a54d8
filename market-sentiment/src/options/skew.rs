//! Implied-volatility skew diagnostics.
//!
//! For each of the nearest expirations, option rows are bucketed by
//! moneyness (strike / spot):
//! - ATM: within +-1% of spot (calls and puts)
//! - OTM calls: more than 10% above spot
//! - OTM puts: more than 10% below spot
//!
//! Three ratios of bucket-mean IV are averaged across expirations:
//! - Tail skew: OTM put IV / OTM call IV (crash bids vs squeeze bids)
//! - Put convexity: OTM put IV / ATM IV
//! - Call FOMO: OTM call IV / ATM IV
//!
//! The term-structure slope is the change in tail skew from the first to the
//! last usable expiration.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::{OptionContract, OptionType, OptionsChain, OptionsSnapshot};
use crate::stats::centered_mean;

/// Analyzer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SkewConfig {
    /// Number of nearest expirations to include.
    pub expirations: usize,
    /// Half-width of the ATM moneyness band.
    pub atm_band: f64,
    /// Distance from spot beyond which an option is OTM.
    pub otm_band: f64,
    /// Minimum IV for a row to appear on a skew curve.
    pub curve_min_iv: f64,
    /// Centered smoothing window for skew curves.
    pub smoothing_window: usize,
}

impl Default for SkewConfig {
    fn default() -> Self {
        Self {
            expirations: 14,
            atm_band: 0.01,
            otm_band: 0.10,
            curve_min_iv: 0.001,
            smoothing_window: 5,
        }
    }
}

/// How alarming a diagnostic reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticLevel {
    Alert,
    Caution,
    Calm,
}

/// Text diagnostics derived from fixed skew thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkewDiagnostic {
    StrongDownsideTailFear,
    ModerateDownsideRisk,
    BalancedTailRisk,
    CrashProtectionElevated,
    ModerateTailHedging,
    LowTailHedging,
    UpsideFomo,
    UpsideConfidence,
    NeutralUpside,
    LongTermRiskFeared,
    NearTermFearDominant,
    StableTermStructure,
}

impl SkewDiagnostic {
    pub fn message(&self) -> &'static str {
        match self {
            Self::StrongDownsideTailFear => "Strong downside tail fear",
            Self::ModerateDownsideRisk => "Moderate downside risk awareness",
            Self::BalancedTailRisk => "Balanced tail risk",
            Self::CrashProtectionElevated => "Crash protection demand elevated",
            Self::ModerateTailHedging => "Moderate tail hedging",
            Self::LowTailHedging => "Low tail hedging",
            Self::UpsideFomo => "Upside FOMO / squeeze risk",
            Self::UpsideConfidence => "Upside confidence",
            Self::NeutralUpside => "Neutral upside expectations",
            Self::LongTermRiskFeared => "Long-term risk feared",
            Self::NearTermFearDominant => "Near-term fear dominant",
            Self::StableTermStructure => "Stable term-structure sentiment",
        }
    }

    pub fn level(&self) -> DiagnosticLevel {
        match self {
            Self::StrongDownsideTailFear
            | Self::CrashProtectionElevated
            | Self::NearTermFearDominant => DiagnosticLevel::Alert,
            Self::ModerateDownsideRisk
            | Self::ModerateTailHedging
            | Self::UpsideFomo
            | Self::LongTermRiskFeared => DiagnosticLevel::Caution,
            Self::BalancedTailRisk
            | Self::LowTailHedging
            | Self::UpsideConfidence
            | Self::NeutralUpside
            | Self::StableTermStructure => DiagnosticLevel::Calm,
        }
    }

    /// One diagnostic per metric.
    pub fn diagnose(tail_skew: f64, put_convexity: f64, call_fomo: f64, slope: f64) -> Vec<Self> {
        let tail = if tail_skew > 1.3 {
            Self::StrongDownsideTailFear
        } else if tail_skew > 1.1 {
            Self::ModerateDownsideRisk
        } else {
            Self::BalancedTailRisk
        };

        let convexity = if put_convexity > 1.4 {
            Self::CrashProtectionElevated
        } else if put_convexity > 1.2 {
            Self::ModerateTailHedging
        } else {
            Self::LowTailHedging
        };

        let fomo = if call_fomo > 1.2 {
            Self::UpsideFomo
        } else if call_fomo < 1.0 {
            Self::UpsideConfidence
        } else {
            Self::NeutralUpside
        };

        let term = if slope > 0.2 {
            Self::LongTermRiskFeared
        } else if slope < -0.1 {
            Self::NearTermFearDominant
        } else {
            Self::StableTermStructure
        };

        vec![tail, convexity, fomo, term]
    }
}

/// Bucket IVs and ratios for one expiration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpirationSkew {
    pub expiration: NaiveDate,
    pub dte: i64,
    pub atm_iv: f64,
    pub otm_call_iv: f64,
    pub otm_put_iv: f64,
    pub tail_skew: f64,
    pub put_convexity: f64,
    pub call_fomo: f64,
}

/// Skew result across the nearest expirations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkewSummary {
    pub as_of: NaiveDate,
    pub spot: f64,
    /// Expirations with all three buckets populated, nearest first.
    pub expirations: Vec<ExpirationSkew>,
    pub avg_tail_skew: f64,
    pub avg_put_convexity: f64,
    pub avg_call_fomo: f64,
    pub term_structure_slope: f64,
    pub diagnostics: Vec<SkewDiagnostic>,
}

/// A point on a smoothed IV curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub strike: f64,
    pub iv: f64,
}

/// Smoothed IV by strike for one side of one expiration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkewCurve {
    pub expiration: NaiveDate,
    pub dte: i64,
    pub option_type: OptionType,
    pub points: Vec<CurvePoint>,
}

/// Volatility skew analyzer.
#[derive(Debug, Clone, Default)]
pub struct SkewAnalyzer {
    config: SkewConfig,
}

impl SkewAnalyzer {
    pub fn new(config: SkewConfig) -> Self {
        Self { config }
    }

    /// Analyze the nearest expirations.
    ///
    /// `None` when spot is unusable or no expiration has all three buckets.
    pub fn analyze(&self, snapshot: &OptionsSnapshot) -> Option<SkewSummary> {
        let spot = snapshot.spot()?;

        let expirations: Vec<ExpirationSkew> = snapshot
            .nearest_expirations(self.config.expirations)
            .into_iter()
            .filter_map(|chain| {
                let skew = self.expiration_skew(chain, spot, snapshot.date);
                if skew.is_none() {
                    debug!("Skipping {} skew: empty ATM or OTM bucket", chain.expiration);
                }
                skew
            })
            .collect();

        let first = expirations.first()?;
        let last = expirations.last()?;
        let term_structure_slope = last.tail_skew - first.tail_skew;

        let n = expirations.len() as f64;
        let avg_tail_skew = expirations.iter().map(|e| e.tail_skew).sum::<f64>() / n;
        let avg_put_convexity = expirations.iter().map(|e| e.put_convexity).sum::<f64>() / n;
        let avg_call_fomo = expirations.iter().map(|e| e.call_fomo).sum::<f64>() / n;

        let diagnostics = SkewDiagnostic::diagnose(
            avg_tail_skew,
            avg_put_convexity,
            avg_call_fomo,
            term_structure_slope,
        );

        Some(SkewSummary {
            as_of: snapshot.date,
            spot,
            expirations,
            avg_tail_skew,
            avg_put_convexity,
            avg_call_fomo,
            term_structure_slope,
            diagnostics,
        })
    }

    /// Bucket one chain. `None` if any bucket is empty.
    pub fn expiration_skew(
        &self,
        chain: &OptionsChain,
        spot: f64,
        as_of: NaiveDate,
    ) -> Option<ExpirationSkew> {
        let atm_low = 1.0 - self.config.atm_band;
        let atm_high = 1.0 + self.config.atm_band;
        let otm_call_min = 1.0 + self.config.otm_band;
        let otm_put_max = 1.0 - self.config.otm_band;

        let priced = |rows: &[OptionContract]| -> Vec<(f64, f64)> {
            rows.iter()
                .filter(|r| r.implied_volatility > 0.0)
                .filter_map(|r| r.moneyness(spot).map(|m| (m, r.implied_volatility)))
                .collect()
        };
        let calls = priced(&chain.calls);
        let puts = priced(&chain.puts);

        let atm_iv = mean_iv(
            calls
                .iter()
                .chain(puts.iter())
                .filter(|(m, _)| *m > atm_low && *m < atm_high),
        )?;
        let otm_call_iv = mean_iv(calls.iter().filter(|(m, _)| *m > otm_call_min))?;
        let otm_put_iv = mean_iv(puts.iter().filter(|(m, _)| *m < otm_put_max))?;

        Some(ExpirationSkew {
            expiration: chain.expiration,
            dte: chain.dte(as_of),
            atm_iv,
            otm_call_iv,
            otm_put_iv,
            tail_skew: otm_put_iv / otm_call_iv,
            put_convexity: otm_put_iv / atm_iv,
            call_fomo: otm_call_iv / atm_iv,
        })
    }

    /// Smoothed IV curves for every side of the nearest expirations.
    pub fn curves(&self, snapshot: &OptionsSnapshot) -> Vec<SkewCurve> {
        let mut curves = Vec::new();
        for chain in snapshot.nearest_expirations(self.config.expirations) {
            for option_type in [OptionType::Call, OptionType::Put] {
                let mut rows: Vec<(f64, f64)> = chain
                    .side(option_type)
                    .iter()
                    .filter(|r| r.implied_volatility > self.config.curve_min_iv)
                    .filter_map(|r| {
                        let strike: f64 = r.strike.try_into().ok()?;
                        Some((strike, r.implied_volatility))
                    })
                    .collect();
                if rows.is_empty() {
                    continue;
                }
                rows.sort_by(|a, b| a.0.total_cmp(&b.0));

                let ivs: Vec<f64> = rows.iter().map(|(_, iv)| *iv).collect();
                let smoothed = centered_mean(&ivs, self.config.smoothing_window);
                let points = rows
                    .iter()
                    .zip(smoothed)
                    .map(|((strike, _), iv)| CurvePoint {
                        strike: *strike,
                        iv,
                    })
                    .collect();

                curves.push(SkewCurve {
                    expiration: chain.expiration,
                    dte: chain.dte(snapshot.date),
                    option_type,
                    points,
                });
            }
        }
        curves
    }
}

fn mean_iv<'a>(rows: impl Iterator<Item = &'a (f64, f64)>) -> Option<f64> {
    let (sum, count) = rows.fold((0.0, 0usize), |(sum, count), (_, iv)| (sum + iv, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}
