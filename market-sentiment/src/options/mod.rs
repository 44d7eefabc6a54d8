//! Options activity analytics over a single chain snapshot.
//!
//! Provides:
//! - Put/call volume and open-interest ratios with quadrant classification
//! - Implied-volatility skew ratios, diagnostics and smoothed skew curves

pub mod put_call;
pub mod skew;

pub use put_call::{
    ExpirationRatios, OptionsQuadrant, PutCallAnalyzer, PutCallConfig, PutCallSummary,
};
pub use skew::{
    CurvePoint, DiagnosticLevel, ExpirationSkew, SkewAnalyzer, SkewConfig, SkewCurve,
    SkewDiagnostic, SkewSummary,
};
