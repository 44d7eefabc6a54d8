//! Research appendix studies over the composite score.
//!
//! Provides:
//! - Standardized rolling correlation between composite score and SPY
//! - Extreme-fear recovery times
//! - Forward SPY returns grouped by composite label

pub mod config;
pub mod correlation;
pub mod forward_returns;
pub mod recovery;

pub use config::AppendixConfig;
pub use correlation::{CorrelationPoint, CorrelationStudy};
pub use forward_returns::{ForwardReturnCell, ForwardReturnStudy};
pub use recovery::{RecoveryEvent, RecoveryStudy};
