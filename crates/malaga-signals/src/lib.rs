//! Signal implementations for the malaga screens.
//!
//! This crate turns raw prices and fundamentals into ranked factor columns:
//! - Period: cumulative returns resolved at forward offsets from a start date
//! - Percentile: cross-sectional mean-rank percentiles in `[0, 1]`
//! - Momentum: monthly and weekly high-quality momentum horizons
//! - Value: valuation multiples including derived enterprise-value ratios
//!
//! # Example
//!
//! ```ignore
//! use malaga_signals::momentum::{MomentumConfig, MomentumSignal};
//! use malaga_signals::PercentileScorer;
//!
//! let signal = MomentumSignal::new(MomentumConfig::monthly());
//! let scored = signal.score(&prices, &PercentileScorer::default())?;
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod momentum;
pub mod percentile;
pub mod period;
pub mod registry;
pub mod value;

// Re-export key types
pub use momentum::{HQM_SCORE, MomentumConfig, MomentumSignal};
pub use percentile::{PercentileConfig, PercentileScorer, percentile_column};
pub use period::{OffsetUnit, PeriodExtraction, PeriodResolution, PeriodReturnExtractor};
pub use registry::{StrategyInfo, StrategyKind};
pub use value::{RV_SCORE, ValueConfig, ValueRatio, ValueSignal};
