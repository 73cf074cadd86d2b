//! Composite score aggregation for malaga screens.
//!
//! This crate combines several percentile columns into one composite score.
//! The only strategy the screens use is the equal-weighted mean, exposed both
//! at the vector level ([`Combiner`]) and at the table level ([`aggregate`]).
//!
//! # Examples
//!
//! ```rust,no_run
//! use malaga_combine::{Combiner, EqualWeightCombiner, SignalScore};
//!
//! let combiner = EqualWeightCombiner::default();
//! let signals = vec![
//!     SignalScore::new("1M return percentile", vec![0.5, 0.25, 1.0]),
//!     SignalScore::new("3M return percentile", vec![0.25, 1.0, 0.5]),
//! ];
//!
//! let composite = combiner.combine(&signals).unwrap();
//! ```

mod aggregate;
mod combiner;
mod equal_weight;

// Re-export main types
pub use aggregate::aggregate;
pub use combiner::{Combiner, SignalScore};
pub use equal_weight::{EqualWeightCombiner, EqualWeightConfig};
