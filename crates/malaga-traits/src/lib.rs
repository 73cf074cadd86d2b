#![doc(issue_tracker_base_url = "https://github.com/factordynamics/malaga/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types and trait definitions for the malaga screening toolkit.
//!
//! This crate provides the foundational abstractions shared by every stage of
//! a screen: the error taxonomy, the price/universe/watchlist tables, the
//! provider traits for external data, and the percentile statistics.

/// The version of the malaga-traits crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod error;
pub mod provider;
pub mod stats;
pub mod types;

// Re-exports
pub use error::{MalagaError, Result};
pub use provider::{FundamentalField, MarketDataProvider, UniverseProvider, normalize_symbol};
pub use stats::NanPolicy;
pub use types::{
    DATE_COLUMN, Date, PriceTable, SYMBOL_COLUMN, Symbol, Universe, Watchlist, parse_date,
};
