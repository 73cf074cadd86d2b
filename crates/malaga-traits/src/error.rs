//! Error types for the malaga toolkit.
//!
//! Every pipeline stage reports failures through [`MalagaError`]. The variants
//! separate run-level failures that abort a screen (configuration mismatches,
//! unavailable data, unresolvable dates) from symbol-level failures that
//! providers recover from locally by writing nulls.

use crate::types::Date;
use thiserror::Error;

/// The main error type for malaga operations.
#[derive(Debug, Error)]
pub enum MalagaError {
    /// Paired configuration lists (labels/offsets, targets/outputs) differ in length.
    #[error("Configuration mismatch: {0}")]
    ConfigurationMismatch(String),

    /// A provider returned no data for a whole batch.
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    /// Neither the target date nor its previous business day exist in a series.
    #[error("Date not found: {target} (fallback {fallback} also missing)")]
    DateNotFound {
        /// Date computed from the start date and the period offset.
        target: Date,
        /// Previous business day that was tried after the target.
        fallback: Date,
    },

    /// A single symbol's enrichment request failed.
    #[error("Fetch failed for {symbol}: {reason}")]
    PerSymbolFetch {
        /// Symbol whose request failed.
        symbol: String,
        /// Provider error message.
        reason: String,
    },

    /// Error when a required column is missing from a table.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// Error due to invalid or malformed data.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Error when a date is out of range or cannot be parsed.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Error fetching data from external sources.
    #[error("Data fetch error: {0}")]
    DataFetch(String),

    /// Error from Polars operations.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Generic error for other cases.
    #[error("Error: {0}")]
    Other(String),
}

impl MalagaError {
    /// Builds a [`MalagaError::ConfigurationMismatch`] for two paired lists.
    pub fn mismatch(left: &str, left_len: usize, right: &str, right_len: usize) -> Self {
        Self::ConfigurationMismatch(format!(
            "{left} has {left_len} elements but {right} has {right_len}"
        ))
    }

    /// Whether this error is recoverable at the symbol level.
    ///
    /// Providers catch these and write nulls for the affected row; every
    /// other variant aborts the run.
    pub const fn is_symbol_level(&self) -> bool {
        matches!(self, Self::PerSymbolFetch { .. })
    }
}

impl From<String> for MalagaError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for MalagaError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

/// A specialized Result type for malaga operations.
pub type Result<T> = std::result::Result<T, MalagaError>;
