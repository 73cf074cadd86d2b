//! Error types for the data providers.

use malaga_traits::MalagaError;
use thiserror::Error;

/// Errors that can occur when using the FMP API.
#[derive(Debug, Error)]
pub enum FmpError {
    /// Missing API key.
    #[error("FMP_API_KEY environment variable not set")]
    MissingApiKey,

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("Failed to parse JSON response: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned an error.
    #[error("FMP API error: {0}")]
    Api(String),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded. Free tier allows 250 requests/day.")]
    RateLimitExceeded,

    /// Symbol not found.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// No data available.
    #[error("No data available for {0}")]
    NoData(String),
}

/// Errors that can occur when loading index constituents.
#[derive(Debug, Error)]
pub enum UniverseError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The page did not contain the expected table.
    #[error("Constituents table not found: {0}")]
    TableNotFound(String),

    /// The table had no usable rows.
    #[error("Constituents table is empty")]
    Empty,

    /// The parsed rows did not form a valid universe.
    #[error("Invalid constituents table: {0}")]
    Table(String),
}

impl From<FmpError> for MalagaError {
    fn from(error: FmpError) -> Self {
        match error {
            FmpError::NoData(what) => Self::DataUnavailable(what),
            other => Self::DataFetch(other.to_string()),
        }
    }
}

impl From<UniverseError> for MalagaError {
    fn from(error: UniverseError) -> Self {
        match error {
            UniverseError::Empty => Self::DataUnavailable("constituents table is empty".to_string()),
            other => Self::DataFetch(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_into_malaga_error() {
        let error: MalagaError = FmpError::RateLimitExceeded.into();
        assert!(matches!(error, MalagaError::DataFetch(_)));

        let error: MalagaError = FmpError::NoData("AAPL".to_string()).into();
        assert!(matches!(error, MalagaError::DataUnavailable(_)));

        let error: MalagaError = UniverseError::Empty.into();
        assert!(matches!(error, MalagaError::DataUnavailable(_)));
    }
}
