//! Data providers for malaga screens.
//!
//! - [`FmpClient`]: price history and fundamentals from the
//!   [Financial Modeling Prep](https://financialmodelingprep.com/) API
//! - [`WikipediaSp500`]: current S&P 500 constituents scraped from Wikipedia
//! - [`CsvUniverse`] and [`CsvMarketData`]: the same data read from local files
//!
//! All of them implement the provider traits from `malaga-traits`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use malaga_data::{FmpClient, WikipediaSp500};
//! use malaga_traits::{MarketDataProvider, UniverseProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let universe = WikipediaSp500::new()?.constituents().await?;
//!     let client = FmpClient::from_env()?;
//!
//!     let start = malaga_traits::parse_date("2024-01-02")?;
//!     let end = malaga_traits::parse_date("2024-12-31")?;
//!     let prices = client.closing_prices(universe.symbols(), start, end).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Environment Variables
//!
//! Set `FMP_API_KEY` in your environment or `.env` file:
//!
//! ```bash
//! FMP_API_KEY=your_api_key_here
//! ```

mod client;
mod csv;
mod error;
mod frame;
mod types;
mod universe;

pub use client::{FmpClient, FmpResult};
pub use csv::{CsvMarketData, CsvUniverse, FUNDAMENTALS_FILE, PRICES_FILE};
pub use error::{FmpError, UniverseError};
pub use types::*;
pub use universe::{SP500_URL, WikipediaSp500, parse_constituents};
