#![doc(issue_tracker_base_url = "https://github.com/factordynamics/malaga/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! # malaga
//!
//! Momentum, value and equal-weight stock screens.
//!
//! malaga is an umbrella crate that re-exports the malaga sub-crates and
//! wires them into end-to-end screens.
//!
//! ## Quick Start
//!
//! ```ignore
//! use malaga::data::{FmpClient, WikipediaSp500};
//! use malaga::pipeline::MomentumPipeline;
//! use malaga::signals::MomentumConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let universe = WikipediaSp500::new()?;
//!     let market = FmpClient::from_env()?;
//!
//!     let run = MomentumPipeline::new(MomentumConfig::monthly())
//!         .run(&universe, &market)
//!         .await?;
//!     println!("{}", run.watchlist.data());
//!     Ok(())
//! }
//! ```
//!
//! ## Crate Organization
//!
//! - [`traits`] - Error taxonomy, tables and provider traits
//! - [`signals`] - Period returns, percentiles, momentum and value signals
//! - [`combine`] - Composite score aggregation
//! - [`portfolio`] - Ranking, share allocation and Monte Carlo simulation
//! - [`data`] - FMP, Wikipedia and CSV providers
//! - [`pipeline`] - End-to-end screens
//!
//! ## Architecture
//!
//! Every screen is a straight line of pure stages:
//!
//! 1. **Providers** fetch constituents, prices and fundamentals
//! 2. **Signals** turn them into per-symbol factor values and percentiles
//! 3. **Combiners** average the percentiles into one composite score
//! 4. **Selection** sorts by the composite and keeps the top N
//! 5. **Allocation** converts a notional into whole-share counts
//!
//! Each stage takes a table by reference and returns a new one.

/// Version information for the malaga crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod pipeline;

/// Core types and provider traits.
///
/// - [`Watchlist`], [`PriceTable`], [`Universe`] - the tables every stage passes along
/// - [`UniverseProvider`], [`MarketDataProvider`] - external data seams
/// - [`MalagaError`] - run-level and symbol-level failures
pub mod traits {
    pub use malaga_traits::*;
}

// Re-export core traits at top level for convenience
pub use malaga_combine::Combiner;
pub use malaga_traits::{MarketDataProvider, UniverseProvider};

// Re-export error types
pub use malaga_traits::{MalagaError, Result};

// Re-export common types
pub use malaga_traits::{Date, PriceTable, Symbol, Universe, Watchlist};

/// Signal implementations.
///
/// ## Momentum
///
/// Cumulative returns over 1M/3M/6M/1Y (or 1W/2W/4W/12W) horizons resolved
/// forward from a start date, falling back one business day when a target
/// date is not a trading day.
///
/// ## Value
///
/// PE, PB, PS, EV/EBITDA and EV/gross profit multiples. Lower is cheaper.
///
/// # Example
///
/// ```ignore
/// use malaga::signals::{MomentumConfig, MomentumSignal, PercentileScorer};
///
/// let signal = MomentumSignal::new(MomentumConfig::weekly());
/// let scored = signal.score(&prices, &PercentileScorer::default())?;
/// ```
pub mod signals {
    pub use malaga_signals::*;
}

/// Composite score aggregation.
///
/// ```ignore
/// use malaga::combine::{EqualWeightCombiner, aggregate};
///
/// let scored = aggregate(&EqualWeightCombiner::default(), &watchlist, &columns, "HQM Score")?;
/// ```
pub mod combine {
    pub use malaga_combine::*;
}

/// Ranking, share allocation and Monte Carlo simulation.
pub mod portfolio {
    pub use malaga_portfolio::*;
}

/// Data providers.
///
/// ## Setup
///
/// 1. Get a free API key at <https://financialmodelingprep.com/>
/// 2. Set the `FMP_API_KEY` environment variable or add to `.env` file
///
/// Without a key, [`CsvUniverse`](malaga_data::CsvUniverse) and
/// [`CsvMarketData`](malaga_data::CsvMarketData) read the same tables from
/// local files.
pub mod data {
    pub use malaga_data::*;
}

/// Prelude module for convenient imports.
///
/// ```ignore
/// use malaga::prelude::*;
/// ```
pub mod prelude {
    pub use crate::pipeline::{
        EqualWeightPipeline, MomentumPipeline, MonteCarloPipeline, ValuePipeline,
    };
    pub use crate::traits::*;
    pub use crate::{Combiner, MalagaError, Result};
}
