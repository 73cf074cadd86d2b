//! Portfolio construction for malaga screens.
//!
//! This crate turns a scored watchlist into positions:
//! - Ranking by composite score with a stable, NaN-last sort and top-N cut
//! - Whole-share allocation under a full-notional or equal-split policy
//! - Monte Carlo simulation of portfolio value paths from correlated returns
//!
//! # Example
//!
//! ```rust,ignore
//! use malaga_portfolio::{rank_and_select, SelectionConfig, ShareAllocator};
//!
//! let selected = rank_and_select(&scored, "HQM Score", &SelectionConfig::default())?;
//! let sized = ShareAllocator::default().allocate(&selected)?;
//! ```

pub mod allocation;
pub mod monte_carlo;
pub mod selection;

// Re-export main types
pub use allocation::{AllocationConfig, AllocationPolicy, ShareAllocator, shares_for};
pub use monte_carlo::{
    MonteCarloConfig, MonteCarloSimulator, ReturnStatistics, SimulationResult, SimulationSummary,
    cholesky, normalize_weights,
};
pub use selection::{SelectionConfig, SortOrder, rank_and_select, rank_order};
