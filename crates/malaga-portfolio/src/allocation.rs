//! Whole-share allocation of a portfolio notional.
//!
//! Two policies exist for how much of the notional each row receives:
//! - Full notional: every row is sized as if it alone received the whole
//!   portfolio, `floor(notional / price)`
//! - Equal split: the notional is first divided evenly across rows,
//!   `floor(notional / rows / price)`
//!
//! Rows without a usable price get a null allocation, never zero.

use malaga_traits::{Result, Watchlist};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// How the portfolio notional is distributed across rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationPolicy {
    /// Each row is sized against the full notional.
    #[default]
    FullNotional,
    /// The notional is split evenly across rows before sizing.
    EqualSplit,
}

/// Configuration for share allocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationConfig {
    /// Total dollars to allocate (default: 10,000,000)
    pub portfolio_notional: f64,

    /// Distribution policy (default: full notional per row)
    pub policy: AllocationPolicy,

    /// Column holding the share price (default: "Price")
    pub price_column: String,

    /// Column receiving the share count (default: "Num_shares_to_buy")
    pub output_column: String,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            portfolio_notional: 10_000_000.0,
            policy: AllocationPolicy::FullNotional,
            price_column: "Price".to_string(),
            output_column: "Num_shares_to_buy".to_string(),
        }
    }
}

/// Whole shares affordable with `budget` at `price`.
///
/// Returns `None` for a missing, non-finite or non-positive price.
pub fn shares_for(budget: f64, price: Option<f64>) -> Option<i64> {
    let price = price.filter(|p| p.is_finite() && *p > 0.0)?;
    let shares = (budget / price).floor();
    shares.is_finite().then_some(shares as i64)
}

/// Sizes whole-share positions from a price column.
///
/// # Example
///
/// ```ignore
/// use malaga_portfolio::{AllocationConfig, ShareAllocator};
///
/// let allocator = ShareAllocator::new(AllocationConfig {
///     price_column: "Close Price".to_string(),
///     ..AllocationConfig::default()
/// });
/// let sized = allocator.allocate(&watchlist)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ShareAllocator {
    config: AllocationConfig,
}

impl ShareAllocator {
    /// Create a new allocator with the given configuration.
    #[must_use]
    pub const fn new(config: AllocationConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &AllocationConfig {
        &self.config
    }

    /// Dollars available to each of `rows` rows under the configured policy.
    pub fn budget_per_row(&self, rows: usize) -> f64 {
        match self.config.policy {
            AllocationPolicy::FullNotional => self.config.portfolio_notional,
            AllocationPolicy::EqualSplit if rows > 0 => {
                self.config.portfolio_notional / rows as f64
            }
            AllocationPolicy::EqualSplit => 0.0,
        }
    }

    /// Share counts for a column of prices.
    pub fn shares(&self, prices: &[Option<f64>]) -> Vec<Option<i64>> {
        let budget = self.budget_per_row(prices.len());
        prices.iter().map(|price| shares_for(budget, *price)).collect()
    }

    /// Returns a copy of `watchlist` with the share count column added.
    ///
    /// # Errors
    ///
    /// Returns `MissingColumn` if the price column is absent.
    pub fn allocate(&self, watchlist: &Watchlist) -> Result<Watchlist> {
        let prices = watchlist.optional_values(&self.config.price_column)?;
        let shares = self.shares(&prices);

        let unallocated = shares.iter().filter(|s| s.is_none()).count();
        if unallocated > 0 {
            warn!(
                unallocated,
                price_column = %self.config.price_column,
                "rows without a usable price left unallocated"
            );
        }
        debug!(
            policy = ?self.config.policy,
            notional = self.config.portfolio_notional,
            rows = shares.len(),
            "allocated shares"
        );

        watchlist.with_optional_integers(&self.config.output_column, shares)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use proptest::prelude::*;

    fn watchlist() -> Watchlist {
        let df = df! {
            "symbol" => ["AAA", "BBB", "CCC", "DDD"],
            "Price" => [Some(50.0), Some(f64::NAN), None, Some(-1.0)],
        }
        .unwrap();
        Watchlist::new(df).unwrap()
    }

    #[test]
    fn test_full_notional() {
        let allocator = ShareAllocator::new(AllocationConfig {
            portfolio_notional: 1_000_000.0,
            ..AllocationConfig::default()
        });
        assert_eq!(allocator.shares(&[Some(50.0)]), vec![Some(20_000)]);
        assert_eq!(allocator.shares(&[Some(f64::NAN)]), vec![None]);
    }

    #[test]
    fn test_equal_split() {
        let allocator = ShareAllocator::new(AllocationConfig {
            portfolio_notional: 1_000_000.0,
            policy: AllocationPolicy::EqualSplit,
            ..AllocationConfig::default()
        });
        // 250,000 per row.
        let shares = allocator.shares(&[Some(50.0), Some(300.0), Some(7.0), None]);
        assert_eq!(shares, vec![Some(5_000), Some(833), Some(35_714), None]);
    }

    #[test]
    fn test_unusable_prices_are_null() {
        assert_eq!(shares_for(1000.0, None), None);
        assert_eq!(shares_for(1000.0, Some(f64::NAN)), None);
        assert_eq!(shares_for(1000.0, Some(f64::INFINITY)), None);
        assert_eq!(shares_for(1000.0, Some(0.0)), None);
        assert_eq!(shares_for(1000.0, Some(-5.0)), None);
        assert_eq!(shares_for(1000.0, Some(2000.0)), Some(0));
    }

    #[test]
    fn test_allocate_adds_nullable_column() {
        let input = watchlist();
        let sized = ShareAllocator::new(AllocationConfig {
            portfolio_notional: 1_000_000.0,
            ..AllocationConfig::default()
        })
        .allocate(&input)
        .unwrap();

        let column = sized
            .data()
            .column("Num_shares_to_buy")
            .unwrap()
            .as_materialized_series()
            .i64()
            .unwrap()
            .into_iter()
            .collect::<Vec<_>>();
        assert_eq!(column, vec![Some(20_000), None, None, None]);
        assert!(!input.has_column("Num_shares_to_buy"));
    }

    #[test]
    fn test_allocate_missing_price_column() {
        let allocator = ShareAllocator::new(AllocationConfig {
            price_column: "Close Price".to_string(),
            ..AllocationConfig::default()
        });
        assert!(allocator.allocate(&watchlist()).is_err());
    }

    proptest! {
        #[test]
        fn prop_full_notional_never_exceeds_budget(
            notional in 1.0f64..1.0e8,
            price in 0.01f64..5_000.0,
        ) {
            let shares = shares_for(notional, Some(price)).unwrap();
            prop_assert!(shares >= 0);
            prop_assert!(shares as f64 * price <= notional + 1e-6);
            prop_assert!((shares + 1) as f64 * price > notional - 1e-6);
        }
    }
}
