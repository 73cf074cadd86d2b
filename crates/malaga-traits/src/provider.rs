//! Provider traits for the external data a screen depends on.
//!
//! A screen needs two collaborators: a [`UniverseProvider`] that lists the
//! constituents of a benchmark index, and a [`MarketDataProvider`] that
//! returns price history and point-in-time fundamentals. Both are leaves of
//! the pipeline; concrete implementations live in `malaga-data`.

use crate::{Date, PriceTable, Result, Symbol, Universe};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// A point-in-time fundamental field requested from a market data provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FundamentalField {
    /// Market capitalization.
    MarketCap,
    /// Trailing twelve-month price to earnings.
    TrailingPe,
    /// Price to book value.
    PriceToBook,
    /// Trailing twelve-month price to sales.
    PriceToSales,
    /// Enterprise value.
    EnterpriseValue,
    /// EBITDA from the latest income statement.
    Ebitda,
    /// Gross profit from the latest income statement.
    GrossProfit,
}

impl FundamentalField {
    /// Every field, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::MarketCap,
        Self::TrailingPe,
        Self::PriceToBook,
        Self::PriceToSales,
        Self::EnterpriseValue,
        Self::Ebitda,
        Self::GrossProfit,
    ];

    /// Column name used for this field in fundamentals tables.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MarketCap => "market_cap",
            Self::TrailingPe => "trailing_pe",
            Self::PriceToBook => "price_to_book",
            Self::PriceToSales => "price_to_sales",
            Self::EnterpriseValue => "enterprise_value",
            Self::Ebitda => "ebitda",
            Self::GrossProfit => "gross_profit",
        }
    }

    /// Looks a field up by its column name.
    pub fn from_column(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == name)
    }
}

/// Source of benchmark index constituents.
pub trait UniverseProvider: Send + Sync {
    /// Returns the current constituents, symbols normalised to the market
    /// data provider's convention.
    ///
    /// # Errors
    ///
    /// Fails with `DataUnavailable` when the source returns no rows, or
    /// `DataFetch` when the request itself fails.
    fn constituents(&self) -> impl Future<Output = Result<Universe>> + Send;
}

/// Source of price history and fundamentals.
pub trait MarketDataProvider: Send + Sync {
    /// Daily closing prices for `symbols` between `start` and `end` inclusive.
    ///
    /// Symbols the provider has no data for appear as all-null columns.
    ///
    /// # Errors
    ///
    /// Fails with `DataUnavailable` if no symbol returned any price.
    fn closing_prices(
        &self,
        symbols: &[Symbol],
        start: Date,
        end: Date,
    ) -> impl Future<Output = Result<PriceTable>> + Send;

    /// Point-in-time fields for `symbols`.
    ///
    /// Returns one row per requested symbol, in request order, with a
    /// `symbol` column followed by one `Float64` column per field. A field
    /// the provider lacks, or a symbol whose request fails, yields nulls
    /// rather than a dropped row.
    ///
    /// # Errors
    ///
    /// Fails only for batch-level problems; per-symbol failures are logged
    /// and recovered as nulls.
    fn fundamentals(
        &self,
        symbols: &[Symbol],
        fields: &[FundamentalField],
    ) -> impl Future<Output = Result<DataFrame>> + Send;
}

/// Normalises a ticker to the dash-separated share-class convention used by
/// price vendors, e.g. `BRK.B` → `BRK-B`.
pub fn normalize_symbol(symbol: &str) -> Symbol {
    symbol.trim().replace('.', "-")
}
