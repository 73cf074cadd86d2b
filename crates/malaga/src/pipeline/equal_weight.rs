//! Equal-weight index replication.

use super::{DEFAULT_PRICE_WINDOW_DAYS, PRICE_COLUMN, latest_closes, price_window};
use malaga_portfolio::{AllocationConfig, AllocationPolicy, ShareAllocator};
use malaga_traits::{
    Date, FundamentalField, MarketDataProvider, PriceTable, Result, SYMBOL_COLUMN,
    UniverseProvider, Watchlist,
};
use polars::prelude::{DataFrame, NamedFrom, Series};
use tracing::info;

/// Column receiving the share count.
pub const SHARES_COLUMN: &str = "num_of_shares_to_buy";

/// Universe → latest price and market cap → share counts for every
/// constituent.
#[derive(Debug, Clone)]
pub struct EqualWeightPipeline {
    allocator: ShareAllocator,
    price_window_days: u32,
}

impl Default for EqualWeightPipeline {
    fn default() -> Self {
        Self::new(AllocationConfig {
            policy: AllocationPolicy::EqualSplit,
            ..AllocationConfig::default()
        })
    }
}

impl EqualWeightPipeline {
    /// Pipeline sizing positions with `allocation`.
    ///
    /// The price and output columns are fixed to [`PRICE_COLUMN`] and
    /// [`SHARES_COLUMN`].
    #[must_use]
    pub fn new(allocation: AllocationConfig) -> Self {
        Self {
            allocator: ShareAllocator::new(AllocationConfig {
                price_column: PRICE_COLUMN.to_string(),
                output_column: SHARES_COLUMN.to_string(),
                ..allocation
            }),
            price_window_days: DEFAULT_PRICE_WINDOW_DAYS,
        }
    }

    /// Calendar days searched backwards for a latest close.
    #[must_use]
    pub fn with_price_window(mut self, days: u32) -> Self {
        self.price_window_days = days;
        self
    }

    /// The allocation settings.
    pub const fn allocation(&self) -> &AllocationConfig {
        self.allocator.config()
    }

    /// Fetches the universe with prices up to `as_of` and market caps, then
    /// sizes every constituent.
    ///
    /// # Errors
    ///
    /// Fails on any provider failure.
    pub async fn run<U, M>(&self, universe: &U, market: &M, as_of: Date) -> Result<Watchlist>
    where
        U: UniverseProvider,
        M: MarketDataProvider,
    {
        let universe = universe.constituents().await?;
        info!(constituents = universe.len(), "loaded universe");
        let symbols = universe.symbols();

        let (start, end) = price_window(as_of, self.price_window_days)?;
        let prices = market.closing_prices(symbols, start, end).await?;
        let fundamentals = market
            .fundamentals(symbols, &[FundamentalField::MarketCap])
            .await?;

        self.screen(&prices, fundamentals)
    }

    /// Prices and sizes every row of a market-cap table.
    ///
    /// # Errors
    ///
    /// Returns `MissingColumn` without a `market_cap` column.
    pub fn screen(&self, prices: &PriceTable, fundamentals: DataFrame) -> Result<Watchlist> {
        let table = Watchlist::new(fundamentals)?;
        let closes = latest_closes(prices, &table.symbols()?)?;
        let priced = table.with_series(Series::new(PRICE_COLUMN.into(), closes))?;
        let sized = self.allocator.allocate(&priced)?;

        info!(
            constituents = sized.len(),
            policy = ?self.allocation().policy,
            "equal-weight index sized"
        );
        sized.select(&[
            SYMBOL_COLUMN,
            PRICE_COLUMN,
            FundamentalField::MarketCap.as_str(),
            SHARES_COLUMN,
        ])
    }
}
