//! Robust value screen.

use super::{DEFAULT_PRICE_WINDOW_DAYS, PRICE_COLUMN, latest_closes, price_window};
use malaga_combine::{EqualWeightCombiner, aggregate};
use malaga_portfolio::{
    AllocationConfig, SelectionConfig, ShareAllocator, SortOrder, rank_and_select,
};
use malaga_signals::{PercentileScorer, ValueConfig, ValueSignal};
use malaga_traits::{
    Date, MalagaError, MarketDataProvider, PriceTable, Result, SYMBOL_COLUMN, UniverseProvider,
    Watchlist,
};
use polars::prelude::{DataFrame, NamedFrom, Series};
use tracing::info;

/// Universe → latest price and fundamentals → valuation multiples →
/// percentiles → RV score → cheapest N → share counts.
///
/// Selection is always ascending on the composite. Share counts are sized
/// from [`PRICE_COLUMN`].
#[derive(Debug, Clone)]
pub struct ValuePipeline {
    signal: ValueSignal,
    scorer: PercentileScorer,
    combiner: EqualWeightCombiner,
    selection: SelectionConfig,
    allocator: ShareAllocator,
    price_window_days: u32,
}

impl Default for ValuePipeline {
    fn default() -> Self {
        Self::new(ValueConfig::default())
    }
}

impl ValuePipeline {
    /// Pipeline for the given multiples with default scoring, selection and
    /// allocation.
    #[must_use]
    pub fn new(config: ValueConfig) -> Self {
        Self {
            signal: ValueSignal::new(config),
            scorer: PercentileScorer::default(),
            combiner: EqualWeightCombiner::default(),
            selection: SelectionConfig::default(),
            allocator: ShareAllocator::default(),
            price_window_days: DEFAULT_PRICE_WINDOW_DAYS,
        }
        .with_selection(SelectionConfig::default())
        .with_allocation(AllocationConfig::default())
    }

    /// Replaces the percentile scorer.
    #[must_use]
    pub fn with_scorer(mut self, scorer: PercentileScorer) -> Self {
        self.scorer = scorer;
        self
    }

    /// Replaces the composite combiner.
    #[must_use]
    pub fn with_combiner(mut self, combiner: EqualWeightCombiner) -> Self {
        self.combiner = combiner;
        self
    }

    /// Replaces the selection settings; the order stays ascending.
    #[must_use]
    pub fn with_selection(mut self, selection: SelectionConfig) -> Self {
        self.selection = SelectionConfig {
            top_n: selection.top_n,
            order: SortOrder::Ascending,
        };
        self
    }

    /// Replaces the allocation settings; the price column stays
    /// [`PRICE_COLUMN`].
    #[must_use]
    pub fn with_allocation(mut self, allocation: AllocationConfig) -> Self {
        self.allocator = ShareAllocator::new(AllocationConfig {
            price_column: PRICE_COLUMN.to_string(),
            ..allocation
        });
        self
    }

    /// Calendar days searched backwards for a latest close.
    #[must_use]
    pub fn with_price_window(mut self, days: u32) -> Self {
        self.price_window_days = days;
        self
    }

    /// The value configuration.
    pub const fn config(&self) -> &ValueConfig {
        self.signal.config()
    }

    /// Fetches the universe, prices up to `as_of` and fundamentals, then
    /// screens them.
    ///
    /// # Errors
    ///
    /// Fails on any provider or screening failure. Per-symbol fundamentals
    /// failures are nulls, not errors.
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
            .fundamentals(symbols, &ValueSignal::required_fields())
            .await?;

        self.screen(&prices, fundamentals)
    }

    /// Screens a fundamentals table, pricing each row from `prices`.
    ///
    /// # Errors
    ///
    /// - `MissingColumn` if a required fundamental is absent
    /// - `DataUnavailable` if no symbol has every scored multiple
    pub fn screen(&self, prices: &PriceTable, fundamentals: DataFrame) -> Result<Watchlist> {
        let config = self.config();
        let fundamentals = Watchlist::new(fundamentals)?;

        let closes = latest_closes(prices, &fundamentals.symbols()?)?;
        let priced = fundamentals.with_series(Series::new(PRICE_COLUMN.into(), closes))?;

        let scored = self.signal.score(&priced, &self.scorer)?;
        if scored.is_empty() {
            return Err(MalagaError::DataUnavailable(
                "no symbol has every valuation multiple".to_string(),
            ));
        }

        let percentiles = config.percentile_columns();
        let composite = aggregate(
            &self.combiner,
            &scored,
            percentiles.as_slice(),
            &config.score_column,
        )?;

        let selected = rank_and_select(&composite, &config.score_column, &self.selection)?;
        let sized = self.allocator.allocate(&selected)?;
        info!(
            selected = sized.len(),
            scored = scored.len(),
            of = fundamentals.len(),
            "value screen complete"
        );

        let output_column = &self.allocator.config().output_column;
        let mut columns = vec![SYMBOL_COLUMN, PRICE_COLUMN, output_column.as_str()];
        for (ratio, percentile) in config.ratio_columns().into_iter().zip(percentiles) {
            columns.push(ratio);
            columns.push(percentile);
        }
        columns.push(&config.score_column);

        sized.select(&columns)
    }
}
