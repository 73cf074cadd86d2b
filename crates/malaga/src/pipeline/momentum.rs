//! High-quality momentum screen.

use super::{latest_closes, select_symbols};
use malaga_combine::{EqualWeightCombiner, aggregate};
use malaga_portfolio::{
    AllocationConfig, SelectionConfig, ShareAllocator, SortOrder, rank_and_select,
};
use malaga_signals::momentum::PeriodReturns;
use malaga_signals::{MomentumConfig, MomentumSignal, PercentileScorer, PeriodResolution};
use malaga_traits::{
    MarketDataProvider, PriceTable, Result, SYMBOL_COLUMN, Universe, UniverseProvider, Watchlist,
};
use polars::prelude::{NamedFrom, Series};
use tracing::info;

/// Column holding the latest close of each symbol.
pub const CLOSE_PRICE: &str = "Close Price";

/// Result of a momentum run.
#[derive(Debug, Clone)]
pub struct MomentumRun {
    /// Selected and sized symbols, best composite first.
    pub watchlist: Watchlist,
    /// How each period's date was resolved.
    pub resolutions: Vec<PeriodResolution>,
}

/// Universe → prices → period returns → percentiles → HQM score → top N →
/// share counts.
///
/// Selection is always descending on the composite. Share counts are sized
/// from [`CLOSE_PRICE`].
#[derive(Debug, Clone, Default)]
pub struct MomentumPipeline {
    signal: MomentumSignal,
    scorer: PercentileScorer,
    combiner: EqualWeightCombiner,
    selection: SelectionConfig,
    allocator: ShareAllocator,
}

impl MomentumPipeline {
    /// Pipeline for the given horizons with default scoring, selection and
    /// allocation.
    #[must_use]
    pub fn new(config: MomentumConfig) -> Self {
        Self {
            signal: MomentumSignal::new(config),
            ..Self::default()
        }
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

    /// Replaces the selection settings; the order stays descending.
    #[must_use]
    pub fn with_selection(mut self, selection: SelectionConfig) -> Self {
        self.selection = SelectionConfig {
            top_n: selection.top_n,
            order: SortOrder::Descending,
        };
        self
    }

    /// Replaces the allocation settings; the price column stays
    /// [`CLOSE_PRICE`].
    #[must_use]
    pub fn with_allocation(mut self, allocation: AllocationConfig) -> Self {
        self.allocator = ShareAllocator::new(AllocationConfig {
            price_column: CLOSE_PRICE.to_string(),
            ..allocation
        });
        self
    }

    /// The momentum configuration.
    pub const fn config(&self) -> &MomentumConfig {
        self.signal.config()
    }

    /// Fetches the universe and its prices, then screens them.
    ///
    /// # Errors
    ///
    /// Fails on an invalid configuration before any request, and on any
    /// provider or screening failure.
    pub async fn run<U, M>(&self, universe: &U, market: &M) -> Result<MomentumRun>
    where
        U: UniverseProvider,
        M: MarketDataProvider,
    {
        let config = self.config();
        config.validate()?;

        let universe = universe.constituents().await?;
        info!(constituents = universe.len(), "loaded universe");

        let prices = market
            .closing_prices(universe.symbols(), config.start_date, config.end_date)
            .await?;
        self.screen(&universe, &prices)
    }

    /// Screens `universe` against a price table covering the configured
    /// window.
    ///
    /// # Errors
    ///
    /// - `DataUnavailable` if a universe symbol has no price column
    /// - `DateNotFound` if a horizon cannot be resolved
    pub fn screen(&self, universe: &Universe, prices: &PriceTable) -> Result<MomentumRun> {
        let config = self.config();
        let prices = select_symbols(prices, universe.symbols())?;

        let PeriodReturns {
            watchlist,
            resolutions,
        } = self.signal.score(&prices, &self.scorer)?;

        let percentiles = config.percentile_columns();
        let scored = aggregate(
            &self.combiner,
            &watchlist,
            percentiles.as_slice(),
            &config.score_column,
        )?;

        let closes = latest_closes(&prices, &scored.symbols()?)?;
        let priced = scored.with_series(Series::new(CLOSE_PRICE.into(), closes))?;

        let selected = rank_and_select(&priced, &config.score_column, &self.selection)?;
        let sized = self.allocator.allocate(&selected)?;
        info!(
            selected = sized.len(),
            of = universe.len(),
            "momentum screen complete"
        );

        let output_column = &self.allocator.config().output_column;
        let mut columns = vec![SYMBOL_COLUMN, CLOSE_PRICE, output_column.as_str()];
        for (label, percentile) in config.period_labels.iter().zip(&percentiles) {
            columns.push(label);
            columns.push(percentile);
        }
        columns.push(&config.score_column);

        Ok(MomentumRun {
            watchlist: sized.select(&columns)?,
            resolutions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::fixtures::{StaticMarket, StaticUniverse, date};
    use approx::assert_relative_eq;
    use malaga_signals::{OffsetUnit, PercentileConfig};
    use malaga_traits::{Date, MalagaError, NanPolicy};
    use std::collections::HashMap;

    /// Daily weekday dates from 2024-01-01 (a Monday) for `weeks` weeks.
    fn weekdays(weeks: u32) -> Vec<Date> {
        (0..weeks * 7)
            .map(|d| date(2024, 1, 1) + chrono::Days::new(u64::from(d)))
            .filter(|d| chrono::Datelike::weekday(d).number_from_monday() <= 5)
            .collect()
    }

    fn config() -> MomentumConfig {
        MomentumConfig {
            period_labels: vec!["1W return".to_string(), "2W return".to_string()],
            offset_unit: OffsetUnit::Days,
            period_offsets: vec![7, 14],
            start_date: date(2024, 1, 1),
            end_date: date(2024, 1, 31),
            fill_missing_returns: Some(0.0),
            score_column: "HQM Score".to_string(),
        }
    }

    fn market() -> StaticMarket {
        let dates = weekdays(3);
        let n = dates.len();
        let ramp = |start: f64, step: f64| -> Vec<Option<f64>> {
            (0..n).map(|i| Some(start + step * i as f64)).collect()
        };
        StaticMarket {
            dates,
            closes: HashMap::from([
                ("AAA", ramp(100.0, 1.0)),
                ("BBB", ramp(50.0, 2.0)),
                ("CCC", ramp(80.0, -1.0)),
            ]),
            ..StaticMarket::default()
        }
    }

    #[tokio::test]
    async fn test_run_ranks_and_sizes() {
        let pipeline = MomentumPipeline::new(config()).with_allocation(AllocationConfig {
            portfolio_notional: 1_000.0,
            ..AllocationConfig::default()
        });
        let run = pipeline
            .run(&StaticUniverse(vec!["AAA", "BBB", "CCC"]), &market())
            .await
            .unwrap();

        let watchlist = run.watchlist;
        assert_eq!(watchlist.symbols().unwrap(), vec!["BBB", "AAA", "CCC"]);
        assert_eq!(
            watchlist.columns(),
            vec![
                "symbol",
                "Close Price",
                "Num_shares_to_buy",
                "1W return",
                "1W return percentile",
                "2W return",
                "2W return percentile",
                "HQM Score",
            ]
        );

        let score = watchlist.values("HQM Score").unwrap();
        assert_relative_eq!(score[0], 1.0);
        assert_relative_eq!(score[2], 1.0 / 3.0);

        // BBB closes at 50 + 2 * 14 = 78 on the last of 15 weekdays.
        let close = watchlist.values(CLOSE_PRICE).unwrap();
        assert_relative_eq!(close[0], 78.0);
        let shares = watchlist.optional_values("Num_shares_to_buy").unwrap();
        assert_eq!(shares[0], Some(12.0));

        assert_eq!(run.resolutions.len(), 2);
        assert!(run.resolutions.iter().all(|r| !r.fell_back));
    }

    #[tokio::test]
    async fn test_top_n_truncates() {
        let pipeline = MomentumPipeline::new(config()).with_selection(SelectionConfig {
            top_n: 2,
            order: SortOrder::Ascending,
        });
        let run = pipeline
            .run(&StaticUniverse(vec!["AAA", "BBB", "CCC"]), &market())
            .await
            .unwrap();
        assert_eq!(run.watchlist.symbols().unwrap(), vec!["BBB", "AAA"]);
    }

    #[tokio::test]
    async fn test_missing_percentile_input_sorts_last() {
        // DDD starts trading after the first horizon, so its 1W return stays NaN.
        let mut market = market();
        let n = market.dates.len();
        let gappy: Vec<Option<f64>> = (0..n)
            .map(|i| (i > 5).then_some(200.0 + 10.0 * i as f64))
            .collect();
        market.closes.insert("DDD", gappy);
        market.closes.remove("CCC");

        let pipeline = MomentumPipeline::new(MomentumConfig {
            fill_missing_returns: None,
            ..config()
        })
        .with_scorer(PercentileScorer::new(PercentileConfig {
            nan_policy: NanPolicy::Omit,
        }));
        let run = pipeline
            .run(&StaticUniverse(vec!["AAA", "BBB", "DDD"]), &market)
            .await
            .unwrap();

        let symbols = run.watchlist.symbols().unwrap();
        assert_eq!(symbols.last().map(String::as_str), Some("DDD"));
        let score = run.watchlist.values("HQM Score").unwrap();
        assert!(score[2].is_nan());
        assert!(score[..2].iter().all(|s| s.is_finite()));
    }

    #[test]
    fn test_missing_price_column_is_fatal() {
        let result = MomentumPipeline::new(config())
            .screen(
                &Universe::from_symbols(vec!["AAA".to_string(), "ZZZ".to_string()]).unwrap(),
                &market_table(),
            );
        assert!(matches!(result, Err(MalagaError::DataUnavailable(_))));
    }

    #[tokio::test]
    async fn test_mismatched_config_fails_before_fetch() {
        let pipeline = MomentumPipeline::new(MomentumConfig {
            period_offsets: vec![7],
            ..config()
        });
        let result = pipeline
            .run(&StaticUniverse(vec!["AAA"]), &StaticMarket::default())
            .await;
        assert!(matches!(result, Err(MalagaError::ConfigurationMismatch(_))));
    }

    #[tokio::test]
    async fn test_horizon_past_end_fails_before_fetch() {
        let pipeline = MomentumPipeline::new(MomentumConfig {
            end_date: date(2024, 1, 10),
            ..config()
        });
        let result = pipeline
            .run(&StaticUniverse(vec!["AAA"]), &StaticMarket::default())
            .await;
        assert!(matches!(result, Err(MalagaError::InvalidDate(_))));
    }

    fn market_table() -> PriceTable {
        let market = market();
        let columns = ["AAA", "BBB"]
            .iter()
            .map(|s| (s.to_string(), market.closes[s].clone()))
            .collect();
        PriceTable::from_columns(market.dates, columns).unwrap()
    }
}
