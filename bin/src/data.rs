//! Provider selection for the CLI.
//!
//! With a data directory every table is read from CSV files; otherwise the
//! universe is scraped from Wikipedia and market data comes from FMP.

use crate::config::StrategyConfig;
use anyhow::{Context, Result};
use malaga::data::{CsvMarketData, CsvUniverse, FmpClient, WikipediaSp500};
use malaga::traits::FundamentalField;
use malaga::{Date, MarketDataProvider, PriceTable, Symbol, Universe, UniverseProvider};
use polars::prelude::DataFrame;
use std::path::{Path, PathBuf};
use tracing::info;

/// Constituent source chosen at startup.
#[derive(Debug)]
pub(crate) enum Constituents {
    Wikipedia(WikipediaSp500),
    Csv(CsvUniverse),
}

impl UniverseProvider for Constituents {
    async fn constituents(&self) -> malaga::Result<Universe> {
        match self {
            Self::Wikipedia(provider) => provider.constituents().await,
            Self::Csv(provider) => provider.constituents().await,
        }
    }
}

/// Price and fundamentals source chosen at startup.
#[derive(Debug)]
pub(crate) enum Market {
    Fmp(FmpClient),
    Csv(CsvMarketData),
}

impl MarketDataProvider for Market {
    async fn closing_prices(
        &self,
        symbols: &[Symbol],
        start: Date,
        end: Date,
    ) -> malaga::Result<PriceTable> {
        match self {
            Self::Fmp(provider) => provider.closing_prices(symbols, start, end).await,
            Self::Csv(provider) => provider.closing_prices(symbols, start, end).await,
        }
    }

    async fn fundamentals(
        &self,
        symbols: &[Symbol],
        fields: &[FundamentalField],
    ) -> malaga::Result<DataFrame> {
        match self {
            Self::Fmp(provider) => provider.fundamentals(symbols, fields).await,
            Self::Csv(provider) => provider.fundamentals(symbols, fields).await,
        }
    }
}

/// Constituents from `dir`, or from Wikipedia when no directory is set.
pub(crate) fn constituents(config: &StrategyConfig, dir: Option<&Path>) -> Result<Constituents> {
    match dir {
        Some(dir) => {
            let path = universe_path(config, dir);
            info!(path = %path.display(), "reading constituents from CSV");
            Ok(Constituents::Csv(CsvUniverse::new(path)))
        }
        None => {
            info!("scraping S&P 500 constituents from Wikipedia");
            Ok(Constituents::Wikipedia(
                WikipediaSp500::new().context("failed to build Wikipedia client")?,
            ))
        }
    }
}

/// Market data from `dir`, or from FMP when no directory is set.
pub(crate) fn market(dir: Option<&Path>) -> Result<Market> {
    match dir {
        Some(dir) => {
            info!(dir = %dir.display(), "reading market data from CSV");
            Ok(Market::Csv(CsvMarketData::new(dir)))
        }
        None => {
            let client = FmpClient::from_env()
                .context("FMP_API_KEY is not set; pass --data-dir to read local CSV files")?;
            Ok(Market::Fmp(client))
        }
    }
}

fn universe_path(config: &StrategyConfig, dir: &Path) -> PathBuf {
    dir.join(&config.data.universe_file)
}
