//! Providers backed by local CSV files.
//!
//! A data directory holds `prices.csv` (a `date` column followed by one column
//! of closing prices per symbol) and `fundamentals.csv` (a `symbol` column
//! followed by one column per [`FundamentalField`], named by
//! [`FundamentalField::as_str`]). A constituents file needs only a `symbol`
//! or `Symbol` column.

use crate::frame::{PriceSeries, fundamentals_frame, price_table};
use malaga_traits::{
    Date, FundamentalField, MalagaError, MarketDataProvider, PriceTable, Result, SYMBOL_COLUMN,
    Symbol, Universe, UniverseProvider, Watchlist, normalize_symbol,
};
use polars::prelude::{DataFrame, DataType, LazyCsvReader, LazyFileListReader, NamedFrom, Series};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name of the wide closing price table.
pub const PRICES_FILE: &str = "prices.csv";

/// File name of the fundamentals table.
pub const FUNDAMENTALS_FILE: &str = "fundamentals.csv";

fn read_csv(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(MalagaError::DataUnavailable(format!(
            "{} does not exist",
            path.display()
        )));
    }
    debug!(path = %path.display(), "reading csv");
    Ok(LazyCsvReader::new(path)
        .with_has_header(true)
        .finish()?
        .collect()?)
}

/// Index constituents read from a CSV file.
#[derive(Debug, Clone)]
pub struct CsvUniverse {
    path: PathBuf,
}

impl CsvUniverse {
    /// Provider reading `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads and normalises the constituents.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, has no symbol column, or holds
    /// duplicate symbols after normalisation.
    pub fn load(&self) -> Result<Universe> {
        let mut frame = read_csv(&self.path)?;
        if frame.column(SYMBOL_COLUMN).is_err() && frame.column("Symbol").is_ok() {
            frame.rename("Symbol", SYMBOL_COLUMN.into())?;
        }

        let symbols: Vec<Symbol> = frame
            .column(SYMBOL_COLUMN)
            .map_err(|_| MalagaError::MissingColumn(SYMBOL_COLUMN.to_string()))?
            .as_materialized_series()
            .cast(&DataType::String)?
            .str()?
            .into_iter()
            .map(|symbol| normalize_symbol(symbol.unwrap_or_default()))
            .collect();
        frame.with_column(Series::new(SYMBOL_COLUMN.into(), symbols))?;

        Universe::new(frame)
    }
}

impl UniverseProvider for CsvUniverse {
    async fn constituents(&self) -> Result<Universe> {
        self.load()
    }
}

/// Prices and fundamentals read from a data directory.
#[derive(Debug, Clone)]
pub struct CsvMarketData {
    dir: PathBuf,
}

impl CsvMarketData {
    /// Provider reading from `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The data directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn load_prices(&self, symbols: &[Symbol], start: Date, end: Date) -> Result<PriceTable> {
        let table = PriceTable::new(read_csv(&self.dir.join(PRICES_FILE))?)?;
        let dates = table.dates();

        let mut series: Vec<PriceSeries> = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            if !table.has_symbol(symbol) {
                warn!(%symbol, "no price column, left null");
                series.push(None);
                continue;
            }
            let closes: BTreeMap<Date, f64> = dates
                .iter()
                .zip(table.column_values(symbol)?)
                .filter(|(date, _)| (start..=end).contains(*date))
                .filter_map(|(date, close)| Some((*date, close?)))
                .collect();
            series.push(Some(closes));
        }

        price_table(symbols, series)
    }

    fn load_fundamentals(
        &self,
        symbols: &[Symbol],
        fields: &[FundamentalField],
    ) -> Result<DataFrame> {
        let table = Watchlist::new(read_csv(&self.dir.join(FUNDAMENTALS_FILE))?)?;

        let mut columns = Vec::with_capacity(fields.len());
        for field in fields {
            if table.has_column(field.as_str()) {
                columns.push(table.optional_values(field.as_str())?);
            } else {
                warn!(field = field.as_str(), "fundamentals file lacks field, left null");
                columns.push(vec![None; table.len()]);
            }
        }

        let index: HashMap<Symbol, usize> = table
            .symbols()?
            .into_iter()
            .enumerate()
            .map(|(row, symbol)| (normalize_symbol(&symbol), row))
            .collect();

        let rows: Vec<Vec<Option<f64>>> = symbols
            .iter()
            .map(|symbol| match index.get(symbol) {
                Some(&row) => columns.iter().map(|column| column[row]).collect(),
                None => {
                    warn!(%symbol, "no fundamentals row, left null");
                    vec![None; fields.len()]
                }
            })
            .collect();

        fundamentals_frame(symbols, fields, &rows)
    }
}

impl MarketDataProvider for CsvMarketData {
    async fn closing_prices(
        &self,
        symbols: &[Symbol],
        start: Date,
        end: Date,
    ) -> Result<PriceTable> {
        self.load_prices(symbols, start, end)
    }

    async fn fundamentals(
        &self,
        symbols: &[Symbol],
        fields: &[FundamentalField],
    ) -> Result<DataFrame> {
        self.load_fundamentals(symbols, fields)
    }
}
