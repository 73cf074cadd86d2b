//! Common types used throughout the malaga toolkit.
//!
//! The three tables a screen works with are thin wrappers around Polars
//! DataFrames:
//!
//! - [`PriceTable`]: time-indexed, one column per symbol (prices or returns)
//! - [`Universe`]: index constituents keyed by symbol
//! - [`Watchlist`]: per-symbol factor values, percentiles and scores
//!
//! The wrappers check their invariants on construction and every
//! transforming method returns a new value instead of mutating in place.

use crate::{MalagaError, Result};
use chrono::Datelike;
use polars::prelude::*;
use std::collections::HashSet;

// Re-export date type from chrono
pub use chrono::NaiveDate as Date;

/// A market symbol identifier, e.g. `"AAPL"` or `"BRK-B"`.
pub type Symbol = String;

/// Name of the date index column of a [`PriceTable`].
pub const DATE_COLUMN: &str = "date";

/// Name of the key column of a [`Universe`] and a [`Watchlist`].
pub const SYMBOL_COLUMN: &str = "symbol";

/// Days between 0001-01-01 (chrono's CE day 1) and the Unix epoch.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Converts a Polars physical date (days since the Unix epoch) into a [`Date`].
pub fn date_from_days(days: i32) -> Result<Date> {
    Date::from_num_days_from_ce_opt(days + UNIX_EPOCH_DAYS_FROM_CE)
        .ok_or_else(|| MalagaError::InvalidDate(format!("day offset {days} out of range")))
}

/// Converts a [`Date`] into a Polars physical date (days since the Unix epoch).
pub fn days_from_date(date: Date) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

/// Parse a date string in YYYY-MM-DD format.
pub fn parse_date(value: &str) -> Result<Date> {
    Date::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| MalagaError::InvalidDate(format!("'{value}': {e}")))
}

/// Reads a column as `f64`, mapping nulls to `NaN`.
fn column_as_f64(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    Ok(column_as_optional_f64(df, name)?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect())
}

/// Reads a column as `Option<f64>`, casting numeric types to `Float64`.
fn column_as_optional_f64(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df
        .column(name)
        .map_err(|_| MalagaError::MissingColumn(name.to_string()))?;
    let series = column.as_materialized_series().cast(&DataType::Float64)?;
    Ok(series.f64()?.into_iter().collect())
}

/// Reads a string column into owned values; nulls become empty strings.
fn column_as_strings(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    let column = df
        .column(name)
        .map_err(|_| MalagaError::MissingColumn(name.to_string()))?;
    let series = column.as_materialized_series().cast(&DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|s: Option<&str>| s.unwrap_or_default().to_string())
        .collect())
}

/// Reads the `date` column of a frame, accepting `Date`, `Datetime` and
/// `YYYY-MM-DD` string columns.
fn read_dates(df: &DataFrame) -> Result<Vec<Date>> {
    let column = df
        .column(DATE_COLUMN)
        .map_err(|_| MalagaError::MissingColumn(DATE_COLUMN.to_string()))?;
    let series = column.as_materialized_series();

    if matches!(series.dtype(), DataType::String) {
        return series
            .str()?
            .into_iter()
            .enumerate()
            .map(|(row, value): (usize, Option<&str>)| {
                value
                    .ok_or_else(|| MalagaError::InvalidDate(format!("null date at row {row}")))
                    .and_then(parse_date)
            })
            .collect();
    }

    let series = series.cast(&DataType::Date)?;
    series
        .date()?
        .into_iter()
        .enumerate()
        .map(|(row, value): (usize, Option<i32>)| {
            value
                .ok_or_else(|| MalagaError::InvalidDate(format!("null date at row {row}")))
                .and_then(date_from_days)
        })
        .collect()
}

/// Builds a Polars `Date` column from chrono dates.
fn date_column(dates: &[Date]) -> Result<Column> {
    let days: Vec<i32> = dates.iter().map(|d| days_from_date(*d)).collect();
    let series = Series::new(DATE_COLUMN.into(), days).cast(&DataType::Date)?;
    Ok(Column::from(series))
}

/// A time-indexed table with one `Float64` column per symbol.
///
/// Values are closing prices or cumulative returns since the start of the
/// series. The `date` index is strictly increasing and may skip non-trading
/// days.
///
/// # Example
///
/// ```no_run
/// use malaga_traits::{Date, PriceTable};
///
/// let dates = vec![
///     Date::from_ymd_opt(2024, 1, 2).unwrap(),
///     Date::from_ymd_opt(2024, 1, 3).unwrap(),
/// ];
/// let table = PriceTable::from_columns(
///     dates,
///     vec![("AAPL".to_string(), vec![Some(185.6), Some(184.3)])],
/// )
/// .unwrap();
/// assert_eq!(table.symbols(), vec!["AAPL".to_string()]);
/// ```
#[derive(Debug, Clone)]
pub struct PriceTable {
    data: DataFrame,
    dates: Vec<Date>,
}

impl PriceTable {
    /// Wraps a DataFrame with a `date` column and one numeric column per symbol.
    ///
    /// # Errors
    ///
    /// Returns [`MalagaError::MissingColumn`] without a `date` column and
    /// [`MalagaError::InvalidData`] if dates are not strictly increasing.
    pub fn new(data: DataFrame) -> Result<Self> {
        let dates = read_dates(&data)?;
        if let Some(pair) = dates.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(MalagaError::InvalidData(format!(
                "dates must be strictly increasing, found {} before {}",
                pair[0], pair[1]
            )));
        }

        // Normalise the index to a Date column and every symbol to Float64.
        let mut columns = Vec::with_capacity(data.width());
        columns.push(date_column(&dates)?);
        for name in data.get_column_names() {
            if name.as_str() == DATE_COLUMN {
                continue;
            }
            let values = column_as_optional_f64(&data, name.as_str())?;
            columns.push(Column::new(name.clone(), values));
        }

        Ok(Self {
            data: DataFrame::new(columns)?,
            dates,
        })
    }

    /// Builds a table from a date index and per-symbol value columns.
    ///
    /// # Errors
    ///
    /// Returns [`MalagaError::InvalidData`] if a column's length differs from
    /// the index or the dates are not strictly increasing.
    pub fn from_columns(dates: Vec<Date>, columns: Vec<(Symbol, Vec<Option<f64>>)>) -> Result<Self> {
        let mut frame_columns = Vec::with_capacity(columns.len() + 1);
        frame_columns.push(date_column(&dates)?);
        for (symbol, values) in columns {
            if values.len() != dates.len() {
                return Err(MalagaError::InvalidData(format!(
                    "column {symbol} has {} values for {} dates",
                    values.len(),
                    dates.len()
                )));
            }
            frame_columns.push(Column::new(symbol.as_str().into(), values));
        }
        Self::new(DataFrame::new(frame_columns)?)
    }

    /// Returns a reference to the underlying DataFrame.
    pub const fn data(&self) -> &DataFrame {
        &self.data
    }

    /// Consumes self and returns the underlying DataFrame.
    pub fn into_inner(self) -> DataFrame {
        self.data
    }

    /// The date index, strictly increasing.
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Number of rows (dates).
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Symbol columns, in table order.
    pub fn symbols(&self) -> Vec<Symbol> {
        self.data
            .get_column_names()
            .iter()
            .filter(|name| name.as_str() != DATE_COLUMN)
            .map(|name| name.to_string())
            .collect()
    }

    /// Whether the table has a column for `symbol`.
    pub fn has_symbol(&self, symbol: &str) -> bool {
        symbol != DATE_COLUMN && self.data.column(symbol).is_ok()
    }

    /// Row position of `date`, if it is part of the index.
    pub fn row_index(&self, date: Date) -> Option<usize> {
        self.dates.binary_search(&date).ok()
    }

    /// Values of every symbol at row `row`, nulls mapped to `NaN`.
    ///
    /// # Errors
    ///
    /// Returns [`MalagaError::InvalidData`] if `row` is out of bounds.
    pub fn row_values(&self, row: usize) -> Result<Vec<f64>> {
        if row >= self.len() {
            return Err(MalagaError::InvalidData(format!(
                "row {row} out of bounds for {} rows",
                self.len()
            )));
        }
        self.symbols()
            .iter()
            .map(|symbol| {
                let value = self
                    .data
                    .column(symbol)?
                    .as_materialized_series()
                    .f64()?
                    .get(row);
                Ok(value.unwrap_or(f64::NAN))
            })
            .collect()
    }

    /// All values of one symbol column.
    ///
    /// # Errors
    ///
    /// Returns [`MalagaError::MissingColumn`] if the symbol is not present.
    pub fn column_values(&self, symbol: &str) -> Result<Vec<Option<f64>>> {
        column_as_optional_f64(&self.data, symbol)
    }

    /// Cumulative return since the first valid observation of each symbol.
    ///
    /// Nulls are forward-filled before the ratio is taken, so the result
    /// matches compounding daily percentage changes. Rows before a symbol's
    /// first valid price stay null.
    pub fn cumulative_returns(&self) -> Result<Self> {
        let mut columns = Vec::new();
        for symbol in self.symbols() {
            let prices = self.column_values(&symbol)?;
            let mut base: Option<f64> = None;
            let mut last: Option<f64> = None;
            let returns = prices
                .into_iter()
                .map(|price| {
                    if let Some(p) = price.filter(|p| !p.is_nan()) {
                        last = Some(p);
                        if base.is_none() {
                            base = Some(p);
                        }
                    }
                    match (base, last) {
                        (Some(b), Some(l)) => Some(l / b - 1.0),
                        _ => None,
                    }
                })
                .collect();
            columns.push((symbol, returns));
        }
        Self::from_columns(self.dates.clone(), columns)
    }

    /// Simple daily returns `p_t / p_{t-1} - 1`; the first row and any row
    /// touching a null is null.
    pub fn daily_returns(&self) -> Result<Self> {
        let mut columns = Vec::new();
        for symbol in self.symbols() {
            let prices = self.column_values(&symbol)?;
            let mut returns = Vec::with_capacity(prices.len());
            returns.push(None);
            for pair in prices.windows(2) {
                returns.push(match (pair[0], pair[1]) {
                    (Some(prev), Some(curr)) if prev != 0.0 => Some(curr / prev - 1.0),
                    _ => None,
                });
            }
            returns.truncate(prices.len());
            columns.push((symbol, returns));
        }
        Self::from_columns(self.dates.clone(), columns)
    }
}

impl AsRef<DataFrame> for PriceTable {
    fn as_ref(&self) -> &DataFrame {
        &self.data
    }
}

/// Constituents of a benchmark index, keyed by a unique `symbol` column.
///
/// Additional descriptive columns (`security`, `sector`, `sub_industry`, ...)
/// are carried along untouched.
#[derive(Debug, Clone)]
pub struct Universe {
    data: DataFrame,
    symbols: Vec<Symbol>,
}

impl Universe {
    /// Wraps a constituents DataFrame.
    ///
    /// # Errors
    ///
    /// - [`MalagaError::MissingColumn`] without a `symbol` column
    /// - [`MalagaError::DataUnavailable`] when there are no rows
    /// - [`MalagaError::InvalidData`] on duplicate or empty symbols
    pub fn new(data: DataFrame) -> Result<Self> {
        let symbols = column_as_strings(&data, SYMBOL_COLUMN)?;
        if symbols.is_empty() {
            return Err(MalagaError::DataUnavailable(
                "universe has no constituents".to_string(),
            ));
        }

        let mut seen = HashSet::with_capacity(symbols.len());
        for symbol in &symbols {
            if symbol.is_empty() {
                return Err(MalagaError::InvalidData("empty symbol in universe".to_string()));
            }
            if !seen.insert(symbol.as_str()) {
                return Err(MalagaError::InvalidData(format!(
                    "duplicate symbol in universe: {symbol}"
                )));
            }
        }

        Ok(Self { data, symbols })
    }

    /// Builds a universe holding only a `symbol` column.
    pub fn from_symbols(symbols: Vec<Symbol>) -> Result<Self> {
        let data = DataFrame::new(vec![Column::new(SYMBOL_COLUMN.into(), symbols)])?;
        Self::new(data)
    }

    /// Returns a reference to the underlying DataFrame.
    pub const fn data(&self) -> &DataFrame {
        &self.data
    }

    /// Constituent symbols in table order.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Number of constituents.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether the universe is empty. Always `false` for a constructed value.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Per-symbol screening table.
///
/// Holds a `symbol` key column followed by factor values, percentile columns,
/// composite scores, prices and share counts as the pipeline fills them in.
/// Row order is insertion order until [`Watchlist::take_rows`] applies a sort.
#[derive(Debug, Clone)]
pub struct Watchlist {
    data: DataFrame,
}

impl Watchlist {
    /// Wraps a DataFrame that has a `symbol` column.
    ///
    /// # Errors
    ///
    /// Returns [`MalagaError::MissingColumn`] without a `symbol` column.
    pub fn new(data: DataFrame) -> Result<Self> {
        if data.column(SYMBOL_COLUMN).is_err() {
            return Err(MalagaError::MissingColumn(SYMBOL_COLUMN.to_string()));
        }
        Ok(Self { data })
    }

    /// Returns a reference to the underlying DataFrame.
    pub const fn data(&self) -> &DataFrame {
        &self.data
    }

    /// Consumes self and returns the underlying DataFrame.
    pub fn into_inner(self) -> DataFrame {
        self.data
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.data.height()
    }

    /// Whether the watchlist has no rows.
    pub fn is_empty(&self) -> bool {
        self.data.height() == 0
    }

    /// Column names in table order.
    pub fn columns(&self) -> Vec<String> {
        self.data
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Checks if a column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.data.column(name).is_ok()
    }

    /// Symbols in row order.
    pub fn symbols(&self) -> Result<Vec<Symbol>> {
        column_as_strings(&self.data, SYMBOL_COLUMN)
    }

    /// Reads a numeric column as `f64`, nulls mapped to `NaN`.
    ///
    /// # Errors
    ///
    /// Returns [`MalagaError::MissingColumn`] if the column does not exist.
    pub fn values(&self, column: &str) -> Result<Vec<f64>> {
        column_as_f64(&self.data, column)
    }

    /// Reads a numeric column as `Option<f64>`, keeping nulls.
    pub fn optional_values(&self, column: &str) -> Result<Vec<Option<f64>>> {
        column_as_optional_f64(&self.data, column)
    }

    /// Returns a copy with `column` set to `values`, replacing an existing column.
    ///
    /// # Errors
    ///
    /// Returns [`MalagaError::InvalidData`] if `values` does not have one entry per row.
    pub fn with_values(&self, column: &str, values: Vec<f64>) -> Result<Self> {
        self.with_series(Series::new(column.into(), values))
    }

    /// Returns a copy with an `Int64` column that may contain nulls.
    pub fn with_optional_integers(&self, column: &str, values: Vec<Option<i64>>) -> Result<Self> {
        self.with_series(Series::new(column.into(), values))
    }

    /// Returns a copy with an arbitrary series set as a column.
    pub fn with_series(&self, series: Series) -> Result<Self> {
        if series.len() != self.len() {
            return Err(MalagaError::InvalidData(format!(
                "column {} has {} values for {} rows",
                series.name(),
                series.len(),
                self.len()
            )));
        }
        let mut data = self.data.clone();
        data.with_column(series)?;
        Ok(Self { data })
    }

    /// Returns a copy holding the rows at `order`, in that order.
    pub fn take_rows(&self, order: &[usize]) -> Result<Self> {
        let indices: Vec<IdxSize> = order.iter().map(|&i| i as IdxSize).collect();
        let indices = IdxCa::from_vec("row".into(), indices);
        Ok(Self {
            data: self.data.take(&indices)?,
        })
    }

    /// Returns a copy with the first `n` rows.
    pub fn head(&self, n: usize) -> Self {
        Self {
            data: self.data.head(Some(n)),
        }
    }

    /// Returns a copy restricted to `columns`, in that order.
    pub fn select(&self, columns: &[&str]) -> Result<Self> {
        for name in columns {
            if !self.has_column(name) {
                return Err(MalagaError::MissingColumn((*name).to_string()));
            }
        }
        Ok(Self {
            data: self.data.select(columns.iter().copied())?,
        })
    }
}

impl From<Watchlist> for DataFrame {
    fn from(watchlist: Watchlist) -> Self {
        watchlist.data
    }
}

impl AsRef<DataFrame> for Watchlist {
    fn as_ref(&self) -> &DataFrame {
        &self.data
    }
}
