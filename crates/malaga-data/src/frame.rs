//! Assembly of provider responses into malaga tables.

use malaga_traits::{
    Date, FundamentalField, MalagaError, PriceTable, Result, SYMBOL_COLUMN, Symbol,
};
use polars::prelude::{Column, DataFrame};
use std::collections::{BTreeMap, BTreeSet};

/// Closing prices of one symbol keyed by date; `None` when the fetch failed.
pub(crate) type PriceSeries = Option<BTreeMap<Date, f64>>;

/// Aligns per-symbol price series on the union of their dates.
///
/// Every requested symbol gets a column; symbols without a series are all
/// null.
///
/// # Errors
///
/// Returns [`MalagaError::DataUnavailable`] when no symbol has a single price.
pub(crate) fn price_table(symbols: &[Symbol], series: Vec<PriceSeries>) -> Result<PriceTable> {
    let dates: BTreeSet<Date> = series
        .iter()
        .flatten()
        .flat_map(|prices| prices.keys().copied())
        .collect();
    if dates.is_empty() {
        return Err(MalagaError::DataUnavailable(format!(
            "no prices returned for {} symbols",
            symbols.len()
        )));
    }

    let columns = symbols
        .iter()
        .zip(series)
        .map(|(symbol, prices)| {
            let values = dates
                .iter()
                .map(|date| prices.as_ref().and_then(|p| p.get(date).copied()))
                .collect();
            (symbol.clone(), values)
        })
        .collect();

    PriceTable::from_columns(dates.into_iter().collect(), columns)
}

/// Builds a fundamentals table: `symbol` plus one `Float64` column per field.
///
/// `rows` is aligned with `symbols`; each row is aligned with `fields`.
pub(crate) fn fundamentals_frame(
    symbols: &[Symbol],
    fields: &[FundamentalField],
    rows: &[Vec<Option<f64>>],
) -> Result<DataFrame> {
    let mut columns = Vec::with_capacity(fields.len() + 1);
    columns.push(Column::new(SYMBOL_COLUMN.into(), symbols.to_vec()));
    for (i, field) in fields.iter().enumerate() {
        let values: Vec<Option<f64>> = rows.iter().map(|row| row.get(i).copied().flatten()).collect();
        columns.push(Column::new(field.as_str().into(), values));
    }
    Ok(DataFrame::new(columns)?)
}
