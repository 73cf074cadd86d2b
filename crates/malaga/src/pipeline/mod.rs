//! End-to-end screens.
//!
//! Each pipeline pulls its inputs from a [`UniverseProvider`] and a
//! [`MarketDataProvider`], runs the pure scoring stages and returns a new
//! table. The async `run` methods only fetch; the synchronous `screen`
//! methods hold the logic and can be driven from in-memory tables.
//!
//! [`UniverseProvider`]: malaga_traits::UniverseProvider
//! [`MarketDataProvider`]: malaga_traits::MarketDataProvider

mod equal_weight;
mod momentum;
mod monte_carlo;
mod value;

pub use equal_weight::{EqualWeightPipeline, SHARES_COLUMN};
pub use momentum::{CLOSE_PRICE, MomentumPipeline, MomentumRun};
pub use monte_carlo::{MonteCarloPipeline, MonteCarloRun};
pub use value::ValuePipeline;

use chrono::Days;
use malaga_traits::{Date, MalagaError, PriceTable, Result, Symbol};

/// Column holding the latest close in the value and equal-weight screens.
pub const PRICE_COLUMN: &str = "Price";

/// Calendar days of history fetched to find a latest close.
pub const DEFAULT_PRICE_WINDOW_DAYS: u32 = 14;

/// `[as_of - days, as_of]`.
pub(crate) fn price_window(as_of: Date, days: u32) -> Result<(Date, Date)> {
    let start = as_of
        .checked_sub_days(Days::new(u64::from(days)))
        .ok_or_else(|| MalagaError::InvalidDate(format!("{days} days before {as_of}")))?;
    Ok((start, as_of))
}

/// Restricts `prices` to `symbols`, in that order.
///
/// A provider must return a column for every requested symbol, so a missing
/// one means the batch is unusable.
pub(crate) fn select_symbols(prices: &PriceTable, symbols: &[Symbol]) -> Result<PriceTable> {
    let missing: Vec<&str> = symbols
        .iter()
        .filter(|symbol| !prices.has_symbol(symbol))
        .map(String::as_str)
        .collect();
    if !missing.is_empty() {
        return Err(MalagaError::DataUnavailable(format!(
            "no price column for {} symbols: {}",
            missing.len(),
            missing.join(", ")
        )));
    }

    let columns = symbols
        .iter()
        .map(|symbol| Ok((symbol.clone(), prices.column_values(symbol)?)))
        .collect::<Result<Vec<_>>>()?;
    PriceTable::from_columns(prices.dates().to_vec(), columns)
}

/// Latest finite close of each symbol, `None` when it has none or no column.
pub(crate) fn latest_closes(prices: &PriceTable, symbols: &[Symbol]) -> Result<Vec<Option<f64>>> {
    symbols
        .iter()
        .map(|symbol| {
            if !prices.has_symbol(symbol) {
                return Ok(None);
            }
            Ok(prices
                .column_values(symbol)?
                .into_iter()
                .rev()
                .flatten()
                .find(|close| close.is_finite()))
        })
        .collect()
}


#[cfg(test)]
mod tests {
    use super::fixtures::date;
    use super::*;

    fn prices() -> PriceTable {
        PriceTable::from_columns(
            vec![date(2024, 1, 2), date(2024, 1, 3), date(2024, 1, 4)],
            vec![
                ("AAA".to_string(), vec![Some(10.0), Some(11.0), None]),
                ("BBB".to_string(), vec![None, None, None]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_price_window() {
        let (start, end) = price_window(date(2024, 3, 15), 14).unwrap();
        assert_eq!(start, date(2024, 3, 1));
        assert_eq!(end, date(2024, 3, 15));
    }

    #[test]
    fn test_latest_closes_skip_trailing_nulls() {
        let symbols = vec!["AAA".to_string(), "BBB".to_string(), "CCC".to_string()];
        let closes = latest_closes(&prices(), &symbols).unwrap();
        assert_eq!(closes, vec![Some(11.0), None, None]);
    }

    #[test]
    fn test_select_symbols() {
        let selected = select_symbols(&prices(), &["BBB".to_string()]).unwrap();
        assert_eq!(selected.symbols(), vec!["BBB".to_string()]);
        assert_eq!(selected.len(), 3);

        let missing = select_symbols(&prices(), &["AAA".to_string(), "ZZZ".to_string()]);
        assert!(matches!(missing, Err(MalagaError::DataUnavailable(_))));
    }
}
