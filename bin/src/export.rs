//! CSV export and console summaries.

use anyhow::{Context, Result};
use malaga::Watchlist;
use polars::prelude::{CsvWriter, DataFrame, SerWriter};
use std::fs::File;
use std::path::Path;
use tracing::info;

/// Writes `frame` to `path` with a header row.
pub(crate) fn write_csv(frame: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(frame)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), rows = frame.height(), "wrote CSV");
    Ok(())
}

/// Prints the first `limit` rows of `columns` as an aligned table.
///
/// Columns missing from the watchlist are skipped.
pub(crate) fn print_table(watchlist: &Watchlist, columns: &[&str], limit: usize) -> Result<()> {
    let symbols = watchlist.symbols()?;
    let mut numeric = Vec::with_capacity(columns.len());
    for &column in columns {
        if let Ok(values) = watchlist.optional_values(column) {
            numeric.push((column, values));
        }
    }

    print!("  {:<8}", "Symbol");
    for (name, _) in &numeric {
        print!(" {:>22}", truncate(name, 22));
    }
    println!();
    println!("  {}", "-".repeat(8 + 23 * numeric.len()));

    for (row, symbol) in symbols.iter().enumerate().take(limit) {
        print!("  {symbol:<8}");
        for (_, values) in &numeric {
            match values[row] {
                Some(value) => print!(" {:>22}", format_value(value)),
                None => print!(" {:>22}", "-"),
            }
        }
        println!();
    }
    if symbols.len() > limit {
        println!("  ... {} more", symbols.len() - limit);
    }
    println!();
    Ok(())
}

fn truncate(name: &str, width: usize) -> &str {
    name.char_indices()
        .nth(width)
        .map_or(name, |(index, _)| &name[..index])
}

fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else if value.abs() >= 1e6 {
        format!("{value:.3e}")
    } else {
        format!("{value:.4}")
    }
}
