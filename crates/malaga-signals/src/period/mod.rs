//! Period return extraction.
//!
//! Given a cumulative-return series and a start date, the extractor resolves
//! the value of every symbol at a list of forward offsets (months for the
//! monthly momentum screen, days for the weekly one). When the exact target
//! date is missing from the series it falls back one business day and logs a
//! warning; when that day is missing too the extraction fails.

mod calendar;

pub use calendar::{OffsetUnit, is_weekend, offset_date, previous_business_day};

use malaga_traits::{Date, MalagaError, PriceTable, Result, SYMBOL_COLUMN};
use polars::prelude::*;
use tracing::{debug, warn};

/// How one period label was resolved against the series index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodResolution {
    /// Period label, e.g. `"3M return"`.
    pub label: String,
    /// Start date plus the period offset.
    pub target: Date,
    /// Row date whose values were used.
    pub resolved: Date,
    /// Whether the previous business day was used instead of the target.
    pub fell_back: bool,
}

/// Output of [`PeriodReturnExtractor::extract`].
#[derive(Debug, Clone)]
pub struct PeriodExtraction {
    /// `symbol` column followed by one `Float64` column per period label.
    pub table: DataFrame,
    /// Resolution details, in label order.
    pub resolutions: Vec<PeriodResolution>,
}

impl PeriodExtraction {
    /// Per-symbol values for `label`, aligned with the `symbol` column.
    ///
    /// # Errors
    ///
    /// Returns [`MalagaError::MissingColumn`] for an unknown label.
    pub fn values(&self, label: &str) -> Result<Vec<f64>> {
        let column = self
            .table
            .column(label)
            .map_err(|_| MalagaError::MissingColumn(label.to_string()))?;
        Ok(column
            .as_materialized_series()
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect())
    }

    /// Resolutions that needed the business-day fallback.
    pub fn fallbacks(&self) -> impl Iterator<Item = &PeriodResolution> {
        self.resolutions.iter().filter(|r| r.fell_back)
    }
}

/// Resolves per-symbol values at forward offsets from a start date.
///
/// # Example
///
/// ```ignore
/// use malaga_signals::period::{OffsetUnit, PeriodReturnExtractor};
///
/// let extractor = PeriodReturnExtractor::new(OffsetUnit::Months);
/// let labels = vec!["1M return".to_string(), "3M return".to_string()];
/// let extraction = extractor.extract(&returns, start, &labels, &[1, 3])?;
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PeriodReturnExtractor {
    unit: OffsetUnit,
}

impl PeriodReturnExtractor {
    /// Create an extractor whose offsets are expressed in `unit`.
    #[must_use]
    pub const fn new(unit: OffsetUnit) -> Self {
        Self { unit }
    }

    /// Offset unit of this extractor.
    #[must_use]
    pub const fn unit(&self) -> OffsetUnit {
        self.unit
    }

    /// Resolves which row of `series` serves the period ending at
    /// `start + offset`.
    ///
    /// # Errors
    ///
    /// Returns [`MalagaError::DateNotFound`] when neither the target nor its
    /// previous business day is in the index.
    pub fn resolve(
        &self,
        series: &PriceTable,
        start: Date,
        label: &str,
        offset: u32,
    ) -> Result<(usize, PeriodResolution)> {
        let target = offset_date(start, self.unit, offset)?;

        if let Some(row) = series.row_index(target) {
            debug!(label, %target, "period resolved on exact date");
            return Ok((
                row,
                PeriodResolution {
                    label: label.to_string(),
                    target,
                    resolved: target,
                    fell_back: false,
                },
            ));
        }

        warn!(label, %target, "date not in series, falling back to previous business day");
        let fallback = previous_business_day(target)?;
        let row = series
            .row_index(fallback)
            .ok_or(MalagaError::DateNotFound { target, fallback })?;

        Ok((
            row,
            PeriodResolution {
                label: label.to_string(),
                target,
                resolved: fallback,
                fell_back: true,
            },
        ))
    }

    /// Extracts one value per symbol for every `(label, offset)` pair.
    ///
    /// Periods are resolved independently of each other; values are copied
    /// verbatim from the resolved row with nulls mapped to `NaN`.
    ///
    /// # Errors
    ///
    /// - [`MalagaError::ConfigurationMismatch`] if `labels` and `offsets`
    ///   differ in length, before any lookup
    /// - [`MalagaError::DateNotFound`] if a period cannot be resolved
    pub fn extract<S: AsRef<str>>(
        &self,
        series: &PriceTable,
        start: Date,
        labels: &[S],
        offsets: &[u32],
    ) -> Result<PeriodExtraction> {
        if labels.len() != offsets.len() {
            return Err(MalagaError::mismatch(
                "period_labels",
                labels.len(),
                "period_offsets",
                offsets.len(),
            ));
        }

        let symbols = series.symbols();
        let mut columns = Vec::with_capacity(labels.len() + 1);
        columns.push(Column::new(SYMBOL_COLUMN.into(), symbols));

        let mut resolutions = Vec::with_capacity(labels.len());
        for (label, &offset) in labels.iter().zip(offsets) {
            let label = label.as_ref();
            let (row, resolution) = self.resolve(series, start, label, offset)?;
            let values = series.row_values(row)?;
            columns.push(Column::new(label.into(), values));
            resolutions.push(resolution);
        }

        Ok(PeriodExtraction {
            table: DataFrame::new(columns)?,
            resolutions,
        })
    }
}
