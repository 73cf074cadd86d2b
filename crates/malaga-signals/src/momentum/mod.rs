//! High-quality momentum (HQM) signal.
//!
//! The momentum screen ranks each constituent on its cumulative return over
//! several horizons measured forward from a fixed start date:
//! - Monthly variant: 1, 3, 6 and 12 calendar months
//! - Weekly variant: 1, 2, 4 and 12 weeks expressed in days
//!
//! Every horizon is scored as a cross-sectional percentile and the composite
//! of those percentiles is the HQM score.

use crate::percentile::{PercentileScorer, percentile_column};
use crate::period::{OffsetUnit, PeriodResolution, PeriodReturnExtractor, offset_date};
use chrono::NaiveDate;
use malaga_traits::{Date, MalagaError, PriceTable, Result, Watchlist};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Name of the composite momentum column.
pub const HQM_SCORE: &str = "HQM Score";

/// Configuration for the momentum signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MomentumConfig {
    /// Human-readable period names, one output column each.
    pub period_labels: Vec<String>,

    /// Unit of `period_offsets` (default: months)
    pub offset_unit: OffsetUnit,

    /// Forward offsets from `start_date`, aligned with `period_labels`.
    pub period_offsets: Vec<u32>,

    /// First day of the price history and origin of every offset.
    pub start_date: Date,

    /// Last day of the price history.
    pub end_date: Date,

    /// Value substituted for missing period returns before scoring
    /// (default: 0.0). `None` keeps them as `NaN`.
    pub fill_missing_returns: Option<f64>,

    /// Name of the composite column (default: "HQM Score")
    pub score_column: String,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self::monthly()
    }
}

/// Preset dates are checked at compile time.
const fn ymd(year: i32, month: u32, day: u32) -> Date {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date,
        None => panic!("invalid preset date"),
    }
}

const MONTHLY_START: Date = ymd(2023, 1, 30);
const MONTHLY_END: Date = ymd(2024, 2, 1);
const WEEKLY_START: Date = ymd(2023, 11, 18);
const WEEKLY_END: Date = ymd(2024, 11, 18);

impl MomentumConfig {
    /// Monthly horizons: 1M, 3M, 6M and 1Y from 2023-01-30.
    #[must_use]
    pub fn monthly() -> Self {
        Self {
            period_labels: ["1M return", "3M return", "6M return", "1Y return"]
                .map(String::from)
                .to_vec(),
            offset_unit: OffsetUnit::Months,
            period_offsets: vec![1, 3, 6, 12],
            start_date: MONTHLY_START,
            end_date: MONTHLY_END,
            fill_missing_returns: Some(0.0),
            score_column: HQM_SCORE.to_string(),
        }
    }

    /// Weekly horizons: 1W, 2W, 4W and 12W from 2023-11-18.
    #[must_use]
    pub fn weekly() -> Self {
        Self {
            period_labels: ["1W return", "2W return", "4W return", "12W return"]
                .map(String::from)
                .to_vec(),
            offset_unit: OffsetUnit::Days,
            period_offsets: vec![7, 14, 28, 84],
            start_date: WEEKLY_START,
            end_date: WEEKLY_END,
            fill_missing_returns: Some(0.0),
            score_column: HQM_SCORE.to_string(),
        }
    }

    /// Percentile column names, aligned with `period_labels`.
    pub fn percentile_columns(&self) -> Vec<String> {
        self.period_labels
            .iter()
            .map(|label| percentile_column(label))
            .collect()
    }

    /// Checks the configuration before any data is requested.
    ///
    /// # Errors
    ///
    /// - [`MalagaError::ConfigurationMismatch`] if labels and offsets differ
    ///   in length, or no period is configured
    /// - [`MalagaError::InvalidDate`] if `start_date` is after `end_date`, or
    ///   a horizon ends after `end_date`
    pub fn validate(&self) -> Result<()> {
        if self.period_labels.len() != self.period_offsets.len() {
            return Err(MalagaError::mismatch(
                "period_labels",
                self.period_labels.len(),
                "period_offsets",
                self.period_offsets.len(),
            ));
        }
        if self.period_labels.is_empty() {
            return Err(MalagaError::ConfigurationMismatch(
                "no momentum periods configured".to_string(),
            ));
        }
        if self.start_date > self.end_date {
            return Err(MalagaError::InvalidDate(format!(
                "start date {} is after end date {}",
                self.start_date, self.end_date
            )));
        }
        for (label, &offset) in self.period_labels.iter().zip(&self.period_offsets) {
            let target = offset_date(self.start_date, self.offset_unit, offset)?;
            if target > self.end_date {
                return Err(MalagaError::InvalidDate(format!(
                    "{label} ends on {target}, after end date {}",
                    self.end_date
                )));
            }
        }
        Ok(())
    }
}

/// Per-symbol period returns produced by [`MomentumSignal::period_returns`].
#[derive(Debug, Clone)]
pub struct PeriodReturns {
    /// `symbol` plus one return column per period label.
    pub watchlist: Watchlist,
    /// How each period's date was resolved.
    pub resolutions: Vec<PeriodResolution>,
}

/// Momentum signal over configurable horizons.
///
/// # Example
///
/// ```ignore
/// use malaga_signals::momentum::{MomentumConfig, MomentumSignal};
///
/// let signal = MomentumSignal::new(MomentumConfig::weekly());
/// let scored = signal.score(&prices, &PercentileScorer::default())?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct MomentumSignal {
    config: MomentumConfig,
}

impl MomentumSignal {
    /// Create a new momentum signal with the given configuration.
    #[must_use]
    pub const fn new(config: MomentumConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &MomentumConfig {
        &self.config
    }

    /// Cumulative returns of `prices` resolved at every configured horizon.
    ///
    /// # Errors
    ///
    /// Propagates configuration and date resolution failures from
    /// [`PeriodReturnExtractor::extract`].
    pub fn period_returns(&self, prices: &PriceTable) -> Result<PeriodReturns> {
        self.config.validate()?;

        let returns = prices.cumulative_returns()?;
        let extractor = PeriodReturnExtractor::new(self.config.offset_unit);
        let extraction = extractor.extract(
            &returns,
            self.config.start_date,
            self.config.period_labels.as_slice(),
            self.config.period_offsets.as_slice(),
        )?;

        let fallbacks = extraction.fallbacks().count();
        info!(
            periods = extraction.resolutions.len(),
            fallbacks,
            symbols = extraction.table.height(),
            "extracted period returns"
        );

        let mut watchlist = Watchlist::new(extraction.table.clone())?;
        if let Some(fill) = self.config.fill_missing_returns {
            for label in &self.config.period_labels {
                let filled = extraction
                    .values(label)?
                    .into_iter()
                    .map(|v| if v.is_nan() { fill } else { v })
                    .collect();
                watchlist = watchlist.with_values(label, filled)?;
            }
            debug!(fill, "filled missing period returns");
        }

        Ok(PeriodReturns {
            watchlist,
            resolutions: extraction.resolutions,
        })
    }

    /// Period returns plus one percentile column per period.
    ///
    /// The composite score is left to the combiner.
    pub fn score(&self, prices: &PriceTable, scorer: &PercentileScorer) -> Result<PeriodReturns> {
        let PeriodReturns {
            watchlist,
            resolutions,
        } = self.period_returns(prices)?;
        let outputs = self.config.percentile_columns();
        let scored = scorer.score(
            &watchlist,
            self.config.period_labels.as_slice(),
            outputs.as_slice(),
        )?;
        Ok(PeriodReturns {
            watchlist: scored,
            resolutions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd_opt(y, m, d).unwrap()
    }

    fn config() -> MomentumConfig {
        MomentumConfig {
            period_labels: vec!["1W return".to_string(), "2W return".to_string()],
            offset_unit: OffsetUnit::Days,
            period_offsets: vec![7, 14],
            start_date: date(2024, 3, 1),
            end_date: date(2024, 3, 15),
            fill_missing_returns: None,
            score_column: HQM_SCORE.to_string(),
        }
    }

    fn prices() -> PriceTable {
        PriceTable::from_columns(
            vec![date(2024, 3, 1), date(2024, 3, 8), date(2024, 3, 15)],
            vec![
                ("AAA".to_string(), vec![Some(100.0), Some(110.0), Some(120.0)]),
                ("BBB".to_string(), vec![Some(50.0), Some(45.0), Some(60.0)]),
                ("CCC".to_string(), vec![None, None, None]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_presets() {
        let monthly = MomentumConfig::monthly();
        assert_eq!(monthly.period_offsets, vec![1, 3, 6, 12]);
        assert_eq!(monthly.offset_unit, OffsetUnit::Months);
        assert_eq!(monthly.start_date, date(2023, 1, 30));
        assert_eq!(monthly.end_date, date(2024, 2, 1));
        assert!(monthly.validate().is_ok());

        let weekly = MomentumConfig::weekly();
        assert_eq!(weekly.period_offsets, vec![7, 14, 28, 84]);
        assert_eq!(weekly.offset_unit, OffsetUnit::Days);
        assert_eq!(weekly.period_labels[3], "12W return");
        assert_eq!(weekly.start_date, date(2023, 11, 18));
        assert_eq!(weekly.end_date, date(2024, 11, 18));
        assert!(weekly.validate().is_ok());
    }

    /// Weekday closes over the whole configured window.
    fn weekday_prices(config: &MomentumConfig) -> PriceTable {
        let dates: Vec<Date> = config
            .start_date
            .iter_days()
            .take_while(|d| *d <= config.end_date)
            .filter(|d| !crate::period::is_weekend(*d))
            .collect();
        let closes = (0..dates.len()).map(|i| Some(100.0 + i as f64)).collect();
        PriceTable::from_columns(dates, vec![("AAA".to_string(), closes)]).unwrap()
    }

    #[test]
    fn test_presets_resolve_within_their_window() {
        for config in [MomentumConfig::monthly(), MomentumConfig::weekly()] {
            let prices = weekday_prices(&config);
            let returns = MomentumSignal::new(config).period_returns(&prices).unwrap();
            assert_eq!(returns.resolutions.len(), 4);
            for resolution in &returns.resolutions {
                assert!(resolution.resolved <= resolution.target);
            }
        }
    }

    #[test]
    fn test_validate_rejects_horizon_past_end() {
        let mut config = MomentumConfig::monthly();
        config.end_date = date(2024, 1, 1);
        match config.validate() {
            Err(MalagaError::InvalidDate(message)) => assert!(message.contains("1Y return")),
            other => panic!("expected InvalidDate, got {other:?}"),
        }
    }

    #[test]
    fn test_percentile_columns() {
        assert_eq!(
            MomentumConfig::monthly().percentile_columns()[0],
            "1M return percentile"
        );
    }

    #[test]
    fn test_validate_rejects_mismatch() {
        let mut config = config();
        config.period_offsets.push(28);
        assert!(matches!(
            config.validate(),
            Err(MalagaError::ConfigurationMismatch(_))
        ));
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let mut config = config();
        config.end_date = date(2024, 2, 1);
        assert!(matches!(config.validate(), Err(MalagaError::InvalidDate(_))));
    }

    #[test]
    fn test_period_returns() {
        let signal = MomentumSignal::new(config());
        let returns = signal.period_returns(&prices()).unwrap();

        let one_week = returns.watchlist.values("1W return").unwrap();
        assert_relative_eq!(one_week[0], 0.10, epsilon = 1e-12);
        assert_relative_eq!(one_week[1], -0.10, epsilon = 1e-12);
        assert!(one_week[2].is_nan());

        let two_week = returns.watchlist.values("2W return").unwrap();
        assert_relative_eq!(two_week[0], 0.20, epsilon = 1e-12);
        assert_relative_eq!(two_week[1], 0.20, epsilon = 1e-12);
        assert_eq!(returns.resolutions.len(), 2);
    }

    #[test]
    fn test_fill_missing_returns() {
        let mut config = config();
        config.fill_missing_returns = Some(0.0);
        let returns = MomentumSignal::new(config).period_returns(&prices()).unwrap();
        assert_relative_eq!(returns.watchlist.values("1W return").unwrap()[2], 0.0);
    }

    #[test]
    fn test_score_adds_percentiles() {
        let signal = MomentumSignal::new(config());
        let scored = signal.score(&prices(), &PercentileScorer::default()).unwrap();

        let percentiles = scored.watchlist.values("1W return percentile").unwrap();
        assert_relative_eq!(percentiles[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(percentiles[1], 0.5, epsilon = 1e-12);
        assert!(percentiles[2].is_nan());

        // Ties on the 2W horizon share the mean rank.
        let tied = scored.watchlist.values("2W return percentile").unwrap();
        assert_relative_eq!(tied[0], tied[1], epsilon = 1e-12);
    }
}
