//! Robust value (RV) signal.
//!
//! The value screen ranks constituents on five valuation multiples:
//! - Price to earnings (trailing twelve months)
//! - Price to book
//! - Price to sales
//! - Enterprise value to EBITDA
//! - Enterprise value to gross profit
//!
//! Lower multiples are cheaper, so the composite RV score is sorted ascending
//! downstream.

mod ratios;

pub use ratios::{
    EV_TO_EBITDA, EV_TO_GROSS_PROFIT, derive_enterprise_ratios, ratio_column, safe_ratio,
};

use crate::percentile::PercentileScorer;
use malaga_traits::{FundamentalField, Result, Watchlist};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Name of the composite value column.
pub const RV_SCORE: &str = "RV Score";

/// A valuation multiple scored by the value signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueRatio {
    /// Price to earnings.
    PriceToEarnings,
    /// Price to book.
    PriceToBook,
    /// Price to sales.
    PriceToSales,
    /// Enterprise value to EBITDA.
    EvToEbitda,
    /// Enterprise value to gross profit.
    EvToGrossProfit,
}

impl ValueRatio {
    /// Every ratio, in output column order.
    pub const ALL: [Self; 5] = [
        Self::PriceToEarnings,
        Self::PriceToBook,
        Self::PriceToSales,
        Self::EvToEbitda,
        Self::EvToGrossProfit,
    ];

    /// Column holding the raw multiple.
    pub const fn column(&self) -> &'static str {
        match self {
            Self::PriceToEarnings => FundamentalField::TrailingPe.as_str(),
            Self::PriceToBook => FundamentalField::PriceToBook.as_str(),
            Self::PriceToSales => FundamentalField::PriceToSales.as_str(),
            Self::EvToEbitda => EV_TO_EBITDA,
            Self::EvToGrossProfit => EV_TO_GROSS_PROFIT,
        }
    }

    /// Column holding the multiple's percentile.
    pub const fn percentile_column(&self) -> &'static str {
        match self {
            Self::PriceToEarnings => "PE Percentile",
            Self::PriceToBook => "PB Percentile",
            Self::PriceToSales => "PS Percentile",
            Self::EvToEbitda => "EV/EBITDA Percentile",
            Self::EvToGrossProfit => "EV/Gross Profit Percentile",
        }
    }
}

/// Configuration for the value signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueConfig {
    /// Multiples to score (default: all five)
    pub ratios: Vec<ValueRatio>,

    /// Drop symbols missing any scored multiple before ranking (default: true)
    pub drop_incomplete: bool,

    /// Name of the composite column (default: "RV Score")
    pub score_column: String,
}

impl Default for ValueConfig {
    fn default() -> Self {
        Self {
            ratios: ValueRatio::ALL.to_vec(),
            drop_incomplete: true,
            score_column: RV_SCORE.to_string(),
        }
    }
}

impl ValueConfig {
    /// Raw multiple columns, in `ratios` order.
    pub fn ratio_columns(&self) -> Vec<&'static str> {
        self.ratios.iter().map(ValueRatio::column).collect()
    }

    /// Percentile columns, in `ratios` order.
    pub fn percentile_columns(&self) -> Vec<&'static str> {
        self.ratios.iter().map(ValueRatio::percentile_column).collect()
    }
}

/// Robust value signal.
///
/// # Example
///
/// ```ignore
/// use malaga_signals::value::ValueSignal;
///
/// let signal = ValueSignal::default();
/// let fields = ValueSignal::required_fields();
/// let fundamentals = provider.fundamentals(&symbols, &fields).await?;
/// let scored = signal.score(&Watchlist::new(fundamentals)?, &scorer)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ValueSignal {
    config: ValueConfig,
}

impl ValueSignal {
    /// Create a new value signal with the given configuration.
    #[must_use]
    pub const fn new(config: ValueConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &ValueConfig {
        &self.config
    }

    /// Fundamental fields a provider must supply.
    pub fn required_fields() -> Vec<FundamentalField> {
        vec![
            FundamentalField::TrailingPe,
            FundamentalField::PriceToBook,
            FundamentalField::PriceToSales,
            FundamentalField::EnterpriseValue,
            FundamentalField::Ebitda,
            FundamentalField::GrossProfit,
        ]
    }

    /// Raw fundamentals plus derived enterprise-value multiples, optionally
    /// restricted to complete rows.
    pub fn metrics(&self, fundamentals: &Watchlist) -> Result<Watchlist> {
        let derived = derive_enterprise_ratios(fundamentals)?;
        if !self.config.drop_incomplete {
            return Ok(derived);
        }

        let columns = self
            .config
            .ratio_columns()
            .into_iter()
            .map(|name| derived.values(name))
            .collect::<Result<Vec<_>>>()?;
        let complete: Vec<usize> = (0..derived.len())
            .filter(|&row| columns.iter().all(|column| !column[row].is_nan()))
            .collect();

        let dropped = derived.len() - complete.len();
        if dropped > 0 {
            warn!(dropped, kept = complete.len(), "dropping symbols with incomplete fundamentals");
        }
        derived.take_rows(&complete)
    }

    /// Metrics plus one percentile column per configured multiple.
    pub fn score(&self, fundamentals: &Watchlist, scorer: &PercentileScorer) -> Result<Watchlist> {
        let metrics = self.metrics(fundamentals)?;
        info!(symbols = metrics.len(), "scoring valuation multiples");
        scorer.score(
            &metrics,
            self.config.ratio_columns().as_slice(),
            self.config.percentile_columns().as_slice(),
        )
    }
}
