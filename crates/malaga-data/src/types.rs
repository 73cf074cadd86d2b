//! Data types for FMP API responses.
//!
//! FMP omits or nulls fields it has no value for, so every numeric field is
//! optional.

use chrono::NaiveDate;
use malaga_traits::FundamentalField;
use serde::{Deserialize, Serialize};

/// Reporting period for financial statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    /// Annual reports (10-K filings).
    #[default]
    Annual,
    /// Quarterly reports (10-Q filings).
    Quarter,
}

impl Period {
    /// Get the API parameter value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Annual => "annual",
            Self::Quarter => "quarter",
        }
    }
}

/// Income statement data from FMP.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeStatement {
    /// Filing date.
    pub date: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Total revenue.
    #[serde(default)]
    pub revenue: Option<f64>,
    /// Gross profit.
    #[serde(default)]
    pub gross_profit: Option<f64>,
    /// EBITDA.
    #[serde(default)]
    pub ebitda: Option<f64>,
    /// Net income.
    #[serde(default)]
    pub net_income: Option<f64>,
}

/// Key metrics data from FMP.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyMetrics {
    /// Report date.
    pub date: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Market capitalization.
    #[serde(default)]
    pub market_cap: Option<f64>,
    /// Enterprise value.
    #[serde(default)]
    pub enterprise_value: Option<f64>,
}

/// Valuation ratios from FMP.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialRatios {
    /// Report date.
    pub date: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Price to earnings.
    #[serde(default)]
    pub price_to_earnings_ratio: Option<f64>,
    /// Price to book.
    #[serde(default)]
    pub price_to_book_ratio: Option<f64>,
    /// Price to sales.
    #[serde(default)]
    pub price_to_sales_ratio: Option<f64>,
}

/// Real-time quote data from FMP.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Ticker symbol.
    pub symbol: String,
    /// Company name.
    #[serde(default)]
    pub name: Option<String>,
    /// Current price.
    #[serde(default)]
    pub price: Option<f64>,
    /// Market cap.
    #[serde(default)]
    pub market_cap: Option<f64>,
    /// Trailing P/E ratio.
    #[serde(default)]
    pub pe: Option<f64>,
}

/// End-of-day price from FMP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalPrice {
    /// Date.
    pub date: String,
    /// Close price.
    #[serde(default)]
    pub close: Option<f64>,
}

impl HistoricalPrice {
    /// Parse the date string into a NaiveDate.
    #[must_use]
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }
}

/// Latest point-in-time data for one symbol.
#[derive(Debug, Clone, Default)]
pub struct FundamentalSnapshot {
    /// Current quote.
    pub quote: Option<Quote>,
    /// Most recent key metrics.
    pub key_metrics: Option<KeyMetrics>,
    /// Most recent ratios.
    pub ratios: Option<FinancialRatios>,
    /// Most recent income statement.
    pub income: Option<IncomeStatement>,
}

impl FundamentalSnapshot {
    /// Whether no endpoint returned anything.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.quote.is_none()
            && self.key_metrics.is_none()
            && self.ratios.is_none()
            && self.income.is_none()
    }

    /// Value of `field`, preferring the live quote over reported figures.
    #[must_use]
    pub fn field(&self, field: FundamentalField) -> Option<f64> {
        let quote = self.quote.as_ref();
        let metrics = self.key_metrics.as_ref();
        let ratios = self.ratios.as_ref();
        let income = self.income.as_ref();

        match field {
            FundamentalField::MarketCap => quote
                .and_then(|q| q.market_cap)
                .or_else(|| metrics.and_then(|m| m.market_cap)),
            FundamentalField::TrailingPe => quote
                .and_then(|q| q.pe)
                .or_else(|| ratios.and_then(|r| r.price_to_earnings_ratio)),
            FundamentalField::PriceToBook => ratios.and_then(|r| r.price_to_book_ratio),
            FundamentalField::PriceToSales => ratios.and_then(|r| r.price_to_sales_ratio),
            FundamentalField::EnterpriseValue => metrics.and_then(|m| m.enterprise_value),
            FundamentalField::Ebitda => income.and_then(|i| i.ebitda),
            FundamentalField::GrossProfit => income.and_then(|i| i.gross_profit),
        }
    }
}
