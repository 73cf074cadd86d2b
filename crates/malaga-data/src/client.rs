//! FMP API client implementation.

use crate::{
    error::FmpError,
    frame::{PriceSeries, fundamentals_frame, price_table},
    types::{FinancialRatios, FundamentalSnapshot, HistoricalPrice, IncomeStatement, KeyMetrics, Period, Quote},
};
use malaga_traits::{
    Date, FundamentalField, MalagaError, MarketDataProvider, PriceTable, Symbol,
};
use polars::prelude::DataFrame;
use reqwest::Client;
use std::collections::BTreeMap;
use std::env;
use tracing::{debug, info, warn};

/// Result type for FMP requests.
pub type FmpResult<T> = std::result::Result<T, FmpError>;

/// Base URL for the FMP stable API.
const FMP_BASE_URL: &str = "https://financialmodelingprep.com/stable";

/// Financial Modeling Prep API client.
#[derive(Debug, Clone)]
pub struct FmpClient {
    client: Client,
    api_key: String,
}

impl FmpClient {
    /// Create a new FMP client with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
        }
    }

    /// Create a new FMP client from the `FMP_API_KEY` environment variable.
    ///
    /// This will also load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment variable is not set.
    pub fn from_env() -> FmpResult<Self> {
        // Try to load .env file (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_key = env::var("FMP_API_KEY").map_err(|_| FmpError::MissingApiKey)?;

        Ok(Self::new(api_key))
    }

    /// Build a URL with the API key.
    fn url(&self, endpoint: &str) -> String {
        if endpoint.contains('?') {
            format!("{FMP_BASE_URL}/{endpoint}&apikey={}", self.api_key)
        } else {
            format!("{FMP_BASE_URL}/{endpoint}?apikey={}", self.api_key)
        }
    }

    /// Make a GET request and parse the JSON response.
    async fn get<T: serde::de::DeserializeOwned>(&self, endpoint: &str) -> FmpResult<T> {
        let url = self.url(endpoint);
        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(FmpError::RateLimitExceeded);
        }

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(FmpError::Api(format!("HTTP {status}: {text}")));
        }

        let text = response.text().await?;

        // Check for error responses
        if text.contains("\"Error Message\"") || text.contains("\"error\"") {
            return Err(FmpError::Api(text));
        }

        Ok(serde_json::from_str(&text)?)
    }

    /// Get income statements for a symbol, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn income_statement(
        &self,
        symbol: &str,
        period: Period,
        limit: Option<u32>,
    ) -> FmpResult<Vec<IncomeStatement>> {
        let limit_param = limit.map(|l| format!("&limit={l}")).unwrap_or_default();
        let endpoint = format!(
            "income-statement?symbol={}&period={}{}",
            symbol.to_uppercase(),
            period.as_str(),
            limit_param
        );
        self.get(&endpoint).await
    }

    /// Get key metrics for a symbol, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn key_metrics(
        &self,
        symbol: &str,
        period: Period,
        limit: Option<u32>,
    ) -> FmpResult<Vec<KeyMetrics>> {
        let limit_param = limit.map(|l| format!("&limit={l}")).unwrap_or_default();
        let endpoint = format!(
            "key-metrics?symbol={}&period={}{}",
            symbol.to_uppercase(),
            period.as_str(),
            limit_param
        );
        self.get(&endpoint).await
    }

    /// Get valuation ratios for a symbol, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn ratios(
        &self,
        symbol: &str,
        period: Period,
        limit: Option<u32>,
    ) -> FmpResult<Vec<FinancialRatios>> {
        let limit_param = limit.map(|l| format!("&limit={l}")).unwrap_or_default();
        let endpoint = format!(
            "ratios?symbol={}&period={}{}",
            symbol.to_uppercase(),
            period.as_str(),
            limit_param
        );
        self.get(&endpoint).await
    }

    /// Get real-time quote for a symbol.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn quote(&self, symbol: &str) -> FmpResult<Quote> {
        let endpoint = format!("quote?symbol={}", symbol.to_uppercase());
        let quotes: Vec<Quote> = self.get(&endpoint).await?;
        quotes
            .into_iter()
            .next()
            .ok_or_else(|| FmpError::SymbolNotFound(symbol.to_string()))
    }

    /// Get historical end-of-day prices for a symbol between two dates.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn historical_prices(
        &self,
        symbol: &str,
        from: Date,
        to: Date,
    ) -> FmpResult<Vec<HistoricalPrice>> {
        let endpoint = format!(
            "historical-price-eod/full?symbol={}&from={}&to={}",
            symbol.to_uppercase(),
            from.format("%Y-%m-%d"),
            to.format("%Y-%m-%d"),
        );
        // The stable API returns a flat array, not a wrapped response
        self.get(&endpoint).await
    }

    /// Closing prices of one symbol keyed by date.
    ///
    /// # Errors
    ///
    /// Returns [`FmpError::NoData`] if the range holds no usable close.
    pub async fn closes(&self, symbol: &str, from: Date, to: Date) -> FmpResult<BTreeMap<Date, f64>> {
        let closes: BTreeMap<Date, f64> = self
            .historical_prices(symbol, from, to)
            .await?
            .into_iter()
            .filter_map(|bar| Some((bar.parsed_date()?, bar.close?)))
            .collect();
        if closes.is_empty() {
            return Err(FmpError::NoData(symbol.to_string()));
        }
        Ok(closes)
    }

    /// Latest quote, key metrics, ratios and income statement for a symbol.
    ///
    /// The four endpoints are requested concurrently; an endpoint that fails
    /// leaves its part of the snapshot empty.
    ///
    /// # Errors
    ///
    /// Returns [`FmpError::NoData`] if every endpoint failed.
    pub async fn snapshot(&self, symbol: &str) -> FmpResult<FundamentalSnapshot> {
        let (quote, metrics, ratios, income) = tokio::join!(
            self.quote(symbol),
            self.key_metrics(symbol, Period::Annual, Some(1)),
            self.ratios(symbol, Period::Annual, Some(1)),
            self.income_statement(symbol, Period::Annual, Some(1)),
        );

        let snapshot = FundamentalSnapshot {
            quote: quote.ok(),
            key_metrics: metrics.ok().and_then(|m| m.into_iter().next()),
            ratios: ratios.ok().and_then(|r| r.into_iter().next()),
            income: income.ok().and_then(|i| i.into_iter().next()),
        };
        if snapshot.is_empty() {
            return Err(FmpError::NoData(symbol.to_string()));
        }
        Ok(snapshot)
    }
}

impl MarketDataProvider for FmpClient {
    async fn closing_prices(
        &self,
        symbols: &[Symbol],
        start: Date,
        end: Date,
    ) -> malaga_traits::Result<PriceTable> {
        info!(symbols = symbols.len(), %start, %end, "fetching closing prices");

        let mut series: Vec<PriceSeries> = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            match self.closes(symbol, start, end).await {
                Ok(closes) => {
                    debug!(%symbol, rows = closes.len(), "fetched prices");
                    series.push(Some(closes));
                }
                Err(FmpError::RateLimitExceeded) => {
                    return Err(FmpError::RateLimitExceeded.into());
                }
                Err(e) => {
                    let error = MalagaError::PerSymbolFetch {
                        symbol: symbol.clone(),
                        reason: e.to_string(),
                    };
                    warn!(%error, "price history unavailable, column left null");
                    series.push(None);
                }
            }
        }

        price_table(symbols, series)
    }

    async fn fundamentals(
        &self,
        symbols: &[Symbol],
        fields: &[FundamentalField],
    ) -> malaga_traits::Result<DataFrame> {
        info!(symbols = symbols.len(), fields = fields.len(), "fetching fundamentals");

        let mut rows = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            let snapshot = match self.snapshot(symbol).await {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    let error = MalagaError::PerSymbolFetch {
                        symbol: symbol.clone(),
                        reason: e.to_string(),
                    };
                    warn!(%error, "fundamentals unavailable, row left null");
                    FundamentalSnapshot::default()
                }
            };
            rows.push(fields.iter().map(|field| snapshot.field(*field)).collect());
        }

        fundamentals_frame(symbols, fields, &rows)
    }
}
