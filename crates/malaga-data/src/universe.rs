//! S&P 500 constituents scraped from Wikipedia.

use crate::error::UniverseError;
use malaga_traits::{SYMBOL_COLUMN, Universe, UniverseProvider, normalize_symbol};
use polars::prelude::{Column, DataFrame};
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, info};

/// Wikipedia page listing the S&P 500 constituents.
pub const SP500_URL: &str = "https://en.wikipedia.org/wiki/List_of_S%26P_500_companies";

const USER_AGENT: &str = concat!("malaga/", env!("CARGO_PKG_VERSION"));

/// One row of the constituents table.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Constituent {
    symbol: String,
    security: String,
    sector: String,
    sub_industry: String,
}

/// Universe provider for the current S&P 500 list.
#[derive(Debug, Clone)]
pub struct WikipediaSp500 {
    client: Client,
    url: String,
}

impl WikipediaSp500 {
    /// Provider reading the public Wikipedia page.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self, UniverseError> {
        Self::with_url(SP500_URL)
    }

    /// Provider reading the constituents table from another page.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_url(url: impl Into<String>) -> Result<Self, UniverseError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// The page this provider reads.
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn fetch_page(&self) -> Result<String, UniverseError> {
        debug!(url = %self.url, "fetching constituents page");
        let response = self.client.get(&self.url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

/// Parses the `#constituents` table of an S&P 500 list page.
///
/// Symbols are normalised to the dash share-class convention and the result
/// is sorted by symbol.
///
/// # Errors
///
/// - [`UniverseError::TableNotFound`] when the page has no such table
/// - [`UniverseError::Empty`] when the table has no data rows
pub fn parse_constituents(html: &str) -> Result<Universe, UniverseError> {
    let document = Html::parse_document(html);
    let selector = |css: &str| {
        Selector::parse(css).map_err(|e| UniverseError::TableNotFound(format!("{css}: {e}")))
    };
    let table_selector = selector("table#constituents")?;
    let row_selector = selector("tr")?;
    let cell_selector = selector("td")?;

    let table = document
        .select(&table_selector)
        .next()
        .ok_or_else(|| UniverseError::TableNotFound("table#constituents".to_string()))?;

    let mut constituents: Vec<Constituent> = table
        .select(&row_selector)
        .filter_map(|row| {
            let cells: Vec<String> = row
                .select(&cell_selector)
                .map(|cell| cell.text().collect::<String>().trim().to_string())
                .collect();
            // Header rows hold `th` cells only.
            if cells.len() < 4 || cells[0].is_empty() {
                return None;
            }
            Some(Constituent {
                symbol: normalize_symbol(&cells[0]),
                security: cells[1].clone(),
                sector: cells[2].clone(),
                sub_industry: cells[3].clone(),
            })
        })
        .collect();

    if constituents.is_empty() {
        return Err(UniverseError::Empty);
    }
    constituents.sort_by(|a, b| a.symbol.cmp(&b.symbol));
    constituents.dedup_by(|a, b| a.symbol == b.symbol);

    constituents_frame(&constituents)
        .and_then(|frame| Universe::new(frame).map_err(|e| UniverseError::Table(e.to_string())))
}

fn constituents_frame(constituents: &[Constituent]) -> Result<DataFrame, UniverseError> {
    let symbols: Vec<&str> = constituents.iter().map(|c| c.symbol.as_str()).collect();
    let securities: Vec<&str> = constituents.iter().map(|c| c.security.as_str()).collect();
    let sectors: Vec<&str> = constituents.iter().map(|c| c.sector.as_str()).collect();
    let sub_industries: Vec<&str> = constituents.iter().map(|c| c.sub_industry.as_str()).collect();

    DataFrame::new(vec![
        Column::new(SYMBOL_COLUMN.into(), symbols),
        Column::new("security".into(), securities),
        Column::new("sector".into(), sectors),
        Column::new("sub_industry".into(), sub_industries),
    ])
    .map_err(|e| UniverseError::Table(e.to_string()))
}

impl UniverseProvider for WikipediaSp500 {
    async fn constituents(&self) -> malaga_traits::Result<Universe> {
        let html = self.fetch_page().await?;
        let universe = parse_constituents(&html)?;
        info!(constituents = universe.len(), "loaded S&P 500 universe");
        Ok(universe)
    }
}
