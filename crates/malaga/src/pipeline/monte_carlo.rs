//! Monte Carlo portfolio simulation from recent price history.

use super::{price_window, select_symbols};
use malaga_portfolio::{MonteCarloConfig, MonteCarloSimulator, ReturnStatistics, SimulationResult};
use malaga_traits::{Date, MarketDataProvider, PriceTable, Result};
use tracing::info;

/// Fitted statistics and simulated paths.
#[derive(Debug, Clone)]
pub struct MonteCarloRun {
    /// Mean and covariance of the fitted daily returns.
    pub statistics: ReturnStatistics,
    /// Simulated portfolio values.
    pub result: SimulationResult,
}

/// Prices over the lookback window → daily return statistics → simulated
/// portfolio paths.
#[derive(Debug, Clone, Default)]
pub struct MonteCarloPipeline {
    simulator: MonteCarloSimulator,
}

impl MonteCarloPipeline {
    /// Pipeline running `config`.
    #[must_use]
    pub const fn new(config: MonteCarloConfig) -> Self {
        Self {
            simulator: MonteCarloSimulator::new(config),
        }
    }

    /// The simulation configuration.
    pub const fn config(&self) -> &MonteCarloConfig {
        self.simulator.config()
    }

    /// Fetches `lookback_days` of prices ending at `as_of` and simulates.
    ///
    /// # Errors
    ///
    /// Fails on any provider or simulation failure.
    pub async fn run<M: MarketDataProvider>(&self, market: &M, as_of: Date) -> Result<MonteCarloRun> {
        let config = self.config();
        let (start, end) = price_window(as_of, config.lookback_days)?;
        info!(symbols = ?config.symbols, %start, %end, "fetching simulation history");

        let prices = market.closing_prices(&config.symbols, start, end).await?;
        self.simulate(&prices)
    }

    /// Fits return statistics for the configured symbols and simulates.
    ///
    /// # Errors
    ///
    /// - `DataUnavailable` if a symbol has no price column or fewer than two
    ///   complete return rows exist
    /// - `InvalidData` if the covariance is not positive-definite
    pub fn simulate(&self, prices: &PriceTable) -> Result<MonteCarloRun> {
        let prices = select_symbols(prices, &self.config().symbols)?;
        let statistics = ReturnStatistics::from_prices(&prices)?;
        let result = self.simulator.simulate(&statistics)?;
        Ok(MonteCarloRun { statistics, result })
    }
}
