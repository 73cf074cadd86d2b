//! Monte Carlo simulation of portfolio value paths.
//!
//! Daily returns are drawn from a multivariate normal fitted to historical
//! returns: `r = mean + L z` with `L` the Cholesky factor of the sample
//! covariance and `z` standard normal. Each path compounds the weighted
//! portfolio return from the initial value.

use malaga_traits::stats::{mean, quantile};
use malaga_traits::{MalagaError, PriceTable, Result, Symbol};
use nalgebra::DMatrix;
use ndarray::{Array1, Array2};
use polars::prelude::{Column, DataFrame};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Configuration for a Monte Carlo run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonteCarloConfig {
    /// Portfolio constituents (default: MSFT, AAPL, GOOG)
    pub symbols: Vec<Symbol>,

    /// Calendar days of price history used for the fit (default: 600)
    pub lookback_days: u32,

    /// Number of simulated paths (default: 400)
    pub simulations: usize,

    /// Trading days per path (default: 100)
    pub horizon_days: usize,

    /// Portfolio value at day zero (default: 10,000)
    pub initial_value: f64,

    /// Portfolio weights aligned with `symbols`; random when absent.
    pub weights: Option<Vec<f64>>,

    /// RNG seed; entropy when absent.
    pub seed: Option<u64>,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            symbols: ["MSFT", "AAPL", "GOOG"].map(String::from).to_vec(),
            lookback_days: 600,
            simulations: 400,
            horizon_days: 100,
            initial_value: 10_000.0,
            weights: None,
            seed: None,
        }
    }
}

/// Mean vector and sample covariance of daily returns.
#[derive(Debug, Clone)]
pub struct ReturnStatistics {
    /// Asset order of `mean` and `covariance`.
    pub symbols: Vec<Symbol>,
    /// Mean daily return per asset.
    pub mean: Array1<f64>,
    /// Sample covariance of daily returns.
    pub covariance: Array2<f64>,
    /// Number of return observations used.
    pub observations: usize,
}

impl ReturnStatistics {
    /// Fits the statistics to the daily returns of `prices`.
    ///
    /// Rows where any asset has no return are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`MalagaError::DataUnavailable`] with fewer than two complete
    /// return rows.
    pub fn from_prices(prices: &PriceTable) -> Result<Self> {
        let returns = prices.daily_returns()?;
        let symbols = returns.symbols();

        let mut rows = Vec::new();
        for row in 0..returns.len() {
            let values = returns.row_values(row)?;
            if values.iter().all(|v| v.is_finite()) {
                rows.push(values);
            }
        }

        let observations = rows.len();
        if observations < 2 {
            return Err(MalagaError::DataUnavailable(format!(
                "need at least 2 complete daily returns, found {observations}"
            )));
        }

        let n_assets = symbols.len();
        let data = Array2::from_shape_vec((observations, n_assets), rows.concat())
            .map_err(|e| MalagaError::InvalidData(e.to_string()))?;

        let mean = data.sum_axis(ndarray::Axis(0)) / observations as f64;
        let centered = &data - &mean;
        let covariance = centered.t().dot(&centered) / (observations - 1) as f64;

        debug!(assets = n_assets, observations, "fitted return statistics");
        Ok(Self {
            symbols,
            mean,
            covariance,
            observations,
        })
    }

    /// Number of assets.
    pub fn n_assets(&self) -> usize {
        self.mean.len()
    }
}

/// Lower-triangular Cholesky factor `L` with `L Lᵀ = matrix`.
///
/// Only the lower triangle of `matrix` is read.
///
/// # Errors
///
/// Returns [`MalagaError::InvalidData`] if the matrix is not square or not
/// positive-definite.
pub fn cholesky(matrix: &Array2<f64>) -> Result<Array2<f64>> {
    let (n, m) = matrix.dim();
    if n != m {
        return Err(MalagaError::InvalidData(format!(
            "covariance must be square, got {n}x{m}"
        )));
    }
    if matrix.iter().any(|v| !v.is_finite()) {
        return Err(MalagaError::InvalidData(
            "covariance matrix has non-finite entries".to_string(),
        ));
    }

    let dense = DMatrix::from_fn(n, n, |i, j| matrix[[i, j]]);
    let lower = dense
        .cholesky()
        .map(|factor| factor.l())
        .filter(|l| l.diagonal().iter().all(|d| *d > 0.0 && d.is_finite()))
        .ok_or_else(|| {
            MalagaError::InvalidData("covariance matrix is not positive-definite".to_string())
        })?;
    Ok(Array2::from_shape_fn((n, n), |(i, j)| lower[(i, j)]))
}

/// Terminal value distribution of a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimulationSummary {
    /// Mean terminal value.
    pub mean: f64,
    /// 5th percentile of terminal values.
    pub p5: f64,
    /// Median terminal value.
    pub p50: f64,
    /// 95th percentile of terminal values.
    pub p95: f64,
}

/// Simulated paths plus the weights used.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    /// Portfolio value per day (rows) and simulation (columns).
    pub paths: Array2<f64>,
    /// Normalized portfolio weights, aligned with the fitted symbols.
    pub weights: Vec<f64>,
    /// Terminal value summary.
    pub summary: SimulationSummary,
}

impl SimulationResult {
    /// Values on the last simulated day, one per simulation.
    pub fn terminal_values(&self) -> Vec<f64> {
        let last = self.paths.nrows().saturating_sub(1);
        self.paths.row(last).to_vec()
    }

    /// Paths as a table with a `day` column and one `sim_<k>` column per
    /// simulation.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let days: Vec<u32> = (1..=self.paths.nrows() as u32).collect();
        let mut columns = Vec::with_capacity(self.paths.ncols() + 1);
        columns.push(Column::new("day".into(), days));
        for (k, path) in self.paths.columns().into_iter().enumerate() {
            columns.push(Column::new(format!("sim_{k}").into(), path.to_vec()));
        }
        Ok(DataFrame::new(columns)?)
    }
}

/// Normalizes weights to sum to one.
///
/// # Errors
///
/// Returns [`MalagaError::InvalidData`] for negative, non-finite or all-zero
/// weights.
pub fn normalize_weights(weights: &[f64]) -> Result<Vec<f64>> {
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(MalagaError::InvalidData(
            "weights must be finite and non-negative".to_string(),
        ));
    }
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return Err(MalagaError::InvalidData("weights sum to zero".to_string()));
    }
    Ok(weights.iter().map(|w| w / total).collect())
}

/// Correlated-return Monte Carlo simulator.
///
/// # Example
///
/// ```ignore
/// use malaga_portfolio::{MonteCarloConfig, MonteCarloSimulator, ReturnStatistics};
///
/// let stats = ReturnStatistics::from_prices(&prices)?;
/// let simulator = MonteCarloSimulator::new(MonteCarloConfig { seed: Some(7), ..Default::default() });
/// let result = simulator.simulate(&stats)?;
/// println!("median terminal value: {:.2}", result.summary.p50);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MonteCarloSimulator {
    config: MonteCarloConfig,
}

impl MonteCarloSimulator {
    /// Create a new simulator with the given configuration.
    #[must_use]
    pub const fn new(config: MonteCarloConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &MonteCarloConfig {
        &self.config
    }

    fn rng(&self) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    fn weights(&self, n_assets: usize, rng: &mut StdRng) -> Result<Vec<f64>> {
        match &self.config.weights {
            Some(weights) if weights.len() != n_assets => Err(MalagaError::mismatch(
                "weights",
                weights.len(),
                "symbols",
                n_assets,
            )),
            Some(weights) => normalize_weights(weights),
            None => {
                let raw: Vec<f64> = (0..n_assets).map(|_| rng.r#gen::<f64>()).collect();
                normalize_weights(&raw)
            }
        }
    }

    /// Simulates `simulations` paths of `horizon_days` each.
    ///
    /// # Errors
    ///
    /// - [`MalagaError::InvalidData`] for a zero horizon or simulation count,
    ///   or a covariance that is not positive-definite
    /// - [`MalagaError::ConfigurationMismatch`] if explicit weights do not
    ///   match the asset count
    pub fn simulate(&self, stats: &ReturnStatistics) -> Result<SimulationResult> {
        let MonteCarloConfig {
            simulations,
            horizon_days,
            initial_value,
            ..
        } = self.config;
        if simulations == 0 || horizon_days == 0 {
            return Err(MalagaError::InvalidData(
                "simulations and horizon_days must be positive".to_string(),
            ));
        }

        let lower = cholesky(&stats.covariance)?;
        let mut rng = self.rng();
        let weights = self.weights(stats.n_assets(), &mut rng)?;
        let weight_vector = Array1::from_vec(weights.clone());

        let mut paths = Array2::<f64>::zeros((horizon_days, simulations));
        for sim in 0..simulations {
            let mut value = initial_value;
            for day in 0..horizon_days {
                let z: Array1<f64> = (0..stats.n_assets())
                    .map(|_| rng.sample::<f64, _>(StandardNormal))
                    .collect();
                let returns = &stats.mean + &lower.dot(&z);
                value *= 1.0 + returns.dot(&weight_vector);
                paths[[day, sim]] = value;
            }
        }

        let terminal = paths.row(horizon_days - 1).to_vec();
        let summary = SimulationSummary {
            mean: mean(&terminal),
            p5: quantile(&terminal, 0.05),
            p50: quantile(&terminal, 0.50),
            p95: quantile(&terminal, 0.95),
        };
        info!(
            simulations,
            horizon_days,
            mean = summary.mean,
            p5 = summary.p5,
            p50 = summary.p50,
            p95 = summary.p95,
            "monte carlo simulation complete"
        );

        Ok(SimulationResult {
            paths,
            weights,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use malaga_traits::Date;
    use ndarray::array;

    fn statistics() -> ReturnStatistics {
        ReturnStatistics {
            symbols: vec!["AAA".to_string(), "BBB".to_string()],
            mean: array![0.001, 0.0005],
            covariance: array![[0.0004, 0.0001], [0.0001, 0.0009]],
            observations: 250,
        }
    }

    fn config(seed: u64) -> MonteCarloConfig {
        MonteCarloConfig {
            symbols: vec!["AAA".to_string(), "BBB".to_string()],
            simulations: 50,
            horizon_days: 20,
            seed: Some(seed),
            ..MonteCarloConfig::default()
        }
    }

    #[test]
    fn test_cholesky_known_factor() {
        let lower = cholesky(&array![[4.0, 2.0], [2.0, 3.0]]).unwrap();
        assert_relative_eq!(lower[[0, 0]], 2.0);
        assert_relative_eq!(lower[[0, 1]], 0.0);
        assert_relative_eq!(lower[[1, 0]], 1.0);
        assert_relative_eq!(lower[[1, 1]], 2.0_f64.sqrt());
    }

    #[test]
    fn test_cholesky_rejects_singular_matrix() {
        let result = cholesky(&array![[1.0, 1.0], [1.0, 1.0]]);
        assert!(matches!(result, Err(MalagaError::InvalidData(_))));

        let result = cholesky(&array![[1.0, 2.0], [2.0, 1.0]]);
        assert!(matches!(result, Err(MalagaError::InvalidData(_))));
    }

    #[test]
    fn test_cholesky_reconstructs_covariance() {
        let covariance = statistics().covariance;
        let lower = cholesky(&covariance).unwrap();
        assert_relative_eq!(lower[[0, 1]], 0.0);
        let rebuilt = lower.dot(&lower.t());
        for (a, b) in rebuilt.iter().zip(covariance.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_cholesky_rejects_bad_input() {
        assert!(cholesky(&Array2::zeros((2, 3))).is_err());
        assert!(cholesky(&array![[f64::NAN]]).is_err());
    }

    #[test]
    fn test_return_statistics() {
        let dates: Vec<Date> = (2..=4)
            .map(|d| Date::from_ymd_opt(2024, 1, d).unwrap())
            .collect();
        let prices = PriceTable::from_columns(
            dates,
            vec![
                ("AAA".to_string(), vec![Some(100.0), Some(110.0), Some(99.0)]),
                ("BBB".to_string(), vec![Some(100.0), Some(90.0), Some(99.0)]),
            ],
        )
        .unwrap();

        let stats = ReturnStatistics::from_prices(&prices).unwrap();
        assert_eq!(stats.observations, 2);
        assert_relative_eq!(stats.mean[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(stats.covariance[[0, 0]], 0.02, epsilon = 1e-12);
        assert_relative_eq!(stats.covariance[[0, 1]], -0.02, epsilon = 1e-12);
        assert_eq!(stats.n_assets(), 2);
    }

    #[test]
    fn test_return_statistics_needs_history() {
        let prices = PriceTable::from_columns(
            vec![Date::from_ymd_opt(2024, 1, 2).unwrap()],
            vec![("AAA".to_string(), vec![Some(100.0)])],
        )
        .unwrap();
        assert!(matches!(
            ReturnStatistics::from_prices(&prices),
            Err(MalagaError::DataUnavailable(_))
        ));
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let a = MonteCarloSimulator::new(config(42)).simulate(&statistics()).unwrap();
        let b = MonteCarloSimulator::new(config(42)).simulate(&statistics()).unwrap();
        assert_eq!(a.paths, b.paths);
        assert_eq!(a.weights, b.weights);

        let c = MonteCarloSimulator::new(config(43)).simulate(&statistics()).unwrap();
        assert_ne!(a.paths, c.paths);
    }

    #[test]
    fn test_simulation_shape_and_summary() {
        let result = MonteCarloSimulator::new(config(7)).simulate(&statistics()).unwrap();
        assert_eq!(result.paths.dim(), (20, 50));
        assert_relative_eq!(result.weights.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        assert!(result.summary.p5 <= result.summary.p50);
        assert!(result.summary.p50 <= result.summary.p95);
        assert_eq!(result.terminal_values().len(), 50);

        let frame = result.to_frame().unwrap();
        assert_eq!(frame.shape(), (20, 51));
        assert_eq!(frame.get_column_names()[0].as_str(), "day");
    }

    #[test]
    fn test_explicit_weights() {
        let mut config = config(3);
        config.weights = Some(vec![3.0, 1.0]);
        let result = MonteCarloSimulator::new(config.clone())
            .simulate(&statistics())
            .unwrap();
        assert_relative_eq!(result.weights[0], 0.75);

        config.weights = Some(vec![1.0]);
        assert!(matches!(
            MonteCarloSimulator::new(config).simulate(&statistics()),
            Err(MalagaError::ConfigurationMismatch(_))
        ));
    }

    #[test]
    fn test_zero_variance_path_is_deterministic() {
        let stats = ReturnStatistics {
            symbols: vec!["AAA".to_string()],
            mean: array![0.01],
            covariance: array![[1e-18]],
            observations: 10,
        };
        let mut config = config(5);
        config.horizon_days = 2;
        config.simulations = 3;
        config.initial_value = 100.0;
        let result = MonteCarloSimulator::new(config).simulate(&stats).unwrap();
        for value in result.terminal_values() {
            assert_relative_eq!(value, 102.01, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_normalize_weights() {
        assert_eq!(normalize_weights(&[1.0, 1.0]).unwrap(), vec![0.5, 0.5]);
        assert!(normalize_weights(&[0.0, 0.0]).is_err());
        assert!(normalize_weights(&[-1.0, 2.0]).is_err());
    }
}
