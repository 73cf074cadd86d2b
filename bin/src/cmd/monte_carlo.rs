//! Monte Carlo simulation command.

use super::{CommonArgs, banner, section};
use crate::config::StrategyConfig;
use crate::{data, export};
use anyhow::{Context, Result};
use malaga::pipeline::MonteCarloPipeline;
use malaga::portfolio::MonteCarloConfig;
use malaga::signals::StrategyKind;
use malaga::signals::registry::strategy_info;
use malaga::traits::normalize_symbol;

/// Command-line overrides of `[monte_carlo]`.
#[derive(Debug, Clone, Default)]
pub(crate) struct SimulationArgs {
    pub(crate) symbols: Vec<String>,
    pub(crate) simulations: Option<usize>,
    pub(crate) horizon: Option<usize>,
    pub(crate) seed: Option<u64>,
}

impl SimulationArgs {
    fn apply(&self, base: &MonteCarloConfig, common: &CommonArgs) -> MonteCarloConfig {
        let mut config = base.clone();
        if !self.symbols.is_empty() {
            config.symbols = self.symbols.iter().map(|s| normalize_symbol(s)).collect();
            if config
                .weights
                .as_ref()
                .is_some_and(|w| w.len() != config.symbols.len())
            {
                config.weights = None;
            }
        }
        if let Some(simulations) = self.simulations {
            config.simulations = simulations;
        }
        if let Some(horizon) = self.horizon {
            config.horizon_days = horizon;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(notional) = common.notional {
            config.initial_value = notional;
        }
        config
    }
}

/// Fits the lookback history and writes every simulated path.
pub(crate) async fn run(
    config: &StrategyConfig,
    sim: &SimulationArgs,
    args: &CommonArgs,
) -> Result<()> {
    let info = strategy_info(StrategyKind::MonteCarlo)
        .context("Monte Carlo simulation is not registered")?;
    let as_of = args.as_of()?;
    let settings = sim.apply(&config.monte_carlo, args);

    banner("Monte Carlo Simulation");
    println!("As of:       {as_of}");
    println!("Symbols:     {}", settings.symbols.join(", "));
    println!("Lookback:    {} days", settings.lookback_days);
    println!(
        "Paths:       {} x {} days",
        settings.simulations, settings.horizon_days
    );
    println!("Start value: ${:.2}\n", settings.initial_value);

    let dir = config.data_dir(args);
    let market = data::market(dir.as_deref())?;
    let run = MonteCarloPipeline::new(settings).run(&market, as_of).await?;

    section("Fitted Daily Returns");
    println!("  Observations: {}", run.statistics.observations);
    println!("  {:<8} {:>12} {:>12} {:>10}", "Symbol", "Mean", "Volatility", "Weight");
    println!("  {}", "-".repeat(45));
    for (i, symbol) in run.statistics.symbols.iter().enumerate() {
        println!(
            "  {:<8} {:>12.6} {:>12.6} {:>10.4}",
            symbol,
            run.statistics.mean[i],
            run.statistics.covariance[[i, i]].sqrt(),
            run.result.weights[i]
        );
    }
    println!();

    section("Terminal Value");
    let summary = run.result.summary;
    println!("  Mean:   ${:.2}", summary.mean);
    println!("  P5:     ${:.2}", summary.p5);
    println!("  Median: ${:.2}", summary.p50);
    println!("  P95:    ${:.2}\n", summary.p95);

    let output = args.output_or(info.default_output);
    let mut frame = run.result.to_frame()?;
    export::write_csv(&mut frame, &output)?;
    println!("Saved {} paths to {}", frame.width() - 1, output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Write;
    use std::fs;

    fn prices_csv() -> String {
        let mut csv = String::from("date,AAA,BBB\n");
        for day in 1..=28 {
            let aaa = 100.0 + (day % 3) as f64;
            let bbb = 50.0 + 2.0 * (day % 5) as f64;
            writeln!(csv, "2024-02-{day:02},{aaa:.1},{bbb:.1}").unwrap();
        }
        csv
    }

    #[test]
    fn test_overrides() {
        let base = MonteCarloConfig {
            weights: Some(vec![1.0, 1.0, 1.0]),
            ..MonteCarloConfig::default()
        };
        let sim = SimulationArgs {
            symbols: vec!["brk.b".to_string(), "AAPL".to_string()],
            seed: Some(7),
            ..SimulationArgs::default()
        };
        let common = CommonArgs {
            notional: Some(500.0),
            ..CommonArgs::default()
        };

        let config = sim.apply(&base, &common);
        assert_eq!(config.symbols, vec!["brk-b", "AAPL"]);
        assert!(config.weights.is_none());
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.initial_value, 500.0);
        assert_eq!(config.simulations, 400);
    }

    #[tokio::test]
    async fn test_simulation_from_csv_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("prices.csv"), prices_csv()).unwrap();

        let output = dir.path().join("paths.csv");
        let sim = SimulationArgs {
            symbols: vec!["AAA".to_string(), "BBB".to_string()],
            simulations: Some(5),
            horizon: Some(10),
            seed: Some(42),
        };
        let args = CommonArgs {
            output: Some(output.clone()),
            data_dir: Some(dir.path().to_path_buf()),
            end: Some("2024-03-01".to_string()),
            ..CommonArgs::default()
        };
        run(&StrategyConfig::default(), &sim, &args).await.unwrap();

        let written = fs::read_to_string(&output).unwrap();
        let rows: Vec<&str> = written.lines().collect();
        assert_eq!(rows[0], "day,sim_0,sim_1,sim_2,sim_3,sim_4");
        assert_eq!(rows.len(), 11);
        assert!(rows[10].starts_with("10,"));
    }
}
