//! Momentum screen command.

use super::{CommonArgs, banner, section};
use crate::config::StrategyConfig;
use crate::{data, export};
use anyhow::{Context, Result};
use malaga::pipeline::{CLOSE_PRICE, MomentumPipeline};
use malaga::signals::StrategyKind;
use malaga::signals::registry::strategy_info;

/// Rows shown on the console.
const PREVIEW_ROWS: usize = 20;

/// Runs the monthly or weekly momentum screen and writes the watchlist.
pub(crate) async fn run(config: &StrategyConfig, weekly: bool, args: &CommonArgs) -> Result<()> {
    let kind = if weekly {
        StrategyKind::WeeklyMomentum
    } else {
        StrategyKind::Momentum
    };
    let info = strategy_info(kind).context("momentum screen is not registered")?;
    let momentum = config.momentum(weekly, args)?;
    let allocation = config.allocation(args);
    let shares_column = allocation.output_column.clone();

    banner(if weekly {
        "Weekly High-Quality Momentum"
    } else {
        "High-Quality Momentum"
    });
    println!("Window:    {} to {}", momentum.start_date, momentum.end_date);
    println!("Periods:   {}", momentum.period_labels.join(", "));
    println!("Notional:  ${:.2}\n", allocation.portfolio_notional);

    let dir = config.data_dir(args);
    let universe = data::constituents(config, dir.as_deref())?;
    let market = data::market(dir.as_deref())?;

    let pipeline = MomentumPipeline::new(momentum)
        .with_scorer(config.scorer())
        .with_combiner(config.combiner())
        .with_selection(config.selection(args))
        .with_allocation(allocation);
    let score_column = pipeline.config().score_column.clone();
    let run = pipeline.run(&universe, &market).await?;

    section("Period Resolution");
    for resolution in &run.resolutions {
        let note = if resolution.fell_back {
            " (previous business day)"
        } else {
            ""
        };
        println!(
            "  {:<12} target {}  used {}{}",
            resolution.label, resolution.target, resolution.resolved, note
        );
    }
    println!();

    section(&format!("Top {} by {}", run.watchlist.len(), score_column));
    export::print_table(
        &run.watchlist,
        &[CLOSE_PRICE, score_column.as_str(), shares_column.as_str()],
        PREVIEW_ROWS,
    )?;

    let output = args.output_or(info.default_output);
    let mut frame = run.watchlist.into_inner();
    export::write_csv(&mut frame, &output)?;
    println!("Saved {} rows to {}", frame.height(), output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn test_momentum_from_csv_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("constituents.csv"), "symbol\nAAA\nBBB\nCCC\n").unwrap();
        fs::write(
            dir.path().join("prices.csv"),
            "date,AAA,BBB,CCC\n\
             2024-01-02,10.0,10.0,10.0\n\
             2024-01-03,11.0,10.5,9.0\n\
             2024-01-04,12.0,10.8,8.0\n\
             2024-01-05,13.0,11.0,7.5\n",
        )
        .unwrap();

        let config = StrategyConfig::from_toml(
            r#"
            [momentum]
            period_labels = ["1D return", "2D return"]
            offset_unit = "days"
            period_offsets = [1, 2]
            start_date = "2024-01-02"
            end_date = "2024-01-05"
            "#,
        )
        .unwrap();

        let output = dir.path().join("momentum.csv");
        let args = CommonArgs {
            output: Some(output.clone()),
            data_dir: Some(dir.path().to_path_buf()),
            top_n: Some(2),
            notional: Some(1_000.0),
            ..CommonArgs::default()
        };
        run(&config, false, &args).await.unwrap();

        let written = fs::read_to_string(&output).unwrap();
        let mut lines = written.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("symbol,Close Price,Num_shares_to_buy"));
        assert!(header.ends_with("HQM Score"));
        let best: Vec<&str> = lines.next().unwrap().split(',').collect();
        assert_eq!(best[0], "AAA");
        assert_eq!(best[1].parse::<f64>().unwrap(), 13.0);
        assert_eq!(best[2], "76");
        assert_eq!(lines.count(), 1);
    }
}
