//! Value screen command.

use super::{CommonArgs, banner, section};
use crate::config::StrategyConfig;
use crate::{data, export};
use anyhow::{Context, Result};
use malaga::pipeline::{PRICE_COLUMN, ValuePipeline};
use malaga::signals::StrategyKind;
use malaga::signals::registry::strategy_info;

const PREVIEW_ROWS: usize = 20;

/// Runs the value screen as of `--end` (default: today).
pub(crate) async fn run(config: &StrategyConfig, args: &CommonArgs) -> Result<()> {
    let info = strategy_info(StrategyKind::Value).context("value screen is not registered")?;
    let as_of = args.as_of()?;
    let allocation = config.allocation(args);
    let shares_column = allocation.output_column.clone();

    banner("Robust Value");
    let ratios: Vec<&str> = config.value.ratios.iter().map(|r| r.column()).collect();
    println!("As of:     {as_of}");
    println!("Multiples: {}", ratios.join(", "));
    println!("Notional:  ${:.2}\n", allocation.portfolio_notional);

    let dir = config.data_dir(args);
    let universe = data::constituents(config, dir.as_deref())?;
    let market = data::market(dir.as_deref())?;

    let pipeline = ValuePipeline::new(config.value.clone())
        .with_scorer(config.scorer())
        .with_combiner(config.combiner())
        .with_selection(config.selection(args))
        .with_allocation(allocation)
        .with_price_window(config.data.price_window_days);
    let score_column = pipeline.config().score_column.clone();
    let watchlist = pipeline.run(&universe, &market, as_of).await?;

    section(&format!("Cheapest {} by {}", watchlist.len(), score_column));
    export::print_table(
        &watchlist,
        &[PRICE_COLUMN, score_column.as_str(), shares_column.as_str()],
        PREVIEW_ROWS,
    )?;

    let output = args.output_or(info.default_output);
    let mut frame = watchlist.into_inner();
    export::write_csv(&mut frame, &output)?;
    println!("Saved {} rows to {}", frame.height(), output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn test_value_from_csv_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("constituents.csv"), "symbol\nDEAR\nCHEAP\n").unwrap();
        fs::write(
            dir.path().join("prices.csv"),
            "date,DEAR,CHEAP\n2024-06-03,400.0,50.0\n2024-06-04,410.0,\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("fundamentals.csv"),
            "symbol,trailing_pe,price_to_book,price_to_sales,enterprise_value,ebitda,gross_profit\n\
             DEAR,40.0,6.0,5.0,900.0,10.0,20.0\n\
             CHEAP,8.0,1.0,0.5,100.0,10.0,20.0\n",
        )
        .unwrap();

        let output = dir.path().join("value.csv");
        let args = CommonArgs {
            output: Some(output.clone()),
            data_dir: Some(dir.path().to_path_buf()),
            notional: Some(1_000.0),
            end: Some("2024-06-04".to_string()),
            ..CommonArgs::default()
        };
        run(&StrategyConfig::default(), &args).await.unwrap();

        let written = fs::read_to_string(&output).unwrap();
        let rows: Vec<&str> = written.lines().collect();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].starts_with("symbol,Price,Num_shares_to_buy"));
        assert!(rows[0].ends_with("RV Score"));
        let cheap: Vec<&str> = rows[1].split(',').collect();
        assert_eq!(cheap[0], "CHEAP");
        assert_eq!(cheap[1].parse::<f64>().unwrap(), 50.0);
        assert_eq!(cheap[2], "20");
        let dear: Vec<&str> = rows[2].split(',').collect();
        assert_eq!(dear[0], "DEAR");
        assert_eq!(dear[2], "2");
    }
}
