//! Equal-weight index command.

use super::{CommonArgs, banner, section};
use crate::config::StrategyConfig;
use crate::{data, export};
use anyhow::{Context, Result};
use malaga::pipeline::{EqualWeightPipeline, PRICE_COLUMN, SHARES_COLUMN};
use malaga::signals::StrategyKind;
use malaga::signals::registry::strategy_info;
use malaga::traits::FundamentalField;

const PREVIEW_ROWS: usize = 20;

/// Sizes every constituent of the universe as of `--end` (default: today).
pub(crate) async fn run(config: &StrategyConfig, args: &CommonArgs) -> Result<()> {
    let info = strategy_info(StrategyKind::EqualWeight)
        .context("equal-weight index is not registered")?;
    let as_of = args.as_of()?;
    let allocation = config.equal_weight_allocation(args);

    banner("Equal-Weight Index");
    println!("As of:     {as_of}");
    println!("Policy:    {:?}", allocation.policy);
    println!("Notional:  ${:.2}\n", allocation.portfolio_notional);

    let dir = config.data_dir(args);
    let universe = data::constituents(config, dir.as_deref())?;
    let market = data::market(dir.as_deref())?;

    let watchlist = EqualWeightPipeline::new(allocation)
        .with_price_window(config.data.price_window_days)
        .run(&universe, &market, as_of)
        .await?;

    section(&format!("{} Constituents", watchlist.len()));
    export::print_table(
        &watchlist,
        &[PRICE_COLUMN, FundamentalField::MarketCap.as_str(), SHARES_COLUMN],
        PREVIEW_ROWS,
    )?;

    let output = args.output_or(info.default_output);
    let mut frame = watchlist.into_inner();
    export::write_csv(&mut frame, &output)?;
    println!("Saved {} rows to {}", frame.height(), output.display());
    Ok(())
}
