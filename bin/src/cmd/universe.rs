//! Universe listing command.

use super::{CommonArgs, banner};
use crate::config::StrategyConfig;
use crate::{data, export};
use anyhow::Result;
use malaga::UniverseProvider;

/// Loads the constituents, prints them and optionally saves them.
pub(crate) async fn run(config: &StrategyConfig, args: &CommonArgs, limit: usize) -> Result<()> {
    banner("Index Constituents");

    let dir = config.data_dir(args);
    let universe = data::constituents(config, dir.as_deref())?
        .constituents()
        .await?;

    println!("{} constituents\n", universe.len());
    for chunk in universe.symbols().iter().take(limit).collect::<Vec<_>>().chunks(10) {
        let line: Vec<String> = chunk.iter().map(|s| format!("{s:<6}")).collect();
        println!("  {}", line.join(" "));
    }
    if universe.len() > limit {
        println!("  ... {} more", universe.len() - limit);
    }
    println!();

    if let Some(output) = &args.output {
        let mut frame = universe.data().clone();
        export::write_csv(&mut frame, output)?;
        println!("Saved {} constituents to {}", frame.height(), output.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn test_universe_round_trips_through_csv() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("constituents.csv"),
            "Symbol,Security\nBRK.B,Berkshire Hathaway\nMSFT,Microsoft\n",
        )
        .unwrap();

        let output = dir.path().join("saved.csv");
        let args = CommonArgs {
            output: Some(output.clone()),
            data_dir: Some(dir.path().to_path_buf()),
            ..CommonArgs::default()
        };
        run(&StrategyConfig::default(), &args, 50).await.unwrap();

        let written = fs::read_to_string(&output).unwrap();
        let rows: Vec<&str> = written.lines().collect();
        assert_eq!(rows, vec!["symbol,Security", "BRK-B,Berkshire Hathaway", "MSFT,Microsoft"]);
    }
}
