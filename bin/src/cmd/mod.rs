//! CLI subcommand modules.
//!
//! This module contains the implementations for all malaga CLI subcommands
//! and the flags they share.

pub(crate) mod equal_weight;
pub(crate) mod momentum;
pub(crate) mod monte_carlo;
pub(crate) mod strategies;
pub(crate) mod universe;
pub(crate) mod value;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, ValueEnum};
use malaga::Date;
use malaga::portfolio::AllocationPolicy;
use std::path::PathBuf;

/// Allocation policy as spelled on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum PolicyArg {
    /// Size every position against the whole notional
    FullNotional,
    /// Split the notional evenly before sizing
    EqualSplit,
}

impl From<PolicyArg> for AllocationPolicy {
    fn from(policy: PolicyArg) -> Self {
        match policy {
            PolicyArg::FullNotional => Self::FullNotional,
            PolicyArg::EqualSplit => Self::EqualSplit,
        }
    }
}

/// Flags shared by every screen.
#[derive(Debug, Clone, Default, Args)]
pub(crate) struct CommonArgs {
    /// Output CSV file
    #[arg(short, long)]
    pub(crate) output: Option<PathBuf>,

    /// Read constituents.csv, prices.csv and fundamentals.csv from this
    /// directory instead of the network
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,

    /// Number of symbols kept after ranking
    #[arg(short = 'n', long)]
    pub(crate) top_n: Option<usize>,

    /// Portfolio size in dollars
    #[arg(long)]
    pub(crate) notional: Option<f64>,

    /// How the notional is split across positions
    #[arg(long, value_enum)]
    pub(crate) policy: Option<PolicyArg>,

    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub(crate) start: Option<String>,

    /// End or as-of date (YYYY-MM-DD)
    #[arg(long)]
    pub(crate) end: Option<String>,
}

impl CommonArgs {
    /// Parsed `--start`, if given.
    pub(crate) fn start_date(&self) -> Result<Option<Date>> {
        parse_optional(self.start.as_deref())
    }

    /// Parsed `--end`, if given.
    pub(crate) fn end_date(&self) -> Result<Option<Date>> {
        parse_optional(self.end.as_deref())
    }

    /// Parsed `--end`, or today.
    pub(crate) fn as_of(&self) -> Result<Date> {
        Ok(self.end_date()?.unwrap_or_else(|| Utc::now().date_naive()))
    }

    /// `--output`, or `default` in the working directory.
    pub(crate) fn output_or(&self, default: &str) -> PathBuf {
        self.output.clone().unwrap_or_else(|| PathBuf::from(default))
    }
}

fn parse_optional(value: Option<&str>) -> Result<Option<Date>> {
    value
        .map(|v| malaga::traits::parse_date(v).with_context(|| format!("invalid date '{v}'")))
        .transpose()
}

/// Prints a section banner.
pub(crate) fn banner(title: &str) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║ {title:^60} ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
}

/// Prints a rule with a heading.
pub(crate) fn section(title: &str) {
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("{title}");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_dates() {
        let args = CommonArgs {
            start: Some("2024-01-02".to_string()),
            end: Some("2024-02-30".to_string()),
            ..CommonArgs::default()
        };
        assert_eq!(
            args.start_date().unwrap(),
            Date::from_ymd_opt(2024, 1, 2)
        );
        assert!(args.end_date().is_err());
        assert!(CommonArgs::default().start_date().unwrap().is_none());
    }

    #[test]
    fn test_output_default() {
        let args = CommonArgs::default();
        assert_eq!(args.output_or("value_strategy.csv"), PathBuf::from("value_strategy.csv"));
    }

    #[test]
    fn test_policy_conversion() {
        assert_eq!(
            AllocationPolicy::from(PolicyArg::EqualSplit),
            AllocationPolicy::EqualSplit
        );
    }
}
