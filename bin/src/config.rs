//! TOML configuration for the screens.
//!
//! Every section is optional; command-line flags override file values.
//!
//! ```toml
//! [momentum]
//! start_date = "2023-01-30"
//! end_date = "2024-02-01"
//!
//! [weekly]
//! start_date = "2023-11-18"
//!
//! [allocation]
//! portfolio_notional = 1000000.0
//!
//! [selection]
//! top_n = 50
//!
//! [data]
//! dir = "data"
//! ```

use crate::cmd::CommonArgs;
use anyhow::{Context, Result};
use malaga::Date;
use malaga::combine::{EqualWeightCombiner, EqualWeightConfig};
use malaga::pipeline::DEFAULT_PRICE_WINDOW_DAYS;
use malaga::portfolio::{AllocationConfig, AllocationPolicy, MonteCarloConfig, SelectionConfig};
use malaga::signals::{MomentumConfig, OffsetUnit, PercentileConfig, PercentileScorer, ValueConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Overrides applied on top of a momentum preset.
///
/// `fill_missing_returns = nan` keeps missing period returns as `NaN`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct HorizonSection {
    pub(crate) period_labels: Option<Vec<String>>,
    pub(crate) offset_unit: Option<OffsetUnit>,
    pub(crate) period_offsets: Option<Vec<u32>>,
    pub(crate) start_date: Option<Date>,
    pub(crate) end_date: Option<Date>,
    pub(crate) fill_missing_returns: Option<f64>,
}

impl HorizonSection {
    fn apply(&self, mut base: MomentumConfig) -> MomentumConfig {
        if let Some(labels) = &self.period_labels {
            base.period_labels = labels.clone();
        }
        if let Some(unit) = self.offset_unit {
            base.offset_unit = unit;
        }
        if let Some(offsets) = &self.period_offsets {
            base.period_offsets = offsets.clone();
        }
        if let Some(start) = self.start_date {
            base.start_date = start;
        }
        if let Some(end) = self.end_date {
            base.end_date = end;
        }
        if let Some(fill) = self.fill_missing_returns {
            base.fill_missing_returns = (!fill.is_nan()).then_some(fill);
        }
        base
    }
}

/// `[equal_weight]` section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct EqualWeightSection {
    /// Allocation policy of the index (default: equal split)
    pub(crate) policy: AllocationPolicy,
}

impl Default for EqualWeightSection {
    fn default() -> Self {
        Self {
            policy: AllocationPolicy::EqualSplit,
        }
    }
}

/// `[data]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct DataSection {
    /// Directory of CSV inputs; the network is used when absent.
    pub(crate) dir: Option<PathBuf>,
    /// Constituents file inside `dir` (default: constituents.csv)
    pub(crate) universe_file: String,
    /// Calendar days searched backwards for a latest close (default: 14)
    pub(crate) price_window_days: u32,
}

impl Default for DataSection {
    fn default() -> Self {
        Self {
            dir: None,
            universe_file: "constituents.csv".to_string(),
            price_window_days: DEFAULT_PRICE_WINDOW_DAYS,
        }
    }
}

/// Settings for every screen.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct StrategyConfig {
    pub(crate) momentum: HorizonSection,
    pub(crate) weekly: HorizonSection,
    pub(crate) value: ValueConfig,
    pub(crate) percentile: PercentileConfig,
    pub(crate) combine: EqualWeightConfig,
    pub(crate) equal_weight: EqualWeightSection,
    pub(crate) allocation: AllocationConfig,
    pub(crate) selection: SelectionConfig,
    pub(crate) monte_carlo: MonteCarloConfig,
    pub(crate) data: DataSection,
}

impl StrategyConfig {
    /// Reads `path`, or returns the defaults when no file is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Parses a TOML document.
    pub(crate) fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Renders the configuration as TOML.
    pub(crate) fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Monthly or weekly preset with the file overrides and `--start`/`--end`.
    pub(crate) fn momentum(&self, weekly: bool, args: &CommonArgs) -> Result<MomentumConfig> {
        let mut config = if weekly {
            self.weekly.apply(MomentumConfig::weekly())
        } else {
            self.momentum.apply(MomentumConfig::monthly())
        };
        if let Some(start) = args.start_date()? {
            config.start_date = start;
        }
        if let Some(end) = args.end_date()? {
            config.end_date = end;
        }
        Ok(config)
    }

    /// Selection settings with `--top-n` applied.
    pub(crate) fn selection(&self, args: &CommonArgs) -> SelectionConfig {
        SelectionConfig {
            top_n: args.top_n.unwrap_or(self.selection.top_n),
            ..self.selection
        }
    }

    /// Allocation settings for the ranked screens with `--notional` and
    /// `--policy` applied.
    pub(crate) fn allocation(&self, args: &CommonArgs) -> AllocationConfig {
        self.allocation_with_policy(self.allocation.policy, args)
    }

    /// Allocation settings for the equal-weight index.
    pub(crate) fn equal_weight_allocation(&self, args: &CommonArgs) -> AllocationConfig {
        self.allocation_with_policy(self.equal_weight.policy, args)
    }

    fn allocation_with_policy(
        &self,
        policy: AllocationPolicy,
        args: &CommonArgs,
    ) -> AllocationConfig {
        AllocationConfig {
            portfolio_notional: args
                .notional
                .unwrap_or(self.allocation.portfolio_notional),
            policy: args.policy.map_or(policy, AllocationPolicy::from),
            ..self.allocation.clone()
        }
    }

    /// Percentile scorer from `[percentile]`.
    pub(crate) const fn scorer(&self) -> PercentileScorer {
        PercentileScorer::new(self.percentile)
    }

    /// Composite combiner from `[combine]`.
    pub(crate) fn combiner(&self) -> EqualWeightCombiner {
        EqualWeightCombiner::new(self.combine.clone())
    }

    /// `--data-dir`, else `[data] dir`.
    pub(crate) fn data_dir(&self, args: &CommonArgs) -> Option<PathBuf> {
        args.data_dir.clone().or_else(|| self.data.dir.clone())
    }
}
