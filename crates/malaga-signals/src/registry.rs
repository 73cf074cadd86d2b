//! Strategy registry for discovering the available screens.
//!
//! This module provides metadata about each screen the toolkit can run: the
//! composite column it produces, how that column is ranked and where the
//! result is written by default.

use serde::{Deserialize, Serialize};

/// Screen classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Monthly high-quality momentum
    Momentum,
    /// Weekly high-quality momentum
    WeeklyMomentum,
    /// Robust value
    Value,
    /// Equal-weight index replication
    EqualWeight,
    /// Monte Carlo portfolio simulation
    MonteCarlo,
}

impl StrategyKind {
    /// Get a human-readable description of the strategy.
    #[must_use]
    pub const fn description(&self) -> &str {
        match self {
            Self::Momentum => "Percentile-ranked 1M/3M/6M/1Y returns",
            Self::WeeklyMomentum => "Percentile-ranked 1W/2W/4W/12W returns",
            Self::Value => "Percentile-ranked PE, PB, PS, EV/EBITDA and EV/GP multiples",
            Self::EqualWeight => "Equal dollar allocation across every constituent",
            Self::MonteCarlo => "Simulated portfolio value paths from correlated returns",
        }
    }
}

/// Metadata about a strategy.
#[derive(Debug, Clone, Serialize)]
pub struct StrategyInfo {
    /// Command name of the strategy
    pub name: &'static str,

    /// Strategy classification
    pub kind: StrategyKind,

    /// Composite score column, if the strategy ranks symbols
    pub score_column: Option<&'static str>,

    /// Whether a higher score ranks first
    pub higher_is_better: bool,

    /// Whether the strategy requires fundamental data
    pub requires_fundamentals: bool,

    /// Default CSV output file
    pub default_output: &'static str,
}

/// Get information about all available strategies.
#[must_use]
pub fn available_strategies() -> Vec<StrategyInfo> {
    vec![
        StrategyInfo {
            name: "momentum",
            kind: StrategyKind::Momentum,
            score_column: Some(crate::momentum::HQM_SCORE),
            higher_is_better: true,
            requires_fundamentals: false,
            default_output: "momentum_strategy.csv",
        },
        StrategyInfo {
            name: "weekly-momentum",
            kind: StrategyKind::WeeklyMomentum,
            score_column: Some(crate::momentum::HQM_SCORE),
            higher_is_better: true,
            requires_fundamentals: false,
            default_output: "weekly_momentum_strategy.csv",
        },
        StrategyInfo {
            name: "value",
            kind: StrategyKind::Value,
            score_column: Some(crate::value::RV_SCORE),
            higher_is_better: false,
            requires_fundamentals: true,
            default_output: "value_strategy.csv",
        },
        StrategyInfo {
            name: "equal-weight",
            kind: StrategyKind::EqualWeight,
            score_column: None,
            higher_is_better: false,
            requires_fundamentals: true,
            default_output: "equal_weight_index.csv",
        },
        StrategyInfo {
            name: "monte-carlo",
            kind: StrategyKind::MonteCarlo,
            score_column: None,
            higher_is_better: false,
            requires_fundamentals: false,
            default_output: "monte_carlo.csv",
        },
    ]
}

/// Get information about a specific strategy.
#[must_use]
pub fn strategy_info(kind: StrategyKind) -> Option<StrategyInfo> {
    available_strategies()
        .into_iter()
        .find(|info| info.kind == kind)
}

/// Get information about a specific strategy by command name.
#[must_use]
pub fn get_strategy_info(name: &str) -> Option<StrategyInfo> {
    available_strategies()
        .into_iter()
        .find(|info| info.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_strategies() {
        let strategies = available_strategies();
        assert_eq!(strategies.len(), 5);

        let mut outputs: Vec<_> = strategies.iter().map(|s| s.default_output).collect();
        outputs.sort_unstable();
        outputs.dedup();
        assert_eq!(outputs.len(), 5);
    }

    #[test]
    fn test_value_ranks_ascending() {
        let value = strategy_info(StrategyKind::Value).unwrap();
        assert!(!value.higher_is_better);
        assert_eq!(value.score_column, Some("RV Score"));

        let momentum = strategy_info(StrategyKind::Momentum).unwrap();
        assert!(momentum.higher_is_better);
        assert_eq!(momentum.score_column, Some("HQM Score"));
    }

    #[test]
    fn test_get_strategy_info() {
        let info = get_strategy_info("weekly-momentum").unwrap();
        assert_eq!(info.kind, StrategyKind::WeeklyMomentum);
        assert_eq!(info.default_output, "weekly_momentum_strategy.csv");
        assert!(get_strategy_info("rsi").is_none());
    }

    #[test]
    fn test_descriptions() {
        for info in available_strategies() {
            assert!(!info.kind.description().is_empty());
        }
    }
}
