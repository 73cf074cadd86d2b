//! Equal-weighted score combination strategy.

use malaga_traits::{MalagaError, Result};
use ndarray::{Array1, Zip};
use serde::{Deserialize, Serialize};

use crate::combiner::{Combiner, SignalScore};

/// Configuration for equal-weighted score combination.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EqualWeightConfig {
    /// Ignore `NaN` inputs instead of propagating them (default: false)
    pub skip_nan: bool,
}

/// Equal-weighted combiner that averages all scores.
///
/// Computes the arithmetic mean of the input scores per asset. With the
/// default configuration a `NaN` in any input makes that asset's composite
/// `NaN`; with `skip_nan` the mean is taken over the finite inputs and is
/// `NaN` only when every input is missing.
///
/// # Examples
///
/// ```rust,no_run
/// use malaga_combine::{Combiner, EqualWeightCombiner, SignalScore};
///
/// let combiner = EqualWeightCombiner::default();
/// let signals = vec![
///     SignalScore::new("1M return percentile", vec![0.5, 1.0]),
///     SignalScore::new("3M return percentile", vec![1.0, 0.5]),
/// ];
///
/// let composite = combiner.combine(&signals).unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct EqualWeightCombiner {
    config: EqualWeightConfig,
}

impl EqualWeightCombiner {
    /// Create a new equal-weight combiner with the given configuration.
    pub const fn new(config: EqualWeightConfig) -> Self {
        Self { config }
    }

    /// Whether `NaN` inputs are skipped.
    pub const fn skip_nan(&self) -> bool {
        self.config.skip_nan
    }

    fn validate(signals: &[SignalScore]) -> Result<usize> {
        let Some(first) = signals.first() else {
            return Err(MalagaError::ConfigurationMismatch(
                "cannot combine zero score columns".to_string(),
            ));
        };

        let n_assets = first.scores.len();
        for signal in signals {
            if signal.scores.len() != n_assets {
                return Err(MalagaError::mismatch(
                    &signal.name,
                    signal.scores.len(),
                    &first.name,
                    n_assets,
                ));
            }
        }
        Ok(n_assets)
    }
}

impl Combiner for EqualWeightCombiner {
    fn combine(&self, signals: &[SignalScore]) -> Result<Array1<f64>> {
        let n_assets = Self::validate(signals)?;

        if !self.config.skip_nan {
            let mut composite = Array1::zeros(n_assets);
            for signal in signals {
                composite += &signal.scores;
            }
            composite /= signals.len() as f64;
            return Ok(composite);
        }

        let mut sums = Array1::<f64>::zeros(n_assets);
        let mut counts = Array1::<f64>::zeros(n_assets);
        for signal in signals {
            Zip::from(&mut sums)
                .and(&mut counts)
                .and(&signal.scores)
                .for_each(|sum, count, &score| {
                    if !score.is_nan() {
                        *sum += score;
                        *count += 1.0;
                    }
                });
        }

        Ok(Zip::from(&sums)
            .and(&counts)
            .map_collect(|&sum, &count| if count > 0.0 { sum / count } else { f64::NAN }))
    }

    fn name(&self) -> &str {
        "equal_weight"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn signals() -> Vec<SignalScore> {
        vec![
            SignalScore::new("a", vec![0.25, 0.5, f64::NAN]),
            SignalScore::new("b", vec![0.75, 1.0, 0.5]),
        ]
    }

    #[test]
    fn test_equal_weight_basic() {
        let combiner = EqualWeightCombiner::default();
        let result = combiner.combine(&signals()).unwrap();

        assert_eq!(result.len(), 3);
        assert_relative_eq!(result[0], 0.5);
        assert_relative_eq!(result[1], 0.75);
    }

    #[test]
    fn test_nan_propagates_by_default() {
        let result = EqualWeightCombiner::default().combine(&signals()).unwrap();
        assert!(result[2].is_nan());
    }

    #[test]
    fn test_skip_nan() {
        let combiner = EqualWeightCombiner::new(EqualWeightConfig { skip_nan: true });
        let result = combiner.combine(&signals()).unwrap();
        assert_relative_eq!(result[2], 0.5);

        let all_missing = vec![
            SignalScore::new("a", vec![f64::NAN]),
            SignalScore::new("b", vec![f64::NAN]),
        ];
        assert!(combiner.combine(&all_missing).unwrap()[0].is_nan());
    }

    #[test]
    fn test_equal_weight_mismatched_lengths() {
        let combiner = EqualWeightCombiner::default();

        let signals = vec![
            SignalScore::new("sig1", vec![1.0, 2.0]),
            SignalScore::new("sig2", vec![1.0, 2.0, 3.0]),
        ];

        let result = combiner.combine(&signals);
        assert!(matches!(result, Err(MalagaError::ConfigurationMismatch(_))));
    }

    #[test]
    fn test_equal_weight_empty_signals() {
        let combiner = EqualWeightCombiner::default();
        let result = combiner.combine(&[]);
        assert!(matches!(result, Err(MalagaError::ConfigurationMismatch(_))));
    }

    #[test]
    fn test_equal_weight_single_signal() {
        let combiner = EqualWeightCombiner::default();
        let result = combiner
            .combine(&[SignalScore::new("sig1", vec![1.0, 0.0, 0.5])])
            .unwrap();
        assert_relative_eq!(result[2], 0.5);
    }
}
