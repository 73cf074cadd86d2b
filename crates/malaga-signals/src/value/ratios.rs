//! Enterprise-value ratios derived from raw fundamentals.

use malaga_traits::{FundamentalField, Result, Watchlist};

/// Enterprise value over EBITDA.
pub const EV_TO_EBITDA: &str = "ev_to_ebitda";

/// Enterprise value over gross profit.
pub const EV_TO_GROSS_PROFIT: &str = "ev_to_gross_profit";

/// `numerator / denominator`, `NaN` when either side is missing or the
/// denominator is zero.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if numerator.is_nan() || denominator.is_nan() || denominator == 0.0 {
        f64::NAN
    } else {
        numerator / denominator
    }
}

/// Element-wise [`safe_ratio`] of two aligned columns.
pub fn ratio_column(numerators: &[f64], denominators: &[f64]) -> Vec<f64> {
    numerators
        .iter()
        .zip(denominators)
        .map(|(n, d)| safe_ratio(*n, *d))
        .collect()
}

/// Adds `ev_to_ebitda` and `ev_to_gross_profit` to a fundamentals watchlist.
///
/// # Errors
///
/// Returns `MissingColumn` if `enterprise_value`, `ebitda` or `gross_profit`
/// is absent.
pub fn derive_enterprise_ratios(fundamentals: &Watchlist) -> Result<Watchlist> {
    let ev = fundamentals.values(FundamentalField::EnterpriseValue.as_str())?;
    let ebitda = fundamentals.values(FundamentalField::Ebitda.as_str())?;
    let gross_profit = fundamentals.values(FundamentalField::GrossProfit.as_str())?;

    fundamentals
        .with_values(EV_TO_EBITDA, ratio_column(&ev, &ebitda))?
        .with_values(EV_TO_GROSS_PROFIT, ratio_column(&ev, &gross_profit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use polars::prelude::*;

    #[test]
    fn test_safe_ratio() {
        assert_relative_eq!(safe_ratio(10.0, 4.0), 2.5);
        assert!(safe_ratio(10.0, 0.0).is_nan());
        assert!(safe_ratio(f64::NAN, 2.0).is_nan());
        assert!(safe_ratio(1.0, f64::NAN).is_nan());
        // Negative EBITDA is kept; the percentile ranks it below every positive multiple.
        assert_relative_eq!(safe_ratio(100.0, -20.0), -5.0);
    }

    #[test]
    fn test_derive_enterprise_ratios() {
        let df = df! {
            "symbol" => ["AAA", "BBB"],
            "enterprise_value" => [Some(1000.0), Some(500.0)],
            "ebitda" => [Some(100.0), None],
            "gross_profit" => [Some(250.0), Some(0.0)],
        }
        .unwrap();
        let derived = derive_enterprise_ratios(&Watchlist::new(df).unwrap()).unwrap();

        let ev_ebitda = derived.values(EV_TO_EBITDA).unwrap();
        assert_relative_eq!(ev_ebitda[0], 10.0);
        assert!(ev_ebitda[1].is_nan());

        let ev_gp = derived.values(EV_TO_GROSS_PROFIT).unwrap();
        assert_relative_eq!(ev_gp[0], 4.0);
        assert!(ev_gp[1].is_nan());
    }

    #[test]
    fn test_missing_inputs() {
        let df = df! { "symbol" => ["AAA"], "enterprise_value" => [1.0] }.unwrap();
        assert!(derive_enterprise_ratios(&Watchlist::new(df).unwrap()).is_err());
    }
}
