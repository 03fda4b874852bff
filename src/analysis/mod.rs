//! Effect estimators.
//!
//! 1. **Mean** ([`mean`]): Welch difference of means, Student t or normal reference
//! 2. **Conversion** ([`conversion`]): difference of proportions, Wald or Newcombe–Wilson
//! 3. **Ratio** ([`ratio`]): ratio-of-sums effect via delta method or bootstrap
//! 4. **CUPED** ([`cuped`]): covariate adjustment feeding the mean estimator
//!
//! Closed-form estimators share one convention, implemented by
//! `interval_and_p`: `CI = effect ± crit·se`, `p = P(|T| ≥ |effect/se|)`.

pub mod conversion;
pub mod cuped;
pub mod mean;
pub mod ratio;

pub use conversion::{
    conversion_effect, conversion_effect_bools, conversion_effect_with, ConversionInterval,
};
pub use cuped::{cuped_adjust, cuped_effect, estimate_theta, ThetaEstimate, ThetaEstimation};
pub use mean::{mean_effect, mean_effect_with_threshold, welch_satterthwaite_df};
pub use ratio::{ratio_effect, RatioMethod};

use tracing::debug;

use crate::math::ReferenceDistribution;

/// Interval and p-value for an estimate with a known standard error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Inference {
    pub ci_low: f64,
    pub ci_high: f64,
    pub p_value: f64,
    /// Standard error was exactly zero and the fallback policy applied.
    pub degenerate: bool,
}

/// `effect ± crit·se` and the two-sided p-value of `effect/se`.
///
/// With `se == 0` the interval collapses to the point estimate and the
/// p-value is 1 for a zero effect, `f64::MIN_POSITIVE` otherwise.
pub(crate) fn interval_and_p(
    effect: f64,
    standard_error: f64,
    reference: ReferenceDistribution,
    confidence_level: f64,
) -> Inference {
    if standard_error == 0.0 {
        debug!(effect, "standard error is zero, collapsing interval to the estimate");
        return Inference {
            ci_low: effect,
            ci_high: effect,
            p_value: if effect == 0.0 { 1.0 } else { f64::MIN_POSITIVE },
            degenerate: true,
        };
    }

    let crit = reference.critical_value(confidence_level);
    let half_width = crit * standard_error;
    let p_value = reference
        .two_sided_p(effect / standard_error)
        .max(f64::MIN_POSITIVE);

    Inference {
        ci_low: effect - half_width,
        ci_high: effect + half_width,
        p_value,
        degenerate: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_se_policy() {
        let zero = interval_and_p(0.0, 0.0, ReferenceDistribution::Normal, 0.95);
        assert_eq!((zero.ci_low, zero.ci_high, zero.p_value), (0.0, 0.0, 1.0));
        assert!(zero.degenerate);

        let shifted = interval_and_p(2.5, 0.0, ReferenceDistribution::Normal, 0.95);
        assert_eq!((shifted.ci_low, shifted.ci_high), (2.5, 2.5));
        assert_eq!(shifted.p_value, f64::MIN_POSITIVE);
    }

    #[test]
    fn test_normal_interval_width() {
        let inf = interval_and_p(1.0, 0.5, ReferenceDistribution::Normal, 0.95);
        assert!((inf.ci_low - (1.0 - 1.959963984540054 * 0.5)).abs() < 1e-9);
        assert!((inf.ci_high - (1.0 + 1.959963984540054 * 0.5)).abs() < 1e-9);
        // z = 2 -> p = 0.0455
        assert!((inf.p_value - 0.04550026389635842).abs() < 1e-9);
        assert!(!inf.degenerate);
    }

    #[test]
    fn test_huge_statistic_keeps_positive_p() {
        let inf = interval_and_p(100.0, 1e-3, ReferenceDistribution::Normal, 0.95);
        assert!(inf.p_value > 0.0);
    }
}
