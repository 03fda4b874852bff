//! Result records returned by every analysis.
//!
//! Records are plain immutable values: public fields, `Clone`, and
//! `Serialize`/`Deserialize` so presentation layers can consume them by
//! field name. They carry no behaviour beyond a few read-only helpers.

use serde::{Deserialize, Serialize};

use crate::analysis::{ConversionInterval, RatioMethod, ThetaEstimation};
use crate::math::ReferenceDistribution;
use crate::power::{Baseline, ProportionVariance};

// ============================================================================
// Warning - degenerate data markers
// ============================================================================

/// Legitimate-but-degenerate data state that was handled with a fallback.
///
/// Warnings never abort an analysis. They record that a fallback value was
/// used so the caller can decide how much to trust the result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Warning {
    /// Standard error is exactly zero; the interval collapsed to the point
    /// estimate and the p-value is 1 (no effect) or `f64::MIN_POSITIVE`.
    ZeroVariance,

    /// Covariate has zero variance; CUPED fell back to `theta = 0`.
    ZeroCovariateVariance,

    /// Bootstrap ran with fewer resamples than needed for stable tails.
    SmallBootstrap {
        /// Resamples actually used.
        n_resamples: usize,
    },
}

impl Warning {
    /// Short human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            Warning::ZeroVariance => "standard error is zero; interval collapsed to the estimate",
            Warning::ZeroCovariateVariance => "covariate is constant; no CUPED adjustment applied",
            Warning::SmallBootstrap { .. } => "few bootstrap resamples; interval tails are unstable",
        }
    }
}

// ============================================================================
// EffectResult - difference of means
// ============================================================================

/// Difference of means between treatment (B) and control (A).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectResult {
    /// Observations in group A.
    pub n_a: usize,
    /// Observations in group B.
    pub n_b: usize,
    /// Sample mean of A.
    pub mean_a: f64,
    /// Sample mean of B.
    pub mean_b: f64,
    /// `mean_b - mean_a`.
    pub effect: f64,
    /// Welch standard error of the effect.
    pub standard_error: f64,
    /// Lower confidence bound.
    pub ci_low: f64,
    /// Upper confidence bound.
    pub ci_high: f64,
    /// Two-sided p-value for a zero effect.
    pub p_value: f64,
    /// Confidence level of the interval.
    pub confidence_level: f64,
    /// Distribution used for the critical value and p-value.
    pub reference: ReferenceDistribution,
    /// Degenerate-case markers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}

impl EffectResult {
    /// The interval as a tuple.
    pub fn ci(&self) -> (f64, f64) {
        (self.ci_low, self.ci_high)
    }

    /// Whether the effect is significant at level `alpha`.
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }

    /// Relative lift `effect / mean_a`, or `None` when the control mean is 0.
    pub fn relative_effect(&self) -> Option<f64> {
        (self.mean_a != 0.0).then(|| self.effect / self.mean_a)
    }
}

// ============================================================================
// ConversionResult - difference of proportions
// ============================================================================

/// Difference of conversion rates between treatment (B) and control (A).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionResult {
    /// Users in group A.
    pub n_a: usize,
    /// Users in group B.
    pub n_b: usize,
    /// Converted users in A.
    pub conversions_a: u64,
    /// Converted users in B.
    pub conversions_b: u64,
    /// Conversion rate of A.
    pub rate_a: f64,
    /// Conversion rate of B.
    pub rate_b: f64,
    /// `rate_b - rate_a`.
    pub effect: f64,
    /// Unpooled standard error of the effect.
    pub standard_error: f64,
    /// Lower confidence bound.
    pub ci_low: f64,
    /// Upper confidence bound.
    pub ci_high: f64,
    /// Two-sided p-value for a zero effect.
    pub p_value: f64,
    /// Confidence level of the interval.
    pub confidence_level: f64,
    /// Interval construction that produced `ci_low`/`ci_high`.
    pub interval: ConversionInterval,
    /// Degenerate-case markers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}

impl ConversionResult {
    /// The interval as a tuple.
    pub fn ci(&self) -> (f64, f64) {
        (self.ci_low, self.ci_high)
    }

    /// Whether the effect is significant at level `alpha`.
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }

    /// Relative lift `effect / rate_a`, or `None` when the control rate is 0.
    pub fn relative_effect(&self) -> Option<f64> {
        (self.rate_a != 0.0).then(|| self.effect / self.rate_a)
    }
}

// ============================================================================
// RatioResult - difference of ratio-of-sums metrics
// ============================================================================

/// Difference of ratio metrics `sum(num)/sum(den)` between B and A.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioResult {
    /// Users in group A.
    pub n_a: usize,
    /// Users in group B.
    pub n_b: usize,
    /// Ratio of totals in A.
    pub ratio_a: f64,
    /// Ratio of totals in B.
    pub ratio_b: f64,
    /// `ratio_b - ratio_a`.
    pub effect: f64,
    /// Delta-method standard error; `None` for bootstrap.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard_error: Option<f64>,
    /// Lower confidence bound.
    pub ci_low: f64,
    /// Upper confidence bound.
    pub ci_high: f64,
    /// Two-sided p-value for a zero effect.
    pub p_value: f64,
    /// Confidence level of the interval.
    pub confidence_level: f64,
    /// Variance method, including resample count and seed for bootstrap.
    pub method: RatioMethod,
    /// Degenerate-case markers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}

impl RatioResult {
    /// The interval as a tuple.
    pub fn ci(&self) -> (f64, f64) {
        (self.ci_low, self.ci_high)
    }

    /// Whether the effect is significant at level `alpha`.
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

// ============================================================================
// SrmResult - sample ratio mismatch
// ============================================================================

/// Chi-square goodness-of-fit test of observed group sizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SrmResult {
    /// Observed users in A.
    pub observed_a: u64,
    /// Observed users in B.
    pub observed_b: u64,
    /// Expected users in A under the intended split.
    pub expected_a: f64,
    /// Expected users in B under the intended split.
    pub expected_b: f64,
    /// Pearson chi-square statistic.
    pub chi2: f64,
    /// Upper-tail p-value.
    pub p_value: f64,
    /// Always 1 for two groups.
    pub degrees_of_freedom: u32,
    /// Significance level the mismatch flag was judged at.
    pub alpha: f64,
    /// `p_value < alpha`.
    pub mismatch: bool,
}

// ============================================================================
// PowerResult - planning
// ============================================================================

/// Which direction of the power calculation was requested, with its answer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PowerCalculation {
    /// Users per group needed to reach `target_power`.
    SampleSize {
        /// Answer, rounded up.
        required_n_per_group: u64,
        /// Requested power.
        target_power: f64,
    },
    /// Power reached with `n_per_group` users per group.
    AchievedPower {
        /// Input sample size.
        n_per_group: u64,
        /// Answer in (0, 1).
        achieved_power: f64,
    },
}

/// Outcome of a planning calculation with its inputs echoed back.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerResult {
    /// Requested direction and its answer.
    pub calculation: PowerCalculation,
    /// Baseline the variance was derived from.
    pub metric: Baseline,
    /// Absolute effect (minimum detectable effect for sample size).
    pub effect: f64,
    /// Two-sided significance level.
    pub alpha: f64,
    /// Variance assumption for proportion metrics (ignored for means).
    pub proportion_variance: ProportionVariance,
}

impl PowerResult {
    /// Required users per group, if this was a sample-size calculation.
    pub fn required_n_per_group(&self) -> Option<u64> {
        match self.calculation {
            PowerCalculation::SampleSize {
                required_n_per_group,
                ..
            } => Some(required_n_per_group),
            PowerCalculation::AchievedPower { .. } => None,
        }
    }

    /// Achieved power, if this was a power calculation.
    pub fn achieved_power(&self) -> Option<f64> {
        match self.calculation {
            PowerCalculation::AchievedPower { achieved_power, .. } => Some(achieved_power),
            PowerCalculation::SampleSize { .. } => None,
        }
    }
}

// ============================================================================
// CupedResult - covariate-adjusted mean effect
// ============================================================================

/// Mean effect on CUPED-adjusted metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CupedResult {
    /// Adjustment coefficient `Cov(metric, covariate) / Var(covariate)`.
    pub theta: f64,
    /// Population theta was estimated on.
    pub theta_estimation: ThetaEstimation,
    /// Covariate mean the adjustment centres on.
    pub covariate_mean: f64,
    /// Unadjusted metric mean of A.
    pub baseline_mean_a: f64,
    /// Unadjusted metric mean of B.
    pub baseline_mean_b: f64,
    /// Mean effect computed on the adjusted metrics.
    pub effect: EffectResult,
    /// Degenerate-case markers from the adjustment step.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}

impl CupedResult {
    /// Unadjusted effect `baseline_mean_b - baseline_mean_a`.
    pub fn unadjusted_effect(&self) -> f64 {
        self.baseline_mean_b - self.baseline_mean_a
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_effect() -> EffectResult {
        EffectResult {
            n_a: 10,
            n_b: 12,
            mean_a: 4.0,
            mean_b: 5.0,
            effect: 1.0,
            standard_error: 0.4,
            ci_low: 0.2,
            ci_high: 1.8,
            p_value: 0.02,
            confidence_level: 0.95,
            reference: ReferenceDistribution::student_t(19.5),
            warnings: vec![],
        }
    }

    #[test]
    fn test_effect_helpers() {
        let r = sample_effect();
        assert_eq!(r.ci(), (0.2, 1.8));
        assert!(r.is_significant(0.05));
        assert!(!r.is_significant(0.01));
        assert_eq!(r.relative_effect(), Some(0.25));
    }

    #[test]
    fn test_effect_serializes_by_field_name() {
        let json = serde_json::to_value(sample_effect()).unwrap();
        assert_eq!(json["effect"], 1.0);
        assert_eq!(json["n_b"], 12);
        assert!(json.get("warnings").is_none(), "empty warnings are skipped");

        let mut with_warning = sample_effect();
        with_warning.warnings.push(Warning::ZeroVariance);
        let json = serde_json::to_value(&with_warning).unwrap();
        assert_eq!(json["warnings"][0], "ZeroVariance");
    }

    #[test]
    fn test_power_result_accessors() {
        let r = PowerResult {
            calculation: PowerCalculation::SampleSize {
                required_n_per_group: 100,
                target_power: 0.8,
            },
            metric: Baseline::Mean { std_dev: 1.0 },
            effect: 0.5,
            alpha: 0.05,
            proportion_variance: ProportionVariance::Unpooled,
        };
        assert_eq!(r.required_n_per_group(), Some(100));
        assert_eq!(r.achieved_power(), None);
    }

    #[test]
    fn test_warning_descriptions_are_distinct() {
        let a = Warning::ZeroVariance.description();
        let b = Warning::ZeroCovariateVariance.description();
        let c = Warning::SmallBootstrap { n_resamples: 10 }.description();
        assert_ne!(a, b);
        assert_ne!(b, c);
    }
}
