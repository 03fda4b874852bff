//! Difference of conversion rates.
//!
//! Each user contributes 0 (did not convert) or 1 (converted). Two interval
//! constructions are available:
//!
//! - [`ConversionInterval::Wald`]: `effect ± z·sqrt(p_a(1-p_a)/n_a + p_b(1-p_b)/n_b)`,
//!   p-value from the same unpooled standard error.
//! - [`ConversionInterval::NewcombeWilson`]: Newcombe's hybrid score interval
//!   built from per-arm Wilson intervals, p-value from the pooled
//!   two-proportion z-test. Better coverage for small samples and rates near
//!   0 or 1.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{check_confidence_level, Error, Result};
use crate::math::{normal_quantile, ReferenceDistribution};
use crate::result::{ConversionResult, Warning};
use crate::statistics::check_sample;
use crate::types::Group;

use super::interval_and_p;

/// Interval construction for a difference of proportions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConversionInterval {
    /// Normal approximation with the unpooled Bernoulli variance.
    #[default]
    Wald,
    /// Newcombe hybrid score interval with a pooled z-test p-value.
    NewcombeWilson,
}

/// Wald difference of conversion rates `rate(b) - rate(a)`.
///
/// Every value must be exactly `0.0` or `1.0`.
///
/// # Example
///
/// ```
/// use abstat::conversion_effect;
///
/// let control = [0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0];
/// let treatment = [1.0, 1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0];
/// let result = conversion_effect(&control, &treatment, 0.95).unwrap();
/// assert_eq!(result.conversions_b, 5);
/// assert!((result.effect - 0.375).abs() < 1e-12);
/// ```
pub fn conversion_effect(a: &[f64], b: &[f64], confidence_level: f64) -> Result<ConversionResult> {
    conversion_effect_with(a, b, confidence_level, ConversionInterval::Wald)
}

/// Difference of conversion rates with an explicit interval construction.
pub fn conversion_effect_with(
    a: &[f64],
    b: &[f64],
    confidence_level: f64,
    interval: ConversionInterval,
) -> Result<ConversionResult> {
    let conversions_a = count_conversions(Group::A, a)?;
    let conversions_b = count_conversions(Group::B, b)?;
    check_confidence_level(confidence_level)?;

    Ok(from_counts(
        conversions_a,
        a.len(),
        conversions_b,
        b.len(),
        confidence_level,
        interval,
    ))
}

/// Difference of conversion rates for boolean outcomes.
pub fn conversion_effect_bools(
    a: &[bool],
    b: &[bool],
    confidence_level: f64,
    interval: ConversionInterval,
) -> Result<ConversionResult> {
    if a.is_empty() {
        return Err(Error::EmptySample { group: Group::A });
    }
    if b.is_empty() {
        return Err(Error::EmptySample { group: Group::B });
    }
    check_confidence_level(confidence_level)?;

    let count = |xs: &[bool]| xs.iter().filter(|&&x| x).count() as u64;
    Ok(from_counts(
        count(a),
        a.len(),
        count(b),
        b.len(),
        confidence_level,
        interval,
    ))
}

/// Validate a 0/1 sample and count its ones.
fn count_conversions(group: Group, data: &[f64]) -> Result<u64> {
    check_sample(group, data)?;
    let mut conversions = 0u64;
    for (index, &value) in data.iter().enumerate() {
        if value == 1.0 {
            conversions += 1;
        } else if value != 0.0 {
            return Err(Error::NonBinary {
                group,
                index,
                value,
            });
        }
    }
    Ok(conversions)
}

/// Build the result from validated counts (`n_a, n_b > 0`).
fn from_counts(
    conversions_a: u64,
    n_a: usize,
    conversions_b: u64,
    n_b: usize,
    confidence_level: f64,
    interval: ConversionInterval,
) -> ConversionResult {
    let rate_a = conversions_a as f64 / n_a as f64;
    let rate_b = conversions_b as f64 / n_b as f64;
    let effect = rate_b - rate_a;

    let var_a = rate_a * (1.0 - rate_a) / n_a as f64;
    let var_b = rate_b * (1.0 - rate_b) / n_b as f64;
    let standard_error = (var_a + var_b).sqrt();

    let mut warnings = Vec::new();
    let (ci_low, ci_high, p_value) = match interval {
        ConversionInterval::Wald => {
            let inference = interval_and_p(
                effect,
                standard_error,
                ReferenceDistribution::Normal,
                confidence_level,
            );
            if inference.degenerate {
                warnings.push(Warning::ZeroVariance);
            }
            (inference.ci_low, inference.ci_high, inference.p_value)
        }
        ConversionInterval::NewcombeWilson => {
            let z = normal_quantile(1.0 - (1.0 - confidence_level) / 2.0);
            let (low_a, high_a) = wilson_interval(rate_a, n_a, z);
            let (low_b, high_b) = wilson_interval(rate_b, n_b, z);
            let ci_low = effect - ((rate_b - low_b).powi(2) + (high_a - rate_a).powi(2)).sqrt();
            let ci_high = effect + ((high_b - rate_b).powi(2) + (rate_a - low_a).powi(2)).sqrt();

            let pooled_se = pooled_standard_error(conversions_a, n_a, conversions_b, n_b);
            let p_value = if pooled_se == 0.0 {
                debug!("pooled conversion rate is 0 or 1, z-test is degenerate");
                warnings.push(Warning::ZeroVariance);
                if effect == 0.0 {
                    1.0
                } else {
                    f64::MIN_POSITIVE
                }
            } else {
                ReferenceDistribution::Normal
                    .two_sided_p(effect / pooled_se)
                    .max(f64::MIN_POSITIVE)
            };
            (ci_low, ci_high, p_value)
        }
    };

    ConversionResult {
        n_a,
        n_b,
        conversions_a,
        conversions_b,
        rate_a,
        rate_b,
        effect,
        standard_error,
        ci_low,
        ci_high,
        p_value,
        confidence_level,
        interval,
        warnings,
    }
}

/// Wilson score interval for one proportion at critical value `z`.
fn wilson_interval(rate: f64, n: usize, z: f64) -> (f64, f64) {
    let n = n as f64;
    let z2 = z * z;
    let denom = 1.0 + z2 / n;
    let centre = (rate + z2 / (2.0 * n)) / denom;
    let half = z / denom * (rate * (1.0 - rate) / n + z2 / (4.0 * n * n)).sqrt();
    ((centre - half).max(0.0), (centre + half).min(1.0))
}

/// Standard error of the difference under H0 (common rate).
fn pooled_standard_error(conversions_a: u64, n_a: usize, conversions_b: u64, n_b: usize) -> f64 {
    let pooled = (conversions_a + conversions_b) as f64 / (n_a + n_b) as f64;
    (pooled * (1.0 - pooled) * (1.0 / n_a as f64 + 1.0 / n_b as f64)).sqrt()
}
