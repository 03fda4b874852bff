//! Difference of means with a Welch standard error.
//!
//! ```text
//! effect = mean_b - mean_a
//! se     = sqrt(var_a/n_a + var_b/n_b)
//! df     = se⁴ / Σ (var_g/n_g)² / (n_g - 1)      (Welch–Satterthwaite)
//! ```
//!
//! No variance-homogeneity test is performed; unequal variances are assumed.

use tracing::debug;

use crate::error::{check_confidence_level, Result};
use crate::math::ReferenceDistribution;
use crate::result::{EffectResult, Warning};
use crate::statistics::{check_sample, OnlineStats, StatsSnapshot};
use crate::types::Group;

use super::interval_and_p;

/// Welch difference of means `mean(b) - mean(a)` with a Student t reference.
///
/// # Example
///
/// ```
/// use abstat::mean_effect;
///
/// let control = [12.0, 15.0, 11.0, 14.0, 13.0];
/// let treatment = [16.0, 18.0, 15.0, 17.0, 19.0];
/// let result = mean_effect(&control, &treatment, 0.95).unwrap();
/// assert!((result.effect - 4.0).abs() < 1e-12);
/// assert!(result.ci_low > 0.0);
/// ```
pub fn mean_effect(a: &[f64], b: &[f64], confidence_level: f64) -> Result<EffectResult> {
    mean_effect_with_threshold(a, b, confidence_level, None)
}

/// Like [`mean_effect`], switching to the normal reference once both groups
/// have at least `large_sample_threshold` observations.
///
/// `None` always uses Student t (which still collapses to the normal when the
/// Welch–Satterthwaite df is infinite).
pub fn mean_effect_with_threshold(
    a: &[f64],
    b: &[f64],
    confidence_level: f64,
    large_sample_threshold: Option<usize>,
) -> Result<EffectResult> {
    check_sample(Group::A, a)?;
    check_sample(Group::B, b)?;
    check_confidence_level(confidence_level)?;

    let stats_a = OnlineStats::from_slice(a).finalize();
    let stats_b = OnlineStats::from_slice(b).finalize();
    Ok(effect_from_moments(
        &stats_a,
        &stats_b,
        confidence_level,
        large_sample_threshold,
    ))
}

/// Build the result from already-validated per-group moments.
pub(crate) fn effect_from_moments(
    stats_a: &StatsSnapshot,
    stats_b: &StatsSnapshot,
    confidence_level: f64,
    large_sample_threshold: Option<usize>,
) -> EffectResult {
    let effect = stats_b.mean - stats_a.mean;
    let term_a = stats_a.variance / stats_a.count as f64;
    let term_b = stats_b.variance / stats_b.count as f64;
    let standard_error = (term_a + term_b).sqrt();

    let large_sample = matches!(
        large_sample_threshold,
        Some(t) if stats_a.count >= t && stats_b.count >= t
    );
    let reference = if large_sample {
        debug!(
            n_a = stats_a.count,
            n_b = stats_b.count,
            "both groups above the large-sample threshold, using the normal reference"
        );
        ReferenceDistribution::Normal
    } else {
        ReferenceDistribution::student_t(welch_satterthwaite_df(
            stats_a.variance,
            stats_a.count,
            stats_b.variance,
            stats_b.count,
        ))
    };

    let inference = interval_and_p(effect, standard_error, reference, confidence_level);
    let mut warnings = Vec::new();
    if inference.degenerate {
        warnings.push(Warning::ZeroVariance);
    }

    EffectResult {
        n_a: stats_a.count,
        n_b: stats_b.count,
        mean_a: stats_a.mean,
        mean_b: stats_b.mean,
        effect,
        standard_error,
        ci_low: inference.ci_low,
        ci_high: inference.ci_high,
        p_value: inference.p_value,
        confidence_level,
        reference,
        warnings,
    }
}

/// Welch–Satterthwaite degrees of freedom.
///
/// Groups with a single observation or zero variance contribute nothing to
/// the denominator; if nothing remains the result is `f64::INFINITY`.
pub fn welch_satterthwaite_df(var_a: f64, n_a: usize, var_b: f64, n_b: usize) -> f64 {
    let term = |var: f64, n: usize| -> Option<(f64, f64)> {
        if n < 2 || var <= 0.0 {
            return None;
        }
        let s = var / n as f64;
        Some((s, s * s / (n - 1) as f64))
    };

    let parts = [term(var_a, n_a), term(var_b, n_b)];
    let numerator: f64 = parts.iter().flatten().map(|(s, _)| s).sum();
    let denominator: f64 = parts.iter().flatten().map(|(_, d)| d).sum();

    if denominator > 0.0 {
        numerator * numerator / denominator
    } else {
        f64::INFINITY
    }
}
