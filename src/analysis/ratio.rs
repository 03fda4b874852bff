//! Ratio-of-sums metrics (revenue per visitor, clicks per session, ...).
//!
//! The group ratio is `R = Σnum / Σden`; the effect is `R_b - R_a`. Users are
//! the randomisation unit, so numerator and denominator of one user are
//! correlated and the variance must account for it.
//!
//! ## Delta method
//!
//! First-order Taylor expansion around the per-user means `N̄`, `D̄`:
//!
//! ```text
//! Var(R) ≈ [Var(num) − 2R·Cov(num, den) + R²·Var(den)] / (n·D̄²)
//! ```
//!
//! which is the bracketed form `Var(num)/D̄² − 2N̄·Cov/D̄³ + N̄²·Var(den)/D̄⁴`
//! divided by `n`, with `R = N̄/D̄`. Group variances are summed.
//!
//! ## Bootstrap
//!
//! Replicate `i` resamples user pairs with replacement in each group using
//! its own seeded stream, then recomputes both ratios. The interval is the
//! Type 2 percentile interval of the replicate effects and the p-value is
//! `min(1, 2·min(frac(r ≤ 0), frac(r ≥ 0)))`. The percentile interval is
//! not forced to contain the point estimate.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::constants::{DEFAULT_BOOTSTRAP_RESAMPLES, DEFAULT_SEED, MIN_STABLE_RESAMPLES};
use crate::error::{check_confidence_level, Error, Result};
use crate::math::ReferenceDistribution;
use crate::result::{RatioResult, Warning};
use crate::statistics::{
    bootstrap_p_value, percentile_interval, resample_pair_sums, run_replicates, OnlineCovariance,
};
use crate::types::RatioGroup;

use super::interval_and_p;

/// Variance method for a ratio effect.
///
/// Bootstrap always carries its seed; there is no implicit randomness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RatioMethod {
    /// Closed-form delta method with a normal reference.
    #[default]
    Delta,
    /// Percentile bootstrap.
    Bootstrap {
        /// Number of replicates (at least 1).
        n_resamples: usize,
        /// Base seed for the per-replicate streams.
        seed: u64,
    },
}

impl RatioMethod {
    /// Bootstrap with an explicit replicate count and seed.
    pub fn bootstrap(n_resamples: usize, seed: u64) -> Self {
        RatioMethod::Bootstrap { n_resamples, seed }
    }

    /// Lowercase tag, as accepted by [`FromStr`].
    pub fn name(&self) -> &'static str {
        match self {
            RatioMethod::Delta => "delta",
            RatioMethod::Bootstrap { .. } => "bootstrap",
        }
    }
}

impl fmt::Display for RatioMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RatioMethod::Delta => write!(f, "delta"),
            RatioMethod::Bootstrap { n_resamples, seed } => {
                write!(f, "bootstrap (B={}, seed={})", n_resamples, seed)
            }
        }
    }
}

/// Parses `"delta"` or `"bootstrap"` (case-insensitive). Bootstrap gets the
/// default replicate count and [`DEFAULT_SEED`].
impl FromStr for RatioMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "delta" => Ok(RatioMethod::Delta),
            "bootstrap" => Ok(RatioMethod::bootstrap(DEFAULT_BOOTSTRAP_RESAMPLES, DEFAULT_SEED)),
            _ => Err(Error::UnknownMethod { tag: s.to_string() }),
        }
    }
}

/// Ratio effect `ratio(b) - ratio(a)`.
///
/// # Example
///
/// ```
/// use abstat::{ratio_effect, Group, RatioGroup, RatioMethod};
///
/// let a = RatioGroup::new(Group::A, vec![3.0, 0.0, 5.0, 2.0], vec![2.0, 1.0, 3.0, 2.0]).unwrap();
/// let b = RatioGroup::new(Group::B, vec![4.0, 1.0, 6.0, 3.0], vec![2.0, 1.0, 3.0, 2.0]).unwrap();
///
/// let delta = ratio_effect(&a, &b, RatioMethod::Delta, 0.95).unwrap();
/// assert!((delta.effect - 0.5).abs() < 1e-12);
///
/// let boot = ratio_effect(&a, &b, RatioMethod::bootstrap(500, 7), 0.95).unwrap();
/// assert_eq!(boot.effect, delta.effect);
/// assert!(boot.standard_error.is_none());
/// ```
pub fn ratio_effect(
    a: &RatioGroup,
    b: &RatioGroup,
    method: RatioMethod,
    confidence_level: f64,
) -> Result<RatioResult> {
    check_confidence_level(confidence_level)?;
    if let RatioMethod::Bootstrap { n_resamples, .. } = method {
        if n_resamples < 1 {
            return Err(Error::TooFewResamples {
                requested: n_resamples,
            });
        }
    }

    let ratio_a = a.ratio();
    let ratio_b = b.ratio();
    let effect = ratio_b - ratio_a;

    let mut warnings = Vec::new();
    let (standard_error, ci_low, ci_high, p_value) = match method {
        RatioMethod::Delta => {
            let standard_error = (delta_variance(a) + delta_variance(b)).sqrt();
            let inference = interval_and_p(
                effect,
                standard_error,
                ReferenceDistribution::Normal,
                confidence_level,
            );
            if inference.degenerate {
                warnings.push(Warning::ZeroVariance);
            }
            (
                Some(standard_error),
                inference.ci_low,
                inference.ci_high,
                inference.p_value,
            )
        }
        RatioMethod::Bootstrap { n_resamples, seed } => {
            if n_resamples < MIN_STABLE_RESAMPLES {
                warn!(
                    n_resamples,
                    minimum = MIN_STABLE_RESAMPLES,
                    "few bootstrap resamples, percentile interval will be unstable"
                );
                warnings.push(Warning::SmallBootstrap { n_resamples });
            }
            let replicates = bootstrap_effects(a, b, n_resamples, seed)?;
            let (ci_low, ci_high) = percentile_interval(&replicates, confidence_level);
            (None, ci_low, ci_high, bootstrap_p_value(&replicates))
        }
    };

    Ok(RatioResult {
        n_a: a.len(),
        n_b: b.len(),
        ratio_a,
        ratio_b,
        effect,
        standard_error,
        ci_low,
        ci_high,
        p_value,
        confidence_level,
        method,
        warnings,
    })
}

/// Delta-method variance of one group's ratio; 0 for a single user.
pub(crate) fn delta_variance(group: &RatioGroup) -> f64 {
    let moments = OnlineCovariance::from_pairs(group.numerators(), group.denominators());
    let n = moments.count() as f64;
    let mean_den = moments.mean_y();
    let ratio = group.ratio();

    let residual_variance = moments.variance_x() - 2.0 * ratio * moments.covariance()
        + ratio * ratio * moments.variance_y();
    (residual_variance / (n * mean_den * mean_den)).max(0.0)
}

/// Bootstrap replicate effects in replicate order.
fn bootstrap_effects(
    a: &RatioGroup,
    b: &RatioGroup,
    n_resamples: usize,
    seed: u64,
) -> Result<Vec<f64>> {
    debug!(n_resamples, seed, n_a = a.len(), n_b = b.len(), "running ratio bootstrap");

    run_replicates(n_resamples, seed, |replicate, rng| {
        let ratio_a = resampled_ratio(a, replicate, rng)?;
        let ratio_b = resampled_ratio(b, replicate, rng)?;
        Ok(ratio_b - ratio_a)
    })
}

/// Ratio of one resample of `group`'s user pairs.
fn resampled_ratio<R: Rng + ?Sized>(
    group: &RatioGroup,
    replicate: usize,
    rng: &mut R,
) -> Result<f64> {
    let (num, den) = resample_pair_sums(group.numerators(), group.denominators(), rng);
    if den == 0.0 {
        return Err(Error::DegenerateResample {
            group: group.group(),
            replicate,
        });
    }
    Ok(num / den)
}
