//! CUPED: variance reduction with a pre-experiment covariate.
//!
//! ```text
//! theta    = Cov(metric, covariate) / Var(covariate)
//! adjusted = metric − theta·(covariate − mean(covariate))
//! ```
//!
//! The adjusted samples go through [`mean_effect`](super::mean_effect)
//! unchanged. A constant covariate gives `theta = 0` (no adjustment) and a
//! [`Warning::ZeroCovariateVariance`] on the result.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{check_confidence_level, Error, Result};
use crate::result::{CupedResult, Warning};
use crate::statistics::{check_sample, OnlineCovariance, OnlineStats};
use crate::types::Group;

use super::mean::effect_from_moments;

/// Population theta and the covariate mean are estimated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ThetaEstimation {
    /// Both groups together. The pooled mean of the adjusted metric equals
    /// the pooled mean of the raw metric.
    #[default]
    Pooled,
    /// Control group only, so treatment cannot influence the coefficient.
    ControlOnly,
}

/// Adjustment coefficient together with the centring point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThetaEstimate {
    /// `Cov(metric, covariate) / Var(covariate)`, or 0 for a constant covariate.
    pub theta: f64,
    /// Covariate mean over the estimation population.
    pub covariate_mean: f64,
    /// Covariate variance over the estimation population.
    pub covariate_variance: f64,
}

/// Estimate theta from index-aligned metric/covariate samples.
pub fn estimate_theta(
    metric_a: &[f64],
    metric_b: &[f64],
    covariate_a: &[f64],
    covariate_b: &[f64],
    estimation: ThetaEstimation,
) -> Result<ThetaEstimate> {
    check_pairs(Group::A, metric_a, covariate_a)?;
    check_pairs(Group::B, metric_b, covariate_b)?;
    Ok(theta_from_moments(&population_moments(
        metric_a,
        metric_b,
        covariate_a,
        covariate_b,
        estimation,
    )))
}

/// Apply `metric − theta·(covariate − covariate_mean)` to one group.
pub fn cuped_adjust(
    group: Group,
    metric: &[f64],
    covariate: &[f64],
    theta: f64,
    covariate_mean: f64,
) -> Result<Vec<f64>> {
    check_pairs(group, metric, covariate)?;
    Ok(adjust(metric, covariate, theta, covariate_mean))
}

/// Mean effect on CUPED-adjusted metrics.
///
/// # Example
///
/// ```
/// use abstat::{cuped_effect, mean_effect, ThetaEstimation};
///
/// let pre_a = [10.0, 20.0, 30.0, 40.0, 50.0, 60.0];
/// let pre_b = [15.0, 25.0, 35.0, 45.0, 55.0, 65.0];
/// let post_a = [11.0, 19.0, 32.0, 41.0, 49.0, 62.0];
/// let post_b = [18.0, 27.0, 38.0, 46.0, 59.0, 67.0];
///
/// let raw = mean_effect(&post_a, &post_b, 0.95).unwrap();
/// let adjusted = cuped_effect(&post_a, &post_b, &pre_a, &pre_b, 0.95, ThetaEstimation::Pooled).unwrap();
/// assert!(adjusted.effect.standard_error < raw.standard_error);
/// ```
pub fn cuped_effect(
    metric_a: &[f64],
    metric_b: &[f64],
    covariate_a: &[f64],
    covariate_b: &[f64],
    confidence_level: f64,
    estimation: ThetaEstimation,
) -> Result<CupedResult> {
    cuped_effect_with_threshold(
        metric_a,
        metric_b,
        covariate_a,
        covariate_b,
        confidence_level,
        estimation,
        None,
    )
}

/// [`cuped_effect`] with the large-sample switch of
/// [`mean_effect_with_threshold`](super::mean_effect_with_threshold).
pub(crate) fn cuped_effect_with_threshold(
    metric_a: &[f64],
    metric_b: &[f64],
    covariate_a: &[f64],
    covariate_b: &[f64],
    confidence_level: f64,
    estimation: ThetaEstimation,
    large_sample_threshold: Option<usize>,
) -> Result<CupedResult> {
    check_pairs(Group::A, metric_a, covariate_a)?;
    check_pairs(Group::B, metric_b, covariate_b)?;
    check_confidence_level(confidence_level)?;

    let estimate = theta_from_moments(&population_moments(
        metric_a,
        metric_b,
        covariate_a,
        covariate_b,
        estimation,
    ));

    let mut warnings = Vec::new();
    if estimate.covariate_variance == 0.0 {
        debug!(?estimation, "covariate has zero variance, skipping CUPED adjustment");
        warnings.push(Warning::ZeroCovariateVariance);
    }

    let adjusted_a = adjust(metric_a, covariate_a, estimate.theta, estimate.covariate_mean);
    let adjusted_b = adjust(metric_b, covariate_b, estimate.theta, estimate.covariate_mean);
    let effect = effect_from_moments(
        &OnlineStats::from_slice(&adjusted_a).finalize(),
        &OnlineStats::from_slice(&adjusted_b).finalize(),
        confidence_level,
        large_sample_threshold,
    );

    Ok(CupedResult {
        theta: estimate.theta,
        theta_estimation: estimation,
        covariate_mean: estimate.covariate_mean,
        baseline_mean_a: OnlineStats::from_slice(metric_a).mean(),
        baseline_mean_b: OnlineStats::from_slice(metric_b).mean(),
        effect,
        warnings,
    })
}

/// Lengths first, then emptiness and finiteness of both sequences.
fn check_pairs(group: Group, metric: &[f64], covariate: &[f64]) -> Result<()> {
    if metric.len() != covariate.len() {
        return Err(Error::LengthMismatch {
            group,
            what: "metric and covariate",
            left: metric.len(),
            right: covariate.len(),
        });
    }
    check_sample(group, metric)?;
    check_sample(group, covariate)
}

/// Covariate (x) / metric (y) moments over the estimation population.
fn population_moments(
    metric_a: &[f64],
    metric_b: &[f64],
    covariate_a: &[f64],
    covariate_b: &[f64],
    estimation: ThetaEstimation,
) -> OnlineCovariance {
    let mut moments = OnlineCovariance::from_pairs(covariate_a, metric_a);
    if estimation == ThetaEstimation::Pooled {
        moments.merge(&OnlineCovariance::from_pairs(covariate_b, metric_b));
    }
    moments
}

fn theta_from_moments(moments: &OnlineCovariance) -> ThetaEstimate {
    let covariate_variance = moments.variance_x();
    let theta = if covariate_variance > 0.0 {
        moments.covariance() / covariate_variance
    } else {
        0.0
    };
    ThetaEstimate {
        theta,
        covariate_mean: moments.mean_x(),
        covariate_variance,
    }
}

fn adjust(metric: &[f64], covariate: &[f64], theta: f64, covariate_mean: f64) -> Vec<f64> {
    metric
        .iter()
        .zip(covariate)
        .map(|(&y, &x)| y - theta * (x - covariate_mean))
        .collect()
}
