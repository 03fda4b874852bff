//! Sample-size and power planning for two-arm tests.
//!
//! Two-sided test at level `alpha`, equal group sizes:
//!
//! ```text
//! n     = ceil((z_{1-α/2} + z_{power})² · (var_a + var_b) / δ²)
//! power = Φ(|δ| / sqrt((var_a + var_b)/n) − z_{1-α/2})
//! ```
//!
//! For a mean metric `var_a = var_b = σ²`. For a proportion metric the
//! variances depend on the baseline rate `p1` and the treatment rate
//! `p2 = p1 + δ`; which assumption is used changes the answer, so it is an
//! explicit [`ProportionVariance`] argument.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{check_alpha, Error, Result};
use crate::math::{normal_cdf, normal_quantile};
use crate::result::{PowerCalculation, PowerResult};

/// Baseline the variance is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Baseline {
    /// Continuous metric with a common standard deviation in both groups.
    Mean {
        /// Per-user standard deviation.
        std_dev: f64,
    },
    /// Conversion metric with the control conversion rate.
    Proportion {
        /// Control rate in (0, 1).
        rate: f64,
    },
}

/// Variance assumption for proportion metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProportionVariance {
    /// `p1(1-p1) + p2(1-p2)`.
    #[default]
    Unpooled,
    /// `2·p̄(1-p̄)` with `p̄ = (p1 + p2)/2`.
    Pooled,
    /// Pooled variance under the null, unpooled under the alternative:
    /// `n = (z_{1-α/2}·sqrt(2p̄q̄) + z_{power}·sqrt(p1q1 + p2q2))² / δ²`.
    Classic,
}

/// Variance terms for one planning problem.
#[derive(Debug, Clone, Copy)]
struct Variances {
    /// Sum of per-user variances under the alternative.
    alternative: f64,
    /// Sum of per-user variances under the null (equals `alternative` except
    /// for [`ProportionVariance::Classic`]).
    null: f64,
}

/// Users per group needed to detect `min_detectable_effect` with `power`.
///
/// # Example
///
/// ```
/// use abstat::{required_sample_size, Baseline, ProportionVariance};
///
/// let plan = required_sample_size(
///     Baseline::Mean { std_dev: 1.0 },
///     0.5,
///     0.05,
///     0.8,
///     ProportionVariance::Unpooled,
/// )
/// .unwrap();
/// assert_eq!(plan.required_n_per_group(), Some(63));
/// ```
pub fn required_sample_size(
    baseline: Baseline,
    min_detectable_effect: f64,
    alpha: f64,
    power: f64,
    proportion_variance: ProportionVariance,
) -> Result<PowerResult> {
    check_alpha(alpha)?;
    check_power(power)?;
    if !min_detectable_effect.is_finite() || min_detectable_effect == 0.0 {
        return Err(Error::NonPositiveEffect {
            value: min_detectable_effect,
        });
    }
    let variances = variances(baseline, min_detectable_effect, proportion_variance)?;

    let z_alpha = normal_quantile(1.0 - alpha / 2.0);
    let z_power = normal_quantile(power);
    let root = z_alpha * variances.null.sqrt() + z_power * variances.alternative.sqrt();
    let n = (root * root / (min_detectable_effect * min_detectable_effect)).ceil();
    let required_n_per_group = (n as u64).max(1);

    debug!(
        ?baseline,
        min_detectable_effect, alpha, power, required_n_per_group, "planned sample size"
    );

    Ok(PowerResult {
        calculation: PowerCalculation::SampleSize {
            required_n_per_group,
            target_power: power,
        },
        metric: baseline,
        effect: min_detectable_effect,
        alpha,
        proportion_variance,
    })
}

/// Power reached with `n_per_group` users per group for a true `effect`.
pub fn achieved_power(
    n_per_group: u64,
    baseline: Baseline,
    effect: f64,
    alpha: f64,
    proportion_variance: ProportionVariance,
) -> Result<PowerResult> {
    if n_per_group == 0 {
        return Err(Error::NonPositiveSampleSize);
    }
    check_alpha(alpha)?;
    if !effect.is_finite() {
        return Err(Error::NonPositiveEffect { value: effect });
    }
    let variances = variances(baseline, effect, proportion_variance)?;

    let z_alpha = normal_quantile(1.0 - alpha / 2.0);
    let n = n_per_group as f64;
    let statistic =
        (effect.abs() * n.sqrt() - z_alpha * variances.null.sqrt()) / variances.alternative.sqrt();
    let achieved_power = normal_cdf(statistic);

    Ok(PowerResult {
        calculation: PowerCalculation::AchievedPower {
            n_per_group,
            achieved_power,
        },
        metric: baseline,
        effect,
        alpha,
        proportion_variance,
    })
}

/// Smallest absolute effect on a mean metric detectable with `n_per_group`
/// users per group.
///
/// `δ = (z_{1-α/2} + z_{power}) · σ · sqrt(2/n)`
pub fn minimum_detectable_effect(
    n_per_group: u64,
    std_dev: f64,
    alpha: f64,
    power: f64,
) -> Result<f64> {
    if n_per_group == 0 {
        return Err(Error::NonPositiveSampleSize);
    }
    check_alpha(alpha)?;
    check_power(power)?;
    check_std_dev(std_dev)?;

    let z_alpha = normal_quantile(1.0 - alpha / 2.0);
    let z_power = normal_quantile(power);
    Ok((z_alpha + z_power) * std_dev * (2.0 / n_per_group as f64).sqrt())
}

fn check_power(power: f64) -> Result<()> {
    if power > 0.0 && power < 1.0 {
        Ok(())
    } else {
        Err(Error::PowerOutOfRange { value: power })
    }
}

fn check_std_dev(std_dev: f64) -> Result<()> {
    if std_dev.is_finite() && std_dev > 0.0 {
        Ok(())
    } else {
        Err(Error::NonPositiveStdDev { value: std_dev })
    }
}

fn check_rate(name: &'static str, value: f64) -> Result<()> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(Error::RateOutOfRange { name, value })
    }
}

fn variances(
    baseline: Baseline,
    effect: f64,
    proportion_variance: ProportionVariance,
) -> Result<Variances> {
    match baseline {
        Baseline::Mean { std_dev } => {
            check_std_dev(std_dev)?;
            let sum = 2.0 * std_dev * std_dev;
            Ok(Variances {
                alternative: sum,
                null: sum,
            })
        }
        Baseline::Proportion { rate } => {
            check_rate("baseline rate", rate)?;
            let treated = rate + effect;
            check_rate("baseline rate + effect", treated)?;

            let unpooled = rate * (1.0 - rate) + treated * (1.0 - treated);
            let mid = (rate + treated) / 2.0;
            let pooled = 2.0 * mid * (1.0 - mid);
            Ok(match proportion_variance {
                ProportionVariance::Unpooled => Variances {
                    alternative: unpooled,
                    null: unpooled,
                },
                ProportionVariance::Pooled => Variances {
                    alternative: pooled,
                    null: pooled,
                },
                ProportionVariance::Classic => Variances {
                    alternative: unpooled,
                    null: pooled,
                },
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n_for(baseline: Baseline, mde: f64, variance: ProportionVariance) -> u64 {
        required_sample_size(baseline, mde, 0.05, 0.8, variance)
            .unwrap()
            .required_n_per_group()
            .unwrap()
    }

    #[test]
    fn test_mean_textbook_value() {
        // (1.96 + 0.84)² · 2 / 0.25 ≈ 62.8
        assert_eq!(n_for(Baseline::Mean { std_dev: 1.0 }, 0.5, ProportionVariance::Unpooled), 63);
        // Proportion variance choice does not affect mean metrics.
        assert_eq!(n_for(Baseline::Mean { std_dev: 1.0 }, 0.5, ProportionVariance::Pooled), 63);
    }

    #[test]
    fn test_proportion_variants_differ() {
        let baseline = Baseline::Proportion { rate: 0.10 };
        let unpooled = n_for(baseline, 0.02, ProportionVariance::Unpooled);
        let pooled = n_for(baseline, 0.02, ProportionVariance::Pooled);
        let classic = n_for(baseline, 0.02, ProportionVariance::Classic);

        // 7.849 · 0.1956 / 0.0004 ≈ 3838
        assert!((3830..=3850).contains(&unpooled), "unpooled = {}", unpooled);
        assert!(pooled >= unpooled);
        assert!(classic >= unpooled && classic <= pooled);
    }

    #[test]
    fn test_negative_effect_uses_magnitude() {
        let baseline = Baseline::Mean { std_dev: 2.0 };
        assert_eq!(
            n_for(baseline, -0.4, ProportionVariance::Unpooled),
            n_for(baseline, 0.4, ProportionVariance::Unpooled)
        );
    }

    #[test]
    fn test_planned_n_reaches_target_power() {
        let baseline = Baseline::Proportion { rate: 0.2 };
        for variance in [
            ProportionVariance::Unpooled,
            ProportionVariance::Pooled,
            ProportionVariance::Classic,
        ] {
            let n = n_for(baseline, 0.03, variance);
            let power = achieved_power(n, baseline, 0.03, 0.05, variance)
                .unwrap()
                .achieved_power()
                .unwrap();
            assert!(power >= 0.8 - 1e-9, "{:?}: power {} at n {}", variance, power, n);
            let below = achieved_power(n - 1, baseline, 0.03, 0.05, variance)
                .unwrap()
                .achieved_power()
                .unwrap();
            assert!(below < power);
        }
    }

    #[test]
    fn test_minimum_detectable_effect_inverts_sample_size() {
        let mde = minimum_detectable_effect(63, 1.0, 0.05, 0.8).unwrap();
        assert!(mde < 0.5 && mde > 0.49, "mde = {}", mde);
    }

    #[test]
    fn test_result_echoes_inputs() {
        let r = achieved_power(
            500,
            Baseline::Proportion { rate: 0.3 },
            -0.05,
            0.01,
            ProportionVariance::Pooled,
        )
        .unwrap();
        assert_eq!(r.metric, Baseline::Proportion { rate: 0.3 });
        assert_eq!(r.effect, -0.05);
        assert_eq!(r.alpha, 0.01);
        assert_eq!(r.proportion_variance, ProportionVariance::Pooled);
        assert!(r.required_n_per_group().is_none());
    }

    #[test]
    fn test_invalid_inputs() {
        let mean = Baseline::Mean { std_dev: 1.0 };
        let unpooled = ProportionVariance::Unpooled;
        assert_eq!(
            required_sample_size(mean, 0.0, 0.05, 0.8, unpooled),
            Err(Error::NonPositiveEffect { value: 0.0 })
        );
        assert_eq!(
            required_sample_size(mean, 0.1, 0.05, 1.0, unpooled),
            Err(Error::PowerOutOfRange { value: 1.0 })
        );
        assert_eq!(
            required_sample_size(mean, 0.1, 0.0, 0.8, unpooled),
            Err(Error::AlphaOutOfRange { value: 0.0 })
        );
        assert_eq!(
            required_sample_size(Baseline::Mean { std_dev: 0.0 }, 0.1, 0.05, 0.8, unpooled),
            Err(Error::NonPositiveStdDev { value: 0.0 })
        );
        assert_eq!(
            achieved_power(0, mean, 0.1, 0.05, unpooled),
            Err(Error::NonPositiveSampleSize)
        );
        assert_eq!(
            required_sample_size(Baseline::Proportion { rate: 0.95 }, 0.1, 0.05, 0.8, unpooled),
            Err(Error::RateOutOfRange {
                name: "baseline rate + effect",
                value: 0.95 + 0.1
            })
        );
        assert!(matches!(
            required_sample_size(Baseline::Proportion { rate: 0.0 }, 0.1, 0.05, 0.8, unpooled),
            Err(Error::RateOutOfRange {
                name: "baseline rate",
                ..
            })
        ));
    }
}
