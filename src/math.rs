//! Reference distributions for tests and intervals.
//!
//! Thin wrappers over `statrs`. Tail probabilities are computed through the
//! survival function (or `erfc`) rather than `1 - cdf`, so very small p-values
//! keep their precision instead of rounding to zero.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF, StudentsT};
use statrs::function::erf::{erfc, erfc_inv};

use crate::constants::NORMAL_APPROX_DF;

/// Standard normal CDF: Φ(x) = erfc(-x/√2) / 2
#[inline]
pub fn normal_cdf(x: f64) -> f64 {
    0.5 * erfc(-x * core::f64::consts::FRAC_1_SQRT_2)
}

/// Standard normal upper tail: 1 - Φ(x).
#[inline]
pub fn normal_sf(x: f64) -> f64 {
    0.5 * erfc(x * core::f64::consts::FRAC_1_SQRT_2)
}

/// Inverse standard normal CDF (probit).
///
/// Returns ±∞ at the boundaries.
pub fn normal_quantile(p: f64) -> f64 {
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }
    -core::f64::consts::SQRT_2 * erfc_inv(2.0 * p)
}

/// Upper-tail probability of a chi-square distribution.
///
/// Uses the exact normal identity for 1 degree of freedom:
/// `P(χ²₁ ≥ x) = P(|Z| ≥ √x) = erfc(√(x/2))`.
pub fn chi_squared_sf(x: f64, df: u32) -> f64 {
    if x <= 0.0 {
        return 1.0;
    }
    if df == 1 {
        return erfc((x / 2.0).sqrt());
    }
    match ChiSquared::new(df as f64) {
        Ok(dist) => dist.sf(x),
        Err(_) => f64::NAN,
    }
}

/// Distribution the test statistic is referred to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ReferenceDistribution {
    /// Standard normal (z).
    Normal,
    /// Student's t with (possibly fractional) degrees of freedom.
    StudentT {
        /// Degrees of freedom (Welch–Satterthwaite for two samples).
        df: f64,
    },
}

impl ReferenceDistribution {
    /// Student's t, collapsing to the normal for infinite or invalid df.
    pub fn student_t(df: f64) -> Self {
        if df.is_finite() && df > 0.0 {
            ReferenceDistribution::StudentT { df }
        } else {
            ReferenceDistribution::Normal
        }
    }

    /// Two-sided critical value for a central interval at `confidence_level`.
    ///
    /// The t quantile is found by bisection on the survival function, so the
    /// interval and [`two_sided_p`](Self::two_sided_p) agree on where the
    /// boundary lies.
    pub fn critical_value(&self, confidence_level: f64) -> f64 {
        let tail = (1.0 - confidence_level) / 2.0;
        match self.t_distribution() {
            Some(dist) => t_upper_quantile(&dist, tail),
            None => normal_quantile(1.0 - tail),
        }
    }

    /// Two-sided tail probability of `|statistic|`, capped at 1.
    pub fn two_sided_p(&self, statistic: f64) -> f64 {
        let t = statistic.abs();
        let tail = match self.t_distribution() {
            Some(dist) => dist.sf(t),
            None => normal_sf(t),
        };
        (2.0 * tail).min(1.0)
    }

    /// The t distribution to evaluate, or `None` when the normal applies.
    fn t_distribution(&self) -> Option<StudentsT> {
        match self {
            ReferenceDistribution::StudentT { df } if *df <= NORMAL_APPROX_DF => {
                StudentsT::new(0.0, 1.0, *df).ok()
            }
            _ => None,
        }
    }
}

/// `t` with `P(T >= t) = tail`, for `0 < tail < 0.5`.
fn t_upper_quantile(dist: &StudentsT, tail: f64) -> f64 {
    // t quantiles sit above the matching normal quantile.
    let mut lo = normal_quantile(1.0 - tail).max(0.0);
    let mut hi = (2.0 * lo).max(1.0);
    for _ in 0..1100 {
        if dist.sf(hi) <= tail {
            break;
        }
        lo = hi;
        hi *= 2.0;
    }
    for _ in 0..200 {
        let mid = 0.5 * (lo + hi);
        if dist.sf(mid) > tail {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo <= 1e-13 * hi {
            break;
        }
    }
    0.5 * (lo + hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_quantile_accuracy() {
        assert!(normal_quantile(0.5).abs() < 1e-12, "probit(0.5) should be 0");
        assert!(
            (normal_quantile(0.975) - 1.959963984540054).abs() < 1e-9,
            "probit(0.975) should be ~1.96"
        );
        assert!(
            (normal_quantile(0.995) - 2.5758293035489).abs() < 1e-9,
            "probit(0.995) should be ~2.576"
        );
        assert!(
            (normal_quantile(0.025) + 1.959963984540054).abs() < 1e-9,
            "probit(0.025) should be ~-1.96"
        );
        assert_eq!(normal_quantile(0.0), f64::NEG_INFINITY);
        assert_eq!(normal_quantile(1.0), f64::INFINITY);
    }

    #[test]
    fn test_normal_cdf_round_trip() {
        for &p in &[0.001, 0.05, 0.3, 0.5, 0.8, 0.999] {
            let z = normal_quantile(p);
            assert!((normal_cdf(z) - p).abs() < 1e-10, "cdf(probit({})) drifted", p);
        }
    }

    #[test]
    fn test_chi_squared_reference_point() {
        // χ²₁ = 3.841 corresponds to p = 0.05.
        let p = chi_squared_sf(3.841458820694124, 1);
        assert!((p - 0.05).abs() < 1e-9, "got {}", p);
        assert_eq!(chi_squared_sf(0.0, 1), 1.0);
    }

    #[test]
    fn test_chi_squared_df1_matches_statrs() {
        let dist = ChiSquared::new(1.0).unwrap();
        for &x in &[0.1, 1.0, 2.5, 6.0] {
            assert!((chi_squared_sf(x, 1) - dist.sf(x)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_student_t_wider_than_normal() {
        let t = ReferenceDistribution::student_t(5.0).critical_value(0.95);
        let z = ReferenceDistribution::Normal.critical_value(0.95);
        assert!(t > z);
        assert!((t - 2.570581835636314).abs() < 1e-4, "t_0.975(5) = {}", t);
    }

    #[test]
    fn test_student_t_converges_to_normal() {
        let z = ReferenceDistribution::Normal;
        for &df in &[1e4, 1e5, 2e5, 1e7, 1e9, 1e15] {
            let t = ReferenceDistribution::student_t(df);
            let crit = t.critical_value(0.95);
            assert!(crit >= z.critical_value(0.95) - 1e-12, "df {}: {}", df, crit);
            assert!((crit - z.critical_value(0.95)).abs() < 3e-4, "df {}: {}", df, crit);
            assert!((t.two_sided_p(2.0) - z.two_sided_p(2.0)).abs() < 1e-4);
        }
    }

    #[test]
    fn test_critical_value_matches_tail_probability() {
        for &df in &[1.5, 3.0, 12.7, 250.0, 9e4] {
            let t = ReferenceDistribution::student_t(df);
            for &cl in &[0.8, 0.95, 0.999] {
                let crit = t.critical_value(cl);
                assert!(
                    (t.two_sided_p(crit) - (1.0 - cl)).abs() < 1e-9,
                    "df {} cl {}: p at crit = {}",
                    df,
                    cl,
                    t.two_sided_p(crit)
                );
            }
        }
    }

    #[test]
    fn test_two_sided_p_at_zero_is_one() {
        assert_eq!(ReferenceDistribution::Normal.two_sided_p(0.0), 1.0);
        assert!((ReferenceDistribution::student_t(10.0).two_sided_p(0.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_df_collapses_to_normal() {
        assert_eq!(
            ReferenceDistribution::student_t(f64::INFINITY),
            ReferenceDistribution::Normal
        );
        assert_eq!(ReferenceDistribution::student_t(0.0), ReferenceDistribution::Normal);
    }
}
