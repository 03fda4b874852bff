//! Sample ratio mismatch (SRM) detection.
//!
//! Pearson chi-square goodness-of-fit of observed group sizes against the
//! intended allocation, 1 degree of freedom:
//!
//! ```text
//! chi2 = Σ (observed − expected)² / expected,   expected = total · split
//! ```

use tracing::warn;

use crate::constants::{DEFAULT_SRM_ALPHA, SPLIT_TOLERANCE};
use crate::error::{check_alpha, Error, Result};
use crate::math::chi_squared_sf;
use crate::result::SrmResult;

/// SRM check at the default significance level (0.001).
///
/// # Example
///
/// ```
/// use abstat::srm_check;
///
/// let healthy = srm_check(5000, 5000, (0.5, 0.5)).unwrap();
/// assert!(!healthy.mismatch);
///
/// let broken = srm_check(7000, 3000, (0.5, 0.5)).unwrap();
/// assert!(broken.mismatch);
/// ```
pub fn srm_check(count_a: u64, count_b: u64, expected_split: (f64, f64)) -> Result<SrmResult> {
    srm_check_with_alpha(count_a, count_b, expected_split, DEFAULT_SRM_ALPHA)
}

/// SRM check with an explicit significance level for the `mismatch` flag.
pub fn srm_check_with_alpha(
    count_a: u64,
    count_b: u64,
    expected_split: (f64, f64),
    alpha: f64,
) -> Result<SrmResult> {
    let (split_a, split_b) = expected_split;
    let valid = |f: f64| f.is_finite() && f > 0.0;
    if !valid(split_a) || !valid(split_b) {
        return Err(Error::InvalidSplit {
            a: split_a,
            b: split_b,
        });
    }
    let sum = split_a + split_b;
    if (sum - 1.0).abs() > SPLIT_TOLERANCE {
        return Err(Error::SplitNotNormalized { sum });
    }
    let total = count_a
        .checked_add(count_b)
        .ok_or(Error::CountOverflow { count_a, count_b })?;
    if total == 0 {
        return Err(Error::ZeroTotalCount);
    }
    check_alpha(alpha)?;

    let total = total as f64;
    let expected_a = total * split_a;
    let expected_b = total * split_b;
    let chi2 = (count_a as f64 - expected_a).powi(2) / expected_a
        + (count_b as f64 - expected_b).powi(2) / expected_b;
    let p_value = chi_squared_sf(chi2, 1);
    let mismatch = p_value < alpha;

    if mismatch {
        warn!(
            count_a,
            count_b,
            expected_a,
            expected_b,
            p_value,
            "sample ratio mismatch: observed allocation deviates from the intended split"
        );
    }

    Ok(SrmResult {
        observed_a: count_a,
        observed_b: count_b,
        expected_a,
        expected_b,
        chi2,
        p_value,
        degrees_of_freedom: 1,
        alpha,
        mismatch,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balanced_counts() {
        let r = srm_check(5000, 5000, (0.5, 0.5)).unwrap();
        assert_eq!(r.chi2, 0.0);
        assert_eq!(r.p_value, 1.0);
        assert_eq!((r.expected_a, r.expected_b), (5000.0, 5000.0));
        assert_eq!(r.degrees_of_freedom, 1);
        assert!(!r.mismatch);
    }

    #[test]
    fn test_gross_imbalance() {
        let r = srm_check(7000, 3000, (0.5, 0.5)).unwrap();
        assert!((r.chi2 - 1600.0).abs() < 1e-9);
        assert!(r.p_value < 1e-100);
        assert!(r.mismatch);
    }

    #[test]
    fn test_known_p_value() {
        // chi2 = 2 · 100² / 5000 = 4 -> p = P(|Z| ≥ 2)
        let r = srm_check(5100, 4900, (0.5, 0.5)).unwrap();
        assert!((r.chi2 - 4.0).abs() < 1e-9);
        assert!((r.p_value - 0.04550026389635842).abs() < 1e-9);
        assert!(!r.mismatch, "not an SRM at alpha = 0.001");
        assert!(srm_check_with_alpha(5100, 4900, (0.5, 0.5), 0.05).unwrap().mismatch);
    }

    #[test]
    fn test_uneven_split() {
        let r = srm_check(900, 100, (0.9, 0.1)).unwrap();
        assert!(r.chi2.abs() < 1e-9);
        assert!((r.p_value - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_one_empty_group_is_valid() {
        let r = srm_check(0, 40, (0.5, 0.5)).unwrap();
        assert!((r.chi2 - 40.0).abs() < 1e-9);
        assert!(r.mismatch);
    }

    #[test]
    fn test_invalid_inputs() {
        assert_eq!(srm_check(0, 0, (0.5, 0.5)), Err(Error::ZeroTotalCount));
        assert_eq!(
            srm_check(u64::MAX, 1, (0.5, 0.5)),
            Err(Error::CountOverflow {
                count_a: u64::MAX,
                count_b: 1
            })
        );
        // Largest representable total still works.
        let edge = srm_check(u64::MAX - 1, 1, (0.5, 0.5)).unwrap();
        assert!(edge.mismatch);
        assert_eq!(
            srm_check(10, 10, (0.6, 0.6)),
            Err(Error::SplitNotNormalized { sum: 1.2 })
        );
        assert_eq!(
            srm_check(10, 10, (1.0, 0.0)),
            Err(Error::InvalidSplit { a: 1.0, b: 0.0 })
        );
        assert!(matches!(
            srm_check(10, 10, (f64::NAN, 0.5)),
            Err(Error::InvalidSplit { .. })
        ));
        assert_eq!(
            srm_check_with_alpha(10, 10, (0.5, 0.5), 0.0),
            Err(Error::AlphaOutOfRange { value: 0.0 })
        );
    }
}
