//! Common input types.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Experiment arm identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Group {
    /// Control arm.
    A,
    /// Treatment arm.
    B,
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Group::A => write!(f, "A"),
            Group::B => write!(f, "B"),
        }
    }
}

/// Per-user numerator/denominator contributions for one arm of a ratio metric.
///
/// The group ratio is `sum(numerators) / sum(denominators)`. Individual
/// denominators may be zero (e.g. revenue per booking for users without a
/// booking); only the aggregate must be positive.
///
/// # Example
///
/// ```
/// use abstat::{Group, RatioGroup};
///
/// // Revenue per visitor: one visitor per row.
/// let arm = RatioGroup::new(Group::A, vec![0.0, 120.0, 0.0], vec![1.0, 1.0, 1.0]).unwrap();
/// assert_eq!(arm.len(), 3);
/// assert!((arm.ratio() - 40.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RatioGroup {
    group: Group,
    numerators: Vec<f64>,
    denominators: Vec<f64>,
    numerator_sum: f64,
    denominator_sum: f64,
}

impl RatioGroup {
    /// Validate and build a ratio group.
    ///
    /// Fails if the vectors are empty, differ in length, contain non-finite
    /// values, or the denominators do not sum to a positive value.
    pub fn new(group: Group, numerators: Vec<f64>, denominators: Vec<f64>) -> Result<Self> {
        if numerators.len() != denominators.len() {
            return Err(Error::LengthMismatch {
                group,
                what: "numerators and denominators",
                left: numerators.len(),
                right: denominators.len(),
            });
        }
        crate::statistics::check_sample(group, &numerators)?;
        crate::statistics::check_sample(group, &denominators)?;

        let numerator_sum: f64 = numerators.iter().sum();
        let denominator_sum: f64 = denominators.iter().sum();
        if denominator_sum <= 0.0 {
            return Err(Error::NonPositiveDenominator {
                group,
                sum: denominator_sum,
            });
        }

        Ok(Self {
            group,
            numerators,
            denominators,
            numerator_sum,
            denominator_sum,
        })
    }

    /// Which arm this group belongs to.
    pub fn group(&self) -> Group {
        self.group
    }

    /// Number of users.
    pub fn len(&self) -> usize {
        self.numerators.len()
    }

    /// Always false: construction rejects empty groups.
    pub fn is_empty(&self) -> bool {
        self.numerators.is_empty()
    }

    /// Per-user numerators.
    pub fn numerators(&self) -> &[f64] {
        &self.numerators
    }

    /// Per-user denominators.
    pub fn denominators(&self) -> &[f64] {
        &self.denominators
    }

    /// Ratio of totals.
    pub fn ratio(&self) -> f64 {
        self.numerator_sum / self.denominator_sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_of_totals() {
        let g = RatioGroup::new(Group::B, vec![10.0, 0.0, 5.0], vec![2.0, 0.0, 1.0]).unwrap();
        assert!((g.ratio() - 5.0).abs() < 1e-12);
        assert_eq!(g.group(), Group::B);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = RatioGroup::new(Group::A, vec![1.0, 2.0], vec![1.0]).unwrap_err();
        assert!(matches!(
            err,
            Error::LengthMismatch {
                group: Group::A,
                left: 2,
                right: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_zero_aggregate_denominator_rejected() {
        let err = RatioGroup::new(Group::B, vec![1.0, 2.0], vec![0.0, 0.0]).unwrap_err();
        assert_eq!(
            err,
            Error::NonPositiveDenominator {
                group: Group::B,
                sum: 0.0
            }
        );
    }

    #[test]
    fn test_negative_aggregate_denominator_rejected() {
        let err = RatioGroup::new(Group::A, vec![1.0, 2.0], vec![-1.0, -2.0]).unwrap_err();
        assert_eq!(
            err,
            Error::NonPositiveDenominator {
                group: Group::A,
                sum: -3.0
            }
        );
        // Individual negative entries are fine while the total stays positive.
        assert!(RatioGroup::new(Group::A, vec![1.0, 2.0], vec![-1.0, 3.0]).is_ok());
    }

    #[test]
    fn test_empty_rejected() {
        let err = RatioGroup::new(Group::A, vec![], vec![]).unwrap_err();
        assert_eq!(err, Error::EmptySample { group: Group::A });
    }

    #[test]
    fn test_group_display() {
        assert_eq!(Group::A.to_string(), "A");
        assert_eq!(Group::B.to_string(), "B");
    }
}
