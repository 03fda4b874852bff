//! Error type for invalid inputs.
//!
//! Every variant is a caller error: the call is rejected before any result
//! is built. Legitimate-but-degenerate data (zero variance, constant
//! covariate) is not an error; those cases produce fallback values and a
//! [`Warning`](crate::result::Warning) on the result instead.

use crate::types::Group;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Precondition violated by a call.
///
/// Messages name the violated precondition and, where relevant, the arm and
/// the offending value, so the caller can correct the call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// A sample has no observations.
    #[error("group {group}: sample must contain at least 1 observation")]
    EmptySample {
        /// Offending arm.
        group: Group,
    },

    /// A sample contains NaN or infinity.
    #[error("group {group}: value at index {index} is not finite ({value})")]
    NonFinite {
        /// Offending arm.
        group: Group,
        /// Position of the value.
        index: usize,
        /// The value itself.
        value: f64,
    },

    /// A conversion sample contains something other than 0 or 1.
    #[error("group {group}: conversion value at index {index} must be 0 or 1, got {value}")]
    NonBinary {
        /// Offending arm.
        group: Group,
        /// Position of the value.
        index: usize,
        /// The value itself.
        value: f64,
    },

    /// Two index-aligned sequences differ in length.
    #[error("group {group}: {what} must have the same length ({left} vs {right})")]
    LengthMismatch {
        /// Offending arm.
        group: Group,
        /// Which sequences were compared.
        what: &'static str,
        /// Length of the first sequence.
        left: usize,
        /// Length of the second sequence.
        right: usize,
    },

    /// Aggregate denominator of a ratio metric is zero or negative.
    #[error("group {group}: total denominator must be > 0, got {sum}")]
    NonPositiveDenominator {
        /// Offending arm.
        group: Group,
        /// Sum of the denominators.
        sum: f64,
    },

    /// A bootstrap replicate drew only zero denominators.
    #[error(
        "group {group}: bootstrap replicate {replicate} drew a total denominator of 0; \
         too many per-user zero denominators for resampling"
    )]
    DegenerateResample {
        /// Offending arm.
        group: Group,
        /// Replicate index.
        replicate: usize,
    },

    /// Confidence level outside (0, 1).
    #[error("confidence_level must be in (0, 1), got {value}")]
    ConfidenceLevelOutOfRange {
        /// The rejected value.
        value: f64,
    },

    /// Significance level outside (0, 1).
    #[error("alpha must be in (0, 1), got {value}")]
    AlphaOutOfRange {
        /// The rejected value.
        value: f64,
    },

    /// Target power outside (0, 1).
    #[error("power must be in (0, 1), got {value}")]
    PowerOutOfRange {
        /// The rejected value.
        value: f64,
    },

    /// Sample size per group is zero.
    #[error("n_per_group must be positive")]
    NonPositiveSampleSize,

    /// Effect magnitude is zero or not finite where a positive one is needed.
    #[error("minimum detectable effect must be a non-zero finite value, got {value}")]
    NonPositiveEffect {
        /// The rejected value.
        value: f64,
    },

    /// Standard deviation is not strictly positive.
    #[error("standard_deviation must be positive, got {value}")]
    NonPositiveStdDev {
        /// The rejected value.
        value: f64,
    },

    /// A rate that must lie strictly inside (0, 1) does not.
    #[error("{name} must be in (0, 1), got {value}")]
    RateOutOfRange {
        /// Which rate.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A split fraction is non-positive or not finite.
    #[error("expected split fractions must be positive, got ({a}, {b})")]
    InvalidSplit {
        /// Fraction for arm A.
        a: f64,
        /// Fraction for arm B.
        b: f64,
    },

    /// Split fractions do not sum to one.
    #[error("expected split must sum to 1.0, got {sum}")]
    SplitNotNormalized {
        /// Actual sum.
        sum: f64,
    },

    /// Both observed counts are zero.
    #[error("total count must be > 0")]
    ZeroTotalCount,

    /// The two counts do not fit in a `u64` total.
    #[error("total of counts {count_a} + {count_b} overflows u64")]
    CountOverflow {
        /// Control count.
        count_a: u64,
        /// Treatment count.
        count_b: u64,
    },

    /// Bootstrap was asked for zero resamples.
    #[error("n_resamples must be at least 1, got {requested}")]
    TooFewResamples {
        /// The rejected value.
        requested: usize,
    },

    /// Method tag is not one of the supported methods.
    #[error("method must be either 'delta' or 'bootstrap', got '{tag}'")]
    UnknownMethod {
        /// The rejected tag.
        tag: String,
    },
}

/// Reject a confidence level outside the open interval (0, 1).
pub(crate) fn check_confidence_level(value: f64) -> Result<()> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(Error::ConfidenceLevelOutOfRange { value })
    }
}

/// Reject a significance level outside the open interval (0, 1).
pub(crate) fn check_alpha(value: f64) -> Result<()> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(Error::AlphaOutOfRange { value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_group_and_value() {
        let err = Error::NonBinary {
            group: Group::B,
            index: 3,
            value: 2.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("group B"));
        assert!(msg.contains("index 3"));
        assert!(msg.contains("got 2"));
    }

    #[test]
    fn test_range_checks() {
        assert!(check_confidence_level(0.95).is_ok());
        assert!(check_confidence_level(0.0).is_err());
        assert!(check_confidence_level(1.0).is_err());
        assert!(check_confidence_level(f64::NAN).is_err());
        assert!(check_alpha(0.05).is_ok());
        assert_eq!(
            check_alpha(1.5),
            Err(Error::AlphaOutOfRange { value: 1.5 })
        );
    }
}
