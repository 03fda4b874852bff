//! Default values shared across the crate.

/// Default deterministic seed for bootstrap resampling.
///
/// Same seed + same data = same result. The value `0x616273746174` is
/// "abstat" encoded in ASCII.
pub const DEFAULT_SEED: u64 = 0x616273746174;

// =============================================================================
// Default configuration constants
// =============================================================================

/// Default confidence level for intervals (95%).
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// Default two-sided significance level for planning.
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Default target power for sample-size planning.
pub const DEFAULT_POWER: f64 = 0.8;

/// Default significance level for the sample-ratio-mismatch check.
///
/// Deliberately strict: SRM is checked on every experiment, so false alarms
/// must be rare.
pub const DEFAULT_SRM_ALPHA: f64 = 0.001;

/// Default intended traffic split between control and treatment.
pub const DEFAULT_SPLIT: (f64, f64) = (0.5, 0.5);

/// Default number of bootstrap resamples for ratio metrics.
pub const DEFAULT_BOOTSTRAP_RESAMPLES: usize = 2000;

/// Below this many resamples a bootstrap interval is flagged as unstable.
pub const MIN_STABLE_RESAMPLES: usize = 100;

/// Tolerance when checking that a traffic split sums to one.
pub const SPLIT_TOLERANCE: f64 = 1e-9;

/// Above this many degrees of freedom Student's t is referred to the normal.
///
/// At 1e5 the 97.5% quantiles differ by less than 3e-5.
pub const NORMAL_APPROX_DF: f64 = 1e5;
