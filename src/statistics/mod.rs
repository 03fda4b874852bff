//! Statistical primitives shared by the estimators.
//!
//! - Welford summary moments (single sequence and paired sequences)
//! - Type 2 quantiles and percentile intervals
//! - Bootstrap resampling with counter-based RNG streams

mod bootstrap;
mod quantile;
mod summary;

pub use bootstrap::{
    bootstrap_p_value, counter_rng_seed, replicate_rng, resample_pair_sums, run_replicates,
};
pub use quantile::{percentile_interval, quantile_sorted};
pub use summary::{check_sample, OnlineCovariance, OnlineStats, StatsSnapshot};
