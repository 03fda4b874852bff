//! # abstat
//!
//! Statistical inference for online controlled experiments (A/B tests).
//!
//! Given per-user observations from a control group (A) and a treatment
//! group (B), this crate produces:
//! - Effect estimates with confidence intervals and p-values for mean,
//!   conversion and ratio-of-sums metrics
//! - Delta-method and seeded bootstrap intervals for ratio metrics
//! - Sample ratio mismatch (SRM) checks on assignment counts
//! - Sample-size and power planning
//! - CUPED variance reduction with a pre-experiment covariate
//!
//! Every analysis is a pure function returning an immutable, serializable
//! result record. Invalid input is rejected with an [`Error`] naming the
//! violated precondition; degenerate-but-legal data (zero variance, constant
//! covariate) yields fallback values and a [`Warning`] on the result.
//!
//! ## Quick Start
//!
//! ```
//! use abstat::{mean_effect, ratio_effect, srm_check, Group, RatioGroup, RatioMethod};
//!
//! // Health first: is the 50/50 split intact?
//! let srm = srm_check(10_112, 9_888, (0.5, 0.5)).unwrap();
//! assert!(!srm.mismatch);
//!
//! // Revenue per user
//! let control = [0.0, 12.5, 0.0, 30.0, 8.0, 0.0];
//! let treatment = [5.0, 14.0, 0.0, 35.0, 9.5, 2.0];
//! let revenue = mean_effect(&control, &treatment, 0.95).unwrap();
//! println!("effect {:.2} [{:.2}, {:.2}]", revenue.effect, revenue.ci_low, revenue.ci_high);
//!
//! // Clicks per session, bootstrap with an explicit seed
//! let a = RatioGroup::new(Group::A, vec![3.0, 1.0, 4.0], vec![2.0, 1.0, 3.0]).unwrap();
//! let b = RatioGroup::new(Group::B, vec![4.0, 2.0, 5.0], vec![2.0, 1.0, 3.0]).unwrap();
//! let ctr = ratio_effect(&a, &b, RatioMethod::bootstrap(1_000, 42), 0.95).unwrap();
//! assert_eq!(ctr.n_a, 3);
//! ```
//!
//! ## Reproducibility
//!
//! The bootstrap never touches a process-wide generator. Replicate `i` is
//! drawn from a stream seeded by `(seed, i)`, so identical data, seed and
//! replicate count give bit-identical results, with or without the
//! `parallel` feature.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
mod config;
mod constants;
mod error;
mod experiment;
mod result;
mod types;

// Functional modules
pub mod analysis;
pub mod health;
pub mod math;
pub mod power;
pub mod statistics;

// Re-exports for public API
pub use analysis::{
    conversion_effect, conversion_effect_bools, conversion_effect_with, cuped_adjust, cuped_effect,
    estimate_theta, mean_effect, mean_effect_with_threshold, ratio_effect, ConversionInterval,
    RatioMethod, ThetaEstimate, ThetaEstimation,
};
pub use config::Config;
pub use constants::{
    DEFAULT_ALPHA, DEFAULT_BOOTSTRAP_RESAMPLES, DEFAULT_CONFIDENCE_LEVEL, DEFAULT_POWER,
    DEFAULT_SEED, DEFAULT_SPLIT, DEFAULT_SRM_ALPHA,
};
pub use error::{Error, Result};
pub use experiment::Experiment;
pub use health::{srm_check, srm_check_with_alpha};
pub use math::ReferenceDistribution;
pub use power::{
    achieved_power, minimum_detectable_effect, required_sample_size, Baseline, ProportionVariance,
};
pub use result::{
    ConversionResult, CupedResult, EffectResult, PowerCalculation, PowerResult, RatioResult,
    SrmResult, Warning,
};
pub use types::{Group, RatioGroup};
