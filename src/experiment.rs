//! `Experiment` entry point and builder.

use crate::analysis::{self, RatioMethod};
use crate::config::Config;
use crate::error::Result;
use crate::health;
use crate::power::{self, Baseline};
use crate::result::{
    ConversionResult, CupedResult, EffectResult, PowerResult, RatioResult, SrmResult,
};
use crate::types::RatioGroup;

/// Main entry point for analysing an experiment with shared settings.
///
/// Every method forwards to the corresponding free function with the values
/// held in [`Config`]; results are identical to calling those functions
/// directly with the same arguments.
///
/// # Example
///
/// ```
/// use abstat::{Baseline, Experiment};
///
/// let experiment = Experiment::new().confidence_level(0.9).seed(42);
///
/// let srm = experiment.srm_check(5030, 4970).unwrap();
/// assert!(!srm.mismatch);
///
/// let control = [12.0, 15.0, 11.0, 14.0, 13.0];
/// let treatment = [16.0, 18.0, 15.0, 17.0, 19.0];
/// let effect = experiment.mean_effect(&control, &treatment).unwrap();
/// assert_eq!(effect.confidence_level, 0.9);
///
/// let plan = experiment
///     .required_sample_size(Baseline::Proportion { rate: 0.1 }, 0.01)
///     .unwrap();
/// assert!(plan.required_n_per_group().unwrap() > 10_000);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Experiment {
    config: Config,
}

impl Experiment {
    /// Create with default configuration.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Create from an existing configuration.
    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    /// Set the confidence level for intervals.
    pub fn confidence_level(mut self, level: f64) -> Self {
        self.config = self.config.confidence_level(level);
        self
    }

    /// Set the bootstrap seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config = self.config.seed(seed);
        self
    }

    /// Set bootstrap replicates for ratio metrics.
    pub fn bootstrap_resamples(mut self, n: usize) -> Self {
        self.config = self.config.bootstrap_resamples(n);
        self
    }

    /// Set the intended traffic split.
    pub fn expected_split(mut self, a: f64, b: f64) -> Self {
        self.config = self.config.expected_split(a, b);
        self
    }

    /// Get the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Difference of means; see [`analysis::mean_effect`].
    pub fn mean_effect(&self, a: &[f64], b: &[f64]) -> Result<EffectResult> {
        analysis::mean_effect_with_threshold(
            a,
            b,
            self.config.confidence_level,
            self.config.large_sample_threshold,
        )
    }

    /// Difference of conversion rates; see [`analysis::conversion_effect_with`].
    pub fn conversion_effect(&self, a: &[f64], b: &[f64]) -> Result<ConversionResult> {
        analysis::conversion_effect_with(
            a,
            b,
            self.config.confidence_level,
            self.config.conversion_interval,
        )
    }

    /// Difference of conversion rates for boolean outcomes.
    pub fn conversion_effect_bools(&self, a: &[bool], b: &[bool]) -> Result<ConversionResult> {
        analysis::conversion_effect_bools(
            a,
            b,
            self.config.confidence_level,
            self.config.conversion_interval,
        )
    }

    /// Ratio effect with an explicit method; see [`analysis::ratio_effect`].
    pub fn ratio_effect(
        &self,
        a: &RatioGroup,
        b: &RatioGroup,
        method: RatioMethod,
    ) -> Result<RatioResult> {
        analysis::ratio_effect(a, b, method, self.config.confidence_level)
    }

    /// Ratio effect by bootstrap with the configured replicate count and seed.
    pub fn ratio_effect_bootstrap(&self, a: &RatioGroup, b: &RatioGroup) -> Result<RatioResult> {
        self.ratio_effect(a, b, self.config.bootstrap_method())
    }

    /// Sample ratio mismatch against the configured split and level.
    pub fn srm_check(&self, count_a: u64, count_b: u64) -> Result<SrmResult> {
        health::srm_check_with_alpha(
            count_a,
            count_b,
            self.config.expected_split,
            self.config.srm_alpha,
        )
    }

    /// Users per group for the configured alpha and power.
    pub fn required_sample_size(
        &self,
        baseline: Baseline,
        min_detectable_effect: f64,
    ) -> Result<PowerResult> {
        power::required_sample_size(
            baseline,
            min_detectable_effect,
            self.config.alpha,
            self.config.power,
            self.config.proportion_variance,
        )
    }

    /// Power at `n_per_group` users per group for the configured alpha.
    pub fn achieved_power(
        &self,
        n_per_group: u64,
        baseline: Baseline,
        effect: f64,
    ) -> Result<PowerResult> {
        power::achieved_power(
            n_per_group,
            baseline,
            effect,
            self.config.alpha,
            self.config.proportion_variance,
        )
    }

    /// Smallest detectable mean difference at `n_per_group` users per group.
    pub fn minimum_detectable_effect(&self, n_per_group: u64, std_dev: f64) -> Result<f64> {
        power::minimum_detectable_effect(n_per_group, std_dev, self.config.alpha, self.config.power)
    }

    /// CUPED-adjusted mean effect with the configured theta estimation.
    pub fn cuped_effect(
        &self,
        metric_a: &[f64],
        metric_b: &[f64],
        covariate_a: &[f64],
        covariate_b: &[f64],
    ) -> Result<CupedResult> {
        analysis::cuped::cuped_effect_with_threshold(
            metric_a,
            metric_b,
            covariate_a,
            covariate_b,
            self.config.confidence_level,
            self.config.theta_estimation,
            self.config.large_sample_threshold,
        )
    }
}
