//! Configuration for experiment analysis.
//!
//! A [`Config`] holds the defaults an [`Experiment`](crate::Experiment)
//! applies to every analysis: confidence level, planning targets, the
//! intended traffic split, bootstrap settings and method choices.

use crate::analysis::{ConversionInterval, RatioMethod, ThetaEstimation};
use crate::constants::{
    DEFAULT_ALPHA, DEFAULT_BOOTSTRAP_RESAMPLES, DEFAULT_CONFIDENCE_LEVEL, DEFAULT_POWER,
    DEFAULT_SEED, DEFAULT_SPLIT, DEFAULT_SRM_ALPHA, SPLIT_TOLERANCE,
};
use crate::error::{check_alpha, check_confidence_level, Error, Result};
use crate::power::ProportionVariance;

/// Configuration options for [`Experiment`](crate::Experiment).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    // =========================================================================
    // Inference
    // =========================================================================
    /// Confidence level for every interval. Default: 0.95.
    pub confidence_level: f64,

    /// Both groups at or above this many observations switch mean effects
    /// from Student t to the normal reference.
    ///
    /// Default: None (always Student t with Welch–Satterthwaite df).
    pub large_sample_threshold: Option<usize>,

    /// Interval construction for conversion metrics. Default: Wald.
    pub conversion_interval: ConversionInterval,

    /// Population CUPED theta is estimated on. Default: pooled.
    pub theta_estimation: ThetaEstimation,

    // =========================================================================
    // Bootstrap
    // =========================================================================
    /// Replicates for bootstrap ratio intervals. Default: 2,000.
    pub bootstrap_resamples: usize,

    /// Base seed for bootstrap streams. Default: [`DEFAULT_SEED`].
    pub seed: u64,

    // =========================================================================
    // Planning
    // =========================================================================
    /// Two-sided significance level for power planning. Default: 0.05.
    pub alpha: f64,

    /// Target power for sample-size planning. Default: 0.8.
    pub power: f64,

    /// Variance assumption for proportion planning. Default: unpooled.
    pub proportion_variance: ProportionVariance,

    // =========================================================================
    // Health
    // =========================================================================
    /// Intended fraction of traffic in (A, B). Default: (0.5, 0.5).
    pub expected_split: (f64, f64),

    /// Significance level for flagging a sample ratio mismatch. Default: 0.001.
    pub srm_alpha: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
            large_sample_threshold: None,
            conversion_interval: ConversionInterval::Wald,
            theta_estimation: ThetaEstimation::Pooled,

            bootstrap_resamples: DEFAULT_BOOTSTRAP_RESAMPLES,
            seed: DEFAULT_SEED,

            alpha: DEFAULT_ALPHA,
            power: DEFAULT_POWER,
            proportion_variance: ProportionVariance::Unpooled,

            expected_split: DEFAULT_SPLIT,
            srm_alpha: DEFAULT_SRM_ALPHA,
        }
    }
}

impl Config {
    /// Create a new configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Conservative settings for decision-grade reports:
    /// - 99% confidence intervals
    /// - 10,000 bootstrap replicates
    /// - Newcombe–Wilson conversion intervals
    pub fn strict() -> Self {
        Self {
            confidence_level: 0.99,
            bootstrap_resamples: 10_000,
            conversion_interval: ConversionInterval::NewcombeWilson,
            ..Default::default()
        }
    }

    /// Fast settings for exploratory dashboards:
    /// - 500 bootstrap replicates
    /// - normal reference once both groups reach 5,000 users
    pub fn quick() -> Self {
        Self {
            bootstrap_resamples: 500,
            large_sample_threshold: Some(5_000),
            ..Default::default()
        }
    }

    // =========================================================================
    // Builder methods
    // =========================================================================

    /// Set the confidence level.
    pub fn confidence_level(mut self, level: f64) -> Self {
        assert!(level > 0.0 && level < 1.0, "confidence_level must be in (0, 1)");
        self.confidence_level = level;
        self
    }

    /// Set the large-sample threshold for the normal reference.
    pub fn large_sample_threshold(mut self, threshold: usize) -> Self {
        assert!(threshold > 0, "large_sample_threshold must be positive");
        self.large_sample_threshold = Some(threshold);
        self
    }

    /// Set the conversion interval construction.
    pub fn conversion_interval(mut self, interval: ConversionInterval) -> Self {
        self.conversion_interval = interval;
        self
    }

    /// Set the CUPED theta estimation population.
    pub fn theta_estimation(mut self, estimation: ThetaEstimation) -> Self {
        self.theta_estimation = estimation;
        self
    }

    /// Set the number of bootstrap replicates.
    pub fn bootstrap_resamples(mut self, resamples: usize) -> Self {
        assert!(resamples > 0, "bootstrap_resamples must be positive");
        self.bootstrap_resamples = resamples;
        self
    }

    /// Set the bootstrap seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the planning significance level.
    pub fn alpha(mut self, alpha: f64) -> Self {
        assert!(alpha > 0.0 && alpha < 1.0, "alpha must be in (0, 1)");
        self.alpha = alpha;
        self
    }

    /// Set the planning target power.
    pub fn power(mut self, power: f64) -> Self {
        assert!(power > 0.0 && power < 1.0, "power must be in (0, 1)");
        self.power = power;
        self
    }

    /// Set the proportion variance assumption for planning.
    pub fn proportion_variance(mut self, variance: ProportionVariance) -> Self {
        self.proportion_variance = variance;
        self
    }

    /// Set the intended traffic split.
    pub fn expected_split(mut self, a: f64, b: f64) -> Self {
        assert!(a > 0.0 && b > 0.0, "expected split fractions must be positive");
        assert!(
            (a + b - 1.0).abs() <= SPLIT_TOLERANCE,
            "expected split must sum to 1.0"
        );
        self.expected_split = (a, b);
        self
    }

    /// Set the significance level for SRM flagging.
    pub fn srm_alpha(mut self, alpha: f64) -> Self {
        assert!(alpha > 0.0 && alpha < 1.0, "srm_alpha must be in (0, 1)");
        self.srm_alpha = alpha;
        self
    }

    /// Bootstrap method carrying this configuration's replicate count and seed.
    pub fn bootstrap_method(&self) -> RatioMethod {
        RatioMethod::bootstrap(self.bootstrap_resamples, self.seed)
    }

    /// Check if the configuration is valid.
    ///
    /// Builder methods panic on impossible values; this catches the same
    /// problems in a struct built or edited field by field.
    pub fn validate(&self) -> Result<()> {
        check_confidence_level(self.confidence_level)?;
        check_alpha(self.alpha)?;
        check_alpha(self.srm_alpha)?;
        if !(self.power > 0.0 && self.power < 1.0) {
            return Err(Error::PowerOutOfRange { value: self.power });
        }
        if self.bootstrap_resamples == 0 {
            return Err(Error::TooFewResamples { requested: 0 });
        }
        let (a, b) = self.expected_split;
        if !(a.is_finite() && b.is_finite() && a > 0.0 && b > 0.0) {
            return Err(Error::InvalidSplit { a, b });
        }
        if (a + b - 1.0).abs() > SPLIT_TOLERANCE {
            return Err(Error::SplitNotNormalized { sum: a + b });
        }
        Ok(())
    }
}
