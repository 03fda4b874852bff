//! Streaming summary statistics using Welford's algorithm.
//!
//! `OnlineStats` tracks mean and variance of one sequence; `OnlineCovariance`
//! tracks means, variances and the cross-moment of paired sequences (ratio
//! numerator/denominator, CUPED metric/covariate). Both are single-pass,
//! numerically stable, and mergeable with Chan's parallel update so per-arm
//! accumulators can be pooled without revisiting the data.

use crate::error::{Error, Result};
use crate::types::Group;

/// Reject an empty sample or one containing NaN/infinity.
pub fn check_sample(group: Group, data: &[f64]) -> Result<()> {
    if data.is_empty() {
        return Err(Error::EmptySample { group });
    }
    if let Some((index, &value)) = data.iter().enumerate().find(|(_, x)| !x.is_finite()) {
        return Err(Error::NonFinite {
            group,
            index,
            value,
        });
    }
    Ok(())
}

/// Online mean/variance accumulator.
///
/// # Example
///
/// ```
/// use abstat::statistics::OnlineStats;
///
/// let stats = OnlineStats::from_slice(&[1.0, 2.0, 3.0, 4.0, 5.0]);
/// let snapshot = stats.finalize();
/// assert!((snapshot.mean - 3.0).abs() < 1e-10);
/// assert!((snapshot.variance - 2.5).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Default)]
pub struct OnlineStats {
    count: usize,
    mean: f64,
    /// Sum of squared deviations from the current mean.
    m2: f64,
}

impl OnlineStats {
    /// Create a new empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate every value of a slice.
    pub fn from_slice(data: &[f64]) -> Self {
        let mut stats = Self::new();
        for &x in data {
            stats.update(x);
        }
        stats
    }

    /// Update statistics with a new sample.
    pub fn update(&mut self, x: f64) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        let delta2 = x - self.mean;
        self.m2 += delta * delta2;
    }

    /// Number of samples seen.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Current mean estimate.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Unbiased sample variance (n-1 denominator); 0 if fewer than 2 samples.
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// Finalize into a plain snapshot.
    pub fn finalize(&self) -> StatsSnapshot {
        StatsSnapshot {
            mean: self.mean,
            variance: self.variance(),
            count: self.count,
        }
    }
}

/// Snapshot of computed statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsSnapshot {
    /// Sample mean.
    pub mean: f64,
    /// Sample variance (using n-1 denominator).
    pub variance: f64,
    /// Number of samples.
    pub count: usize,
}

/// Online accumulator for paired observations `(x, y)`.
///
/// Algorithm per pair:
/// ```text
/// δx = x - μx ; μx += δx/n
/// δy = y - μy ; μy += δy/n
/// Mxx += δx·(x - μx)
/// Myy += δy·(y - μy)
/// Mxy += δx·(y - μy)
/// ```
#[derive(Debug, Clone, Default)]
pub struct OnlineCovariance {
    count: usize,
    mean_x: f64,
    mean_y: f64,
    m2_x: f64,
    m2_y: f64,
    c_xy: f64,
}

impl OnlineCovariance {
    /// Create a new empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate index-aligned slices. Extra elements of the longer slice
    /// are ignored; callers check lengths first.
    pub fn from_pairs(xs: &[f64], ys: &[f64]) -> Self {
        let mut acc = Self::new();
        for (&x, &y) in xs.iter().zip(ys) {
            acc.update(x, y);
        }
        acc
    }

    /// Update with one pair.
    pub fn update(&mut self, x: f64, y: f64) {
        self.count += 1;
        let n = self.count as f64;

        let dx = x - self.mean_x;
        self.mean_x += dx / n;
        let dy = y - self.mean_y;
        self.mean_y += dy / n;

        self.m2_x += dx * (x - self.mean_x);
        self.m2_y += dy * (y - self.mean_y);
        self.c_xy += dx * (y - self.mean_y);
    }

    /// Merge another accumulator into this one (Chan et al.).
    ///
    /// ```text
    /// n = nA + nB ; δx = μxB - μxA ; δy = μyB - μyA
    /// Mxy = MxyA + MxyB + δx·δy·nA·nB/n
    /// ```
    pub fn merge(&mut self, other: &Self) {
        if other.count == 0 {
            return;
        }
        if self.count == 0 {
            *self = other.clone();
            return;
        }

        let n_a = self.count as f64;
        let n_b = other.count as f64;
        let n_ab = n_a + n_b;
        let dx = other.mean_x - self.mean_x;
        let dy = other.mean_y - self.mean_y;
        let weight = n_a * n_b / n_ab;

        self.mean_x = (self.mean_x * n_a + other.mean_x * n_b) / n_ab;
        self.mean_y = (self.mean_y * n_a + other.mean_y * n_b) / n_ab;
        self.m2_x += other.m2_x + dx * dx * weight;
        self.m2_y += other.m2_y + dy * dy * weight;
        self.c_xy += other.c_xy + dx * dy * weight;
        self.count += other.count;
    }

    /// Number of pairs seen.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Mean of the first coordinate.
    pub fn mean_x(&self) -> f64 {
        self.mean_x
    }

    /// Mean of the second coordinate.
    pub fn mean_y(&self) -> f64 {
        self.mean_y
    }

    /// Sample variance of the first coordinate; 0 if fewer than 2 pairs.
    pub fn variance_x(&self) -> f64 {
        self.normalize(self.m2_x)
    }

    /// Sample variance of the second coordinate; 0 if fewer than 2 pairs.
    pub fn variance_y(&self) -> f64 {
        self.normalize(self.m2_y)
    }

    /// Sample covariance; 0 if fewer than 2 pairs.
    pub fn covariance(&self) -> f64 {
        self.normalize(self.c_xy)
    }

    fn normalize(&self, moment: f64) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            moment / (self.count - 1) as f64
        }
    }
}
