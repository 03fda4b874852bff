//! Nonparametric bootstrap with counter-based RNG streams.
//!
//! Replicate `i` draws from its own `Xoshiro256PlusPlus` generator seeded with
//! `counter_rng_seed(seed, i)`. A replicate never depends on the order in
//! which replicates are scheduled, so the serial loop and the rayon path
//! (`parallel` feature) produce bit-identical replicate vectors.

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::Result;

/// Derive a well-mixed per-replicate seed from a base seed and a counter.
///
/// SplitMix64 finalizer over `seed + (counter + 1) * φ`, so nearby
/// counters (and nearby base seeds) give unrelated streams.
#[inline]
pub fn counter_rng_seed(seed: u64, counter: u64) -> u64 {
    const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;
    let mut z = seed.wrapping_add(counter.wrapping_add(1).wrapping_mul(GOLDEN_GAMMA));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Generator for replicate `index` under base `seed`.
#[inline]
pub fn replicate_rng(seed: u64, index: usize) -> Xoshiro256PlusPlus {
    Xoshiro256PlusPlus::seed_from_u64(counter_rng_seed(seed, index as u64))
}

/// Evaluate `n_resamples` replicates, returning them in index order.
///
/// `replicate` receives the replicate index and that replicate's generator.
/// Any failing replicate aborts the run and its error is returned.
pub fn run_replicates<F>(n_resamples: usize, seed: u64, replicate: F) -> Result<Vec<f64>>
where
    F: Fn(usize, &mut Xoshiro256PlusPlus) -> Result<f64> + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        (0..n_resamples)
            .into_par_iter()
            .map(|i| {
                let mut rng = replicate_rng(seed, i);
                replicate(i, &mut rng)
            })
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        (0..n_resamples)
            .map(|i| {
                let mut rng = replicate_rng(seed, i);
                replicate(i, &mut rng)
            })
            .collect()
    }
}

/// Draw `numerators.len()` index pairs with replacement and return the
/// resampled `(sum(numerators), sum(denominators))`.
///
/// Index pairing is kept: the same index selects both the numerator and the
/// denominator of a user.
pub fn resample_pair_sums<R: Rng + ?Sized>(
    numerators: &[f64],
    denominators: &[f64],
    rng: &mut R,
) -> (f64, f64) {
    let n = numerators.len();
    let mut num_sum = 0.0;
    let mut den_sum = 0.0;
    for _ in 0..n {
        let idx = rng.gen_range(0..n);
        num_sum += numerators[idx];
        den_sum += denominators[idx];
    }
    (num_sum, den_sum)
}

/// Two-sided bootstrap p-value for a zero effect.
///
/// `min(1, 2 * min(frac(r <= 0), frac(r >= 0)))`; replicates exactly at zero
/// count toward both tails.
pub fn bootstrap_p_value(replicates: &[f64]) -> f64 {
    if replicates.is_empty() {
        return 1.0;
    }
    let b = replicates.len() as f64;
    let at_or_below = replicates.iter().filter(|&&r| r <= 0.0).count() as f64;
    let at_or_above = replicates.iter().filter(|&&r| r >= 0.0).count() as f64;
    (2.0 * (at_or_below / b).min(at_or_above / b)).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::Group;

    #[test]
    fn test_counter_seed_is_deterministic_and_spread() {
        assert_eq!(counter_rng_seed(42, 7), counter_rng_seed(42, 7));
        assert_ne!(counter_rng_seed(42, 7), counter_rng_seed(42, 8));
        assert_ne!(counter_rng_seed(42, 7), counter_rng_seed(43, 7));
        // Neighbouring counters should differ in many bits.
        let diff = (counter_rng_seed(0, 0) ^ counter_rng_seed(0, 1)).count_ones();
        assert!(diff > 10, "only {} bits differ", diff);
    }

    #[test]
    fn test_run_replicates_order_and_determinism() {
        let draw = |_i: usize, rng: &mut Xoshiro256PlusPlus| Ok(rng.gen::<f64>());
        let first = run_replicates(64, 123, draw).unwrap();
        let second = run_replicates(64, 123, draw).unwrap();
        assert_eq!(first, second);

        // Each replicate only depends on its own index.
        let mut rng = replicate_rng(123, 10);
        assert_eq!(first[10], rng.gen::<f64>());

        let other = run_replicates(64, 124, draw).unwrap();
        assert_ne!(first, other);
    }

    #[test]
    fn test_run_replicates_propagates_error() {
        let result = run_replicates(20, 1, |i, _rng| {
            if i >= 5 {
                Err(Error::DegenerateResample {
                    group: Group::A,
                    replicate: i,
                })
            } else {
                Ok(0.0)
            }
        });
        assert!(matches!(
            result,
            Err(Error::DegenerateResample { replicate, .. }) if replicate >= 5
        ));
    }

    #[test]
    fn test_resample_keeps_pairs() {
        // Every numerator equals twice its denominator, so any resample does too.
        let den = [1.0, 2.0, 3.0, 4.0];
        let num = [2.0, 4.0, 6.0, 8.0];
        let mut rng = replicate_rng(9, 0);
        for _ in 0..50 {
            let (n, d) = resample_pair_sums(&num, &den, &mut rng);
            assert!((n - 2.0 * d).abs() < 1e-12);
        }
    }

    #[test]
    fn test_bootstrap_p_value() {
        assert_eq!(bootstrap_p_value(&[1.0, 2.0, 3.0, 4.0]), 0.0);
        assert_eq!(bootstrap_p_value(&[-1.0, 1.0]), 1.0);
        // 1 of 4 at or below zero -> 2 * 0.25
        assert!((bootstrap_p_value(&[-1.0, 1.0, 2.0, 3.0]) - 0.5).abs() < 1e-12);
        assert_eq!(bootstrap_p_value(&[0.0, 0.0]), 1.0);
    }
}
