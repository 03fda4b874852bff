//! Empirical quantiles of bootstrap replicates.
//!
//! Percentile intervals use the Type 2 definition (inverse empirical CDF,
//! averaging at discontinuities):
//!
//! ```text
//! h = n * p + 0.5
//! q = (x[floor(h)] + x[ceil(h)]) / 2
//! ```
//!
//! See Hyndman & Fan (1996), "Sample quantiles in statistical packages".

/// Type 2 quantile of already-sorted data.
///
/// # Panics
///
/// Panics if `sorted` is empty or if `p` is outside [0, 1].
pub fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    assert!(!sorted.is_empty(), "Cannot compute quantile of empty slice");
    assert!(
        (0.0..=1.0).contains(&p),
        "Quantile probability must be in [0, 1]"
    );

    let (floor_idx, ceil_idx) = type2_indices(sorted.len(), p);
    (sorted[floor_idx] + sorted[ceil_idx]) / 2.0
}

/// Central percentile interval at `confidence_level`.
///
/// Returns the Type 2 quantiles at `alpha/2` and `1 - alpha/2` where
/// `alpha = 1 - confidence_level`. Sorts a copy of `data` once.
///
/// # Panics
///
/// Panics if `data` is empty.
pub fn percentile_interval(data: &[f64], confidence_level: f64) -> (f64, f64) {
    let mut sorted = data.to_vec();
    sorted.sort_unstable_by(|a, b| a.total_cmp(b));

    let alpha = 1.0 - confidence_level;
    let low = quantile_sorted(&sorted, alpha / 2.0);
    let high = quantile_sorted(&sorted, 1.0 - alpha / 2.0);
    (low, high)
}

/// 0-based (floor, ceil) order-statistic indices for Type 2 at probability `p`.
fn type2_indices(n: usize, p: f64) -> (usize, usize) {
    let h = n as f64 * p + 0.5;
    let floor_idx = (h.floor() as usize).saturating_sub(1).min(n - 1);
    let ceil_idx = (h.ceil() as usize).saturating_sub(1).min(n - 1);
    (floor_idx, ceil_idx)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn replicates(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
        prop::collection::vec(-1e6f64..1e6, 1..=max_len)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Interval bounds stay ordered and inside the data range.
        #[test]
        fn prop_interval_ordered(data in replicates(500), cl in 0.5f64..0.999) {
            let (low, high) = percentile_interval(&data, cl);
            let min = data.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = data.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            prop_assert!(low <= high);
            prop_assert!(low >= min && high <= max);
        }

        /// A wider level never gives a narrower interval.
        #[test]
        fn prop_interval_nested(data in replicates(300), cl in 0.5f64..0.9) {
            let (low, high) = percentile_interval(&data, cl);
            let (wide_low, wide_high) = percentile_interval(&data, cl + 0.09);
            prop_assert!(wide_low <= low && high <= wide_high);
        }
    }
}
