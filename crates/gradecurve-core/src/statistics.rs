//! Batch statistics over score sets.
//!
//! Mean and standard deviation are population statistics: squared deviations
//! are divided by `n`, not `n - 1`.

use serde::{Deserialize, Serialize};

/// Percent of the ranked set placed in bands A, B, C, and D. F takes the rest.
pub const BAND_PERCENTAGES: [usize; 4] = [10, 20, 40, 20];

/// Arithmetic mean. Returns `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation around a precomputed mean.
pub fn population_std_dev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Whether a set of scores has no spread at all.
///
/// True when every value is identical or the computed deviation is exactly
/// zero. Summing identical values can leave rounding noise in the mean, so the
/// identity check comes first.
pub fn is_degenerate(values: &[f64], std_dev: f64) -> bool {
    let all_equal = values.windows(2).all(|w| w[0] == w[1]);
    all_equal || std_dev == 0.0
}

/// Number of records in bands A, B, C, D, and F for a set of `n` records.
///
/// Each of A-D gets a truncated share of `n`; F gets whatever is left.
pub fn band_sizes(n: usize) -> [usize; 5] {
    let mut sizes = [0usize; 5];
    let mut assigned = 0;
    for (slot, pct) in sizes.iter_mut().zip(BAND_PERCENTAGES) {
        *slot = n * pct / 100;
        assigned += *slot;
    }
    sizes[4] = n - assigned;
    sizes
}

/// Summary statistics for one batch of scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreStats {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl ScoreStats {
    /// Compute statistics for a batch. Returns `None` for an empty batch.
    pub fn compute(values: &[f64]) -> Option<Self> {
        let mean = mean(values)?;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(Self {
            count: values.len(),
            mean,
            std_dev: population_std_dev(values, mean),
            min,
            max,
        })
    }
}
