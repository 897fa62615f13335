//! Tukey box-plot statistics.
//!
//! Quartiles use nearest rank on the sorted sample: `sorted[floor(n * p)]`
//! for p in {0.25, 0.5, 0.75}. There is no interpolation, so outlier
//! classification is reproducible against the published charts.

use serde::{Deserialize, Serialize};

use crate::error::ChartError;

/// Fence multiplier on the inter-quartile range.
pub const FENCE_K: f64 = 1.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxStats {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub iqr: f64,
    pub lower_fence: f64,
    pub upper_fence: f64,
    pub whisker_lower: f64,
    pub whisker_upper: f64,
    /// Values strictly outside the fences, ascending.
    pub outliers: Vec<f64>,
}

impl BoxStats {
    pub fn is_outlier(&self, v: f64) -> bool {
        v < self.lower_fence || v > self.upper_fence
    }
}

fn nearest_rank(sorted: &[f64], p: f64) -> f64 {
    let idx = ((sorted.len() as f64) * p).floor() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

/// Compute box statistics over `values`. Non-finite entries are ignored.
pub fn compute_box_stats(values: &[f64]) -> Result<BoxStats, ChartError> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return Err(ChartError::EmptyInput);
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n = sorted.len();
    let min = sorted[0];
    let max = sorted[n - 1];
    let q1 = nearest_rank(&sorted, 0.25);
    let median = nearest_rank(&sorted, 0.5);
    let q3 = nearest_rank(&sorted, 0.75);

    let iqr = q3 - q1;
    let lower_fence = q1 - FENCE_K * iqr;
    let upper_fence = q3 + FENCE_K * iqr;

    let whisker_lower = sorted
        .iter()
        .copied()
        .find(|&v| v >= lower_fence)
        .unwrap_or(min);
    let whisker_upper = sorted
        .iter()
        .rev()
        .copied()
        .find(|&v| v <= upper_fence)
        .unwrap_or(max);

    let outliers = sorted
        .iter()
        .copied()
        .filter(|&v| v < lower_fence || v > upper_fence)
        .collect();

    Ok(BoxStats {
        count: n,
        min,
        q1,
        median,
        q3,
        max,
        iqr,
        lower_fence,
        upper_fence,
        whisker_lower,
        whisker_upper,
        outliers,
    })
}
