//! Per-record means and their max/mean/min summary.

use std::fmt;

/// Arithmetic mean of one record's elements.
///
/// Accumulates in f64 so long records don't lose precision, then narrows
/// back to the record's element type.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let sum: f64 = values.iter().map(|&v| f64::from(v)).sum();
    (sum / values.len() as f64) as f32
}

/// Max, mean and min over a pass's per-record means.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    /// Largest per-record mean
    pub max: f32,
    /// Mean of the per-record means
    pub mean: f32,
    /// Smallest per-record mean
    pub min: f32,
}

impl Summary {
    /// Summarizes a sequence of per-record means.
    pub fn from_means(means: &[f32]) -> Self {
        let max = means.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let min = means.iter().copied().fold(f32::INFINITY, f32::min);
        if means.is_empty() {
            return Self { max: 0.0, mean: 0.0, min: 0.0 };
        }
        Self { max, mean: mean(means), min }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.max, self.mean, self.min)
    }
}
