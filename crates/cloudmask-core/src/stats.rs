//! Percentile statistics over band samples.

use crate::consts::MINSIGMA;

/// Inclusive linear-interpolation percentile over integer samples.
///
/// `min` and `max` are the extrema tracked while gathering; a degenerate
/// range short-circuits to `min`, which also covers the empty-sample case
/// where both extrema have been substituted with zero. `pct` is in 0..=100.
pub fn prctile(samples: &[i16], min: i16, max: i16, pct: f32) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    if min == max {
        return min as f32;
    }

    let mut sorted = samples.to_vec();
    sorted.sort_unstable();
    let values: Vec<f32> = sorted.into_iter().map(f32::from).collect();
    interpolate(&values, pct)
}

/// [`prctile`] over float samples.
pub fn prctile2(samples: &[f32], min: f32, max: f32, pct: f32) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    if (max - min).abs() < MINSIGMA {
        return min;
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    interpolate(&sorted, pct)
}

fn interpolate(sorted: &[f32], pct: f32) -> f32 {
    let pos = (pct / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f32;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f32;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}
