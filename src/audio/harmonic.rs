//! Harmonic/percussive separation and tonal centroid (tonnetz) features.
//!
//! Harmonic content is continuous along time, percussive content along
//! frequency. Median-filtering the magnitude spectrogram in each direction
//! gives two estimates which are turned into a soft mask that keeps the
//! harmonic part.

use ndarray::{Array2, Axis};
use rayon::prelude::*;
use std::f32::consts::PI;

use super::chroma::N_CHROMA;

pub const N_TONNETZ: usize = 6;

fn median_of(window: &mut [f32]) -> f32 {
    let mid = window.len() / 2;
    let (_, median, _) = window.select_nth_unstable_by(mid, |a, b| a.total_cmp(b));
    *median
}

/// Running median of `values` over `kernel` points, edges replicated.
pub fn median_filter(values: &[f32], kernel: usize) -> Vec<f32> {
    let half = kernel / 2;
    let last = values.len() as isize - 1;
    let mut window = vec![0.0f32; kernel];
    (0..values.len())
        .map(|i| {
            for (j, slot) in window.iter_mut().enumerate() {
                let idx = (i as isize + j as isize - half as isize).clamp(0, last);
                *slot = values[idx as usize];
            }
            median_of(&mut window)
        })
        .collect()
}

/// Power spectrogram with percussive content masked out.
pub fn harmonic_power(power: &Array2<f32>, kernel: usize) -> Array2<f32> {
    let magnitude = power.mapv(f32::sqrt);

    // Smooth along time, one bin per task
    let harmonic_rows: Vec<Vec<f32>> = magnitude
        .axis_iter(Axis(0))
        .into_par_iter()
        .map(|row| median_filter(&row.to_vec(), kernel))
        .collect();
    // Smooth along frequency, one frame per task
    let percussive_cols: Vec<Vec<f32>> = magnitude
        .axis_iter(Axis(1))
        .into_par_iter()
        .map(|col| median_filter(&col.to_vec(), kernel))
        .collect();

    let mut out = Array2::<f32>::zeros(power.dim());
    for ((k, t), value) in out.indexed_iter_mut() {
        let h = harmonic_rows[k][t];
        let p = percussive_cols[t][k];
        let denom = h * h + p * p;
        if denom > f32::MIN_POSITIVE {
            let mask = h * h / denom;
            *value = power[[k, t]] * mask * mask;
        }
    }
    out
}

/// Projection of pitch classes onto the circles of fifths, minor thirds and
/// major thirds, `(dimension, pitch class)`.
pub fn tonnetz_basis() -> Array2<f32> {
    // (interval scale, radius) per circle
    let circles = [(7.0 / 6.0, 1.0f32), (3.0 / 2.0, 1.0), (2.0 / 3.0, 0.5)];
    let mut basis = Array2::<f32>::zeros((N_TONNETZ, N_CHROMA));
    for (c, &(scale, radius)) in circles.iter().enumerate() {
        for p in 0..N_CHROMA {
            let angle = PI * scale * p as f32;
            basis[[2 * c, p]] = radius * angle.sin();
            basis[[2 * c + 1, p]] = radius * angle.cos();
        }
    }
    basis
}

/// Tonal centroid `(dimension, frame)` of a chromagram. Each frame is first
/// normalized to unit sum; an empty frame projects to the origin.
pub fn tonnetz(chroma: &Array2<f32>) -> Array2<f32> {
    let mut normalized = chroma.clone();
    for mut column in normalized.columns_mut() {
        let total: f32 = column.sum();
        if total > 0.0 {
            column.mapv_inplace(|v| v / total);
        }
    }
    tonnetz_basis().dot(&normalized)
}
