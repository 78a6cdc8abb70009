//! Cepstral coefficients of the log-mel spectrogram and their first derivative.

use ndarray::Array2;
use std::f32::consts::PI;

use super::stats::{mean, std_dev};

/// Orthonormal DCT-II basis, `(coefficient, band)`.
pub fn dct_basis(n_coeffs: usize, n_bands: usize) -> Array2<f32> {
    let mut basis = Array2::<f32>::zeros((n_coeffs, n_bands));
    let n = n_bands as f32;
    for k in 0..n_coeffs {
        let norm = if k == 0 { (1.0 / n).sqrt() } else { (2.0 / n).sqrt() };
        for j in 0..n_bands {
            basis[[k, j]] = norm * (PI * k as f32 * (j as f32 + 0.5) / n).cos();
        }
    }
    basis
}

/// First `n_mfcc` cepstral coefficients of every frame of a dB mel spectrogram.
pub fn mfcc(log_mel: &Array2<f32>, n_mfcc: usize) -> Array2<f32> {
    dct_basis(n_mfcc, log_mel.nrows()).dot(log_mel)
}

/// Regression derivative along the frame axis over `2 * width + 1` frames.
///
/// Frames past either edge replicate the boundary frame, so the output has
/// the shape of the input.
pub fn delta(features: &Array2<f32>, width: usize) -> Array2<f32> {
    let (rows, frames) = features.dim();
    let mut out = Array2::<f32>::zeros((rows, frames));
    if frames == 0 || width == 0 {
        return out;
    }
    let denom: f32 = 2.0 * (1..=width).map(|k| (k * k) as f32).sum::<f32>();
    let last = frames as isize - 1;
    let at = |t: isize| t.clamp(0, last) as usize;

    for r in 0..rows {
        let row = features.row(r);
        for t in 0..frames {
            let t = t as isize;
            let num: f32 = (1..=width as isize)
                .map(|k| k as f32 * (row[at(t + k)] - row[at(t - k)]))
                .sum();
            out[[r, t as usize]] = num / denom;
        }
    }
    out
}

/// Mean and standard deviation across frames of the first `count` coefficients.
pub fn coefficient_stats(coeffs: &Array2<f32>, count: usize) -> Vec<(f64, f64)> {
    coeffs
        .rows()
        .into_iter()
        .take(count)
        .map(|row| {
            let values = row.to_vec();
            (mean(&values), std_dev(&values))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;

    #[test]
    fn dct_basis_is_orthonormal() {
        let basis = dct_basis(8, 8);
        let gram = basis.dot(&basis.t());
        for i in 0..8 {
            for j in 0..8 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((gram[[i, j]] - expected).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn flat_spectrum_has_only_dc_coefficient() {
        let log_mel = Array2::from_elem((16, 3), -20.0f32);
        let coeffs = mfcc(&log_mel, 5);
        assert_eq!(coeffs.dim(), (5, 3));
        assert!((coeffs[[0, 0]] - (-20.0 * 4.0)).abs() < 1e-3);
        for k in 1..5 {
            assert!(coeffs[[k, 1]].abs() < 1e-3);
        }
    }

    #[test]
    fn delta_of_constant_sequence_is_zero() {
        let coeffs = Array2::from_shape_fn((20, 40), |(r, _)| r as f32 * 1.5 - 7.0);
        let d = delta(&coeffs, 2);
        assert_eq!(d.dim(), (20, 40));
        assert!(d.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn delta_of_ramp_is_its_slope_away_from_edges() {
        let ramp = Array1::range(0.0, 10.0, 1.0).mapv(|x: f32| 3.0 * x);
        let coeffs = ramp.insert_axis(ndarray::Axis(0));
        let d = delta(&coeffs, 2);
        for t in 2..8 {
            assert!((d[[0, t]] - 3.0).abs() < 1e-5);
        }
        // Clamped edge: (1*(3-0) + 2*(6-0)) / 10
        assert!((d[[0, 0]] - 1.5).abs() < 1e-5);
    }

    #[test]
    fn delta_of_single_frame_is_zero() {
        let coeffs = Array2::from_elem((4, 1), 2.0f32);
        assert!(delta(&coeffs, 2).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn stats_per_coefficient() {
        let coeffs = Array2::from_shape_vec((2, 4), vec![1.0, 1.0, 1.0, 1.0, 0.0, 2.0, 0.0, 2.0])
            .unwrap();
        let stats = coefficient_stats(&coeffs, 5);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0], (1.0, 0.0));
        assert_eq!(stats[1], (1.0, 1.0));
    }
}
