//! Spectral shape descriptors.
//!
//! Centroid, bandwidth and roll-off are computed per frame from the power
//! spectrum; contrast is computed per octave sub-band and per frame. A frame
//! with no power gets 0 for every descriptor.

use ndarray::{Array2, ArrayView1};

use super::mel::AMIN;
use super::stft::Spectrogram;

/// Per-frame shape descriptors.
#[derive(Clone, Debug, Default)]
pub struct SpectralShape {
    pub centroid: Vec<f32>,
    pub bandwidth: Vec<f32>,
    pub rolloff: Vec<f32>,
}

impl SpectralShape {
    pub fn compute(spectrogram: &Spectrogram, rolloff_fraction: f32) -> Self {
        let freqs = spectrogram.frequencies();
        let mut shape = SpectralShape::default();
        for column in spectrogram.power.columns() {
            let centroid = centroid(&column, &freqs);
            shape.centroid.push(centroid as f32);
            shape.bandwidth.push(bandwidth(&column, &freqs, centroid) as f32);
            shape.rolloff.push(rolloff(&column, &freqs, rolloff_fraction));
        }
        shape
    }
}

fn total(power: &ArrayView1<f32>) -> f64 {
    power.iter().map(|&p| p as f64).sum()
}

pub fn centroid(power: &ArrayView1<f32>, freqs: &[f32]) -> f64 {
    let total = total(power);
    if total <= 0.0 {
        return 0.0;
    }
    power
        .iter()
        .zip(freqs)
        .map(|(&p, &f)| p as f64 * f as f64)
        .sum::<f64>()
        / total
}

/// Power-weighted standard deviation of frequency around `centroid`.
pub fn bandwidth(power: &ArrayView1<f32>, freqs: &[f32], centroid: f64) -> f64 {
    let total = total(power);
    if total <= 0.0 {
        return 0.0;
    }
    let variance = power
        .iter()
        .zip(freqs)
        .map(|(&p, &f)| p as f64 * (f as f64 - centroid).powi(2))
        .sum::<f64>()
        / total;
    variance.sqrt()
}

/// Lowest frequency below which `fraction` of the frame's power lies.
pub fn rolloff(power: &ArrayView1<f32>, freqs: &[f32], fraction: f32) -> f32 {
    let total = total(power);
    if total <= 0.0 {
        return 0.0;
    }
    let threshold = fraction as f64 * total;
    let mut cumulative = 0.0f64;
    for (&p, &f) in power.iter().zip(freqs) {
        cumulative += p as f64;
        if cumulative >= threshold {
            return f;
        }
    }
    freqs.last().copied().unwrap_or(0.0)
}

/// Bin ranges of the octave sub-bands: `[0, fmin)`, `[fmin, 2 fmin)`, ...
/// with the last band running up to Nyquist. Bands starting at or above
/// Nyquist are dropped.
pub fn contrast_bands(freqs: &[f32], n_bands: usize, fmin: f32) -> Vec<(usize, usize)> {
    let nyquist = freqs.last().copied().unwrap_or(0.0);
    let mut edges = vec![0.0f32];
    edges.extend((0..n_bands).map(|i| fmin * 2f32.powi(i as i32)));
    edges.retain(|&e| e < nyquist || e == 0.0);
    edges.push(f32::INFINITY);

    let bin_of = |hz: f32| freqs.iter().position(|&f| f >= hz).unwrap_or(freqs.len());
    edges
        .windows(2)
        .map(|w| (bin_of(w[0]), bin_of(w[1])))
        .filter(|(lo, hi)| hi > lo)
        .collect()
}

/// Peak-to-valley difference in dB of each sub-band, `(band, frame)`.
///
/// Peak and valley are the means of the top and bottom `quantile` of the
/// band's sorted power values (at least one bin each).
pub fn spectral_contrast(
    spectrogram: &Spectrogram,
    n_bands: usize,
    fmin: f32,
    quantile: f32,
) -> Array2<f32> {
    let freqs = spectrogram.frequencies();
    let bands = contrast_bands(&freqs, n_bands, fmin);
    let mut contrast = Array2::<f32>::zeros((bands.len(), spectrogram.n_frames()));
    let to_db = |x: f64| 10.0 * (x.max(AMIN as f64)).log10();

    for (t, column) in spectrogram.power.columns().into_iter().enumerate() {
        for (b, &(lo, hi)) in bands.iter().enumerate() {
            let mut values: Vec<f32> = column.slice(ndarray::s![lo..hi]).to_vec();
            values.sort_by(|a, b| a.total_cmp(b));
            let n = values.len();
            let k = ((quantile * n as f32).round() as usize).clamp(1, n);
            let valley = values[..k].iter().map(|&v| v as f64).sum::<f64>() / k as f64;
            let peak = values[n - k..].iter().map(|&v| v as f64).sum::<f64>() / k as f64;
            contrast[[b, t]] = (to_db(peak) - to_db(valley)) as f32;
        }
    }
    contrast
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;

    fn spectrogram_of(columns: &[Vec<f32>], sample_rate: u32) -> Spectrogram {
        let n_bins = columns[0].len();
        let power = Array2::from_shape_fn((n_bins, columns.len()), |(k, t)| columns[t][k]);
        Spectrogram {
            power,
            fft_size: (n_bins - 1) * 2,
            sample_rate,
        }
    }

    #[test]
    fn centroid_of_single_bin_is_its_frequency() {
        let mut column = vec![0.0; 9];
        column[3] = 5.0;
        let freqs: Vec<f32> = (0..9).map(|k| k as f32 * 100.0).collect();
        let power = Array1::from(column);
        assert!((centroid(&power.view(), &freqs) - 300.0).abs() < 1e-9);
        assert!(bandwidth(&power.view(), &freqs, 300.0).abs() < 1e-9);
    }

    #[test]
    fn bandwidth_of_two_equal_bins() {
        let mut column = vec![0.0; 9];
        column[2] = 1.0;
        column[6] = 1.0;
        let freqs: Vec<f32> = (0..9).map(|k| k as f32 * 100.0).collect();
        let power = Array1::from(column);
        let c = centroid(&power.view(), &freqs);
        assert!((c - 400.0).abs() < 1e-9);
        assert!((bandwidth(&power.view(), &freqs, c) - 200.0).abs() < 1e-9);
    }

    #[test]
    fn rolloff_reaches_fraction() {
        let power = Array1::from(vec![1.0f32, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
        let freqs: Vec<f32> = (0..10).map(|k| k as f32 * 10.0).collect();
        // 85% of 10 is reached at the ninth bin
        assert_eq!(rolloff(&power.view(), &freqs, 0.85), 80.0);
    }

    #[test]
    fn silent_frame_descriptors_are_zero() {
        let spec = spectrogram_of(&[vec![0.0; 513]], 22050);
        let shape = SpectralShape::compute(&spec, 0.85);
        assert_eq!(shape.centroid, vec![0.0]);
        assert_eq!(shape.bandwidth, vec![0.0]);
        assert_eq!(shape.rolloff, vec![0.0]);
        let contrast = spectral_contrast(&spec, 6, 200.0, 0.02);
        assert!(contrast.iter().all(|&c| c == 0.0));
    }

    #[test]
    fn bands_cover_every_bin_once() {
        let freqs: Vec<f32> = (0..=2048).map(|k| k as f32 * 44100.0 / 4096.0).collect();
        let bands = contrast_bands(&freqs, 6, 200.0);
        assert_eq!(bands.len(), 7);
        assert_eq!(bands[0].0, 0);
        assert_eq!(bands.last().unwrap().1, freqs.len());
        for w in bands.windows(2) {
            assert_eq!(w[0].1, w[1].0);
        }
    }

    #[test]
    fn bands_above_nyquist_are_dropped() {
        let freqs: Vec<f32> = (0..=512).map(|k| k as f32 * 8000.0 / 1024.0).collect();
        // Edges 200..6400 Hz; Nyquist is 4000 Hz so 6400 is dropped
        let bands = contrast_bands(&freqs, 6, 200.0);
        assert_eq!(bands.len(), 6);
    }

    #[test]
    fn peaky_band_has_higher_contrast_than_flat_band() {
        let n_bins = 1025;
        let flat = vec![1.0f32; n_bins];
        let mut peaky = vec![1e-4f32; n_bins];
        for k in (0..n_bins).step_by(4) {
            peaky[k] = 1.0;
        }
        let spec = spectrogram_of(&[flat, peaky], 44100);
        let contrast = spectral_contrast(&spec, 6, 200.0, 0.02);
        for b in 1..contrast.nrows() {
            assert!(contrast[[b, 0]].abs() < 1e-4);
            assert!(contrast[[b, 1]] > 20.0);
        }
    }
}
