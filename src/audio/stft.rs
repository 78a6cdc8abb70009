//! Short-time power spectrum shared by the spectral components.

use ndarray::Array2;
use rayon::prelude::*;
use rustfft::{num_complex::Complex, FftPlanner};

use super::frames::{hann_window, Frames};
use crate::error::{FeatureError, Result};

/// Power spectrogram, indexed `(bin, frame)`, with `fft_size / 2 + 1` bins.
#[derive(Clone, Debug)]
pub struct Spectrogram {
    pub power: Array2<f32>,
    pub fft_size: usize,
    pub sample_rate: u32,
}

impl Spectrogram {
    pub fn n_bins(&self) -> usize {
        self.power.nrows()
    }

    pub fn n_frames(&self) -> usize {
        self.power.ncols()
    }

    /// Centre frequency of every bin, in Hz.
    pub fn frequencies(&self) -> Vec<f32> {
        fft_frequencies(self.sample_rate, self.fft_size)
    }
}

pub fn fft_frequencies(sample_rate: u32, fft_size: usize) -> Vec<f32> {
    let bin_hz = sample_rate as f32 / fft_size as f32;
    (0..=fft_size / 2).map(|k| k as f32 * bin_hz).collect()
}

/// Hann-windowed frames, zero-padded to `fft_size`, transformed in parallel.
pub fn power_spectrogram(
    samples: &[f32],
    sample_rate: u32,
    frame_length: usize,
    hop_length: usize,
    fft_size: usize,
) -> Result<Spectrogram> {
    if fft_size < frame_length {
        return Err(FeatureError::transform(format!(
            "fft size {} cannot hold a frame of {} samples",
            fft_size, frame_length
        )));
    }

    let window = hann_window(frame_length);
    let frames = Frames::windowed(samples, &window, hop_length);
    let n_frames = frames.len();
    let n_bins = fft_size / 2 + 1;

    // One plan, shared read-only by every worker
    let fft = FftPlanner::<f32>::new().plan_fft_forward(fft_size);

    let columns: Vec<Vec<f32>> = (0..n_frames)
        .into_par_iter()
        .map(|idx| {
            let mut frame = vec![0.0f32; frame_length];
            frames.fill(idx, &mut frame);

            let mut buffer = vec![Complex::new(0.0f32, 0.0); fft_size];
            for (b, &s) in buffer.iter_mut().zip(&frame) {
                b.re = s;
            }
            fft.process(&mut buffer);

            buffer[..n_bins].iter().map(|c| c.norm_sqr()).collect()
        })
        .collect();

    let mut power = Array2::<f32>::zeros((n_bins, n_frames));
    for (t, column) in columns.into_iter().enumerate() {
        for (k, value) in column.into_iter().enumerate() {
            power[[k, t]] = value;
        }
    }

    log::debug!(
        "Spectrogram: {} bins x {} frames (fft={}, hop={})",
        n_bins, n_frames, fft_size, hop_length
    );

    Ok(Spectrogram {
        power,
        fft_size,
        sample_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, sample_rate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn silence_gives_zero_spectrum() {
        let spec = power_spectrogram(&[0.0; 4000], 8000, 512, 128, 1024).unwrap();
        assert_eq!(spec.n_bins(), 513);
        assert!(spec.power.iter().all(|&p| p == 0.0));
    }

    #[test]
    fn power_is_non_negative() {
        let samples: Vec<f32> = (0..3000).map(|i| ((i * 7919) % 13) as f32 - 6.0).collect();
        let spec = power_spectrogram(&samples, 8000, 256, 64, 256).unwrap();
        assert!(spec.power.iter().all(|&p| p >= 0.0 && p.is_finite()));
    }

    #[test]
    fn sine_peaks_at_its_bin() {
        let sample_rate = 8000;
        let samples = sine(1000.0, sample_rate, 8000);
        let spec = power_spectrogram(&samples, sample_rate, 1024, 256, 1024).unwrap();
        let column = spec.power.column(2);
        let peak = column
            .iter()
            .enumerate()
            .fold((0, 0.0f32), |acc, (k, &p)| if p > acc.1 { (k, p) } else { acc })
            .0;
        // 1000 Hz at 7.8125 Hz per bin
        assert_eq!(peak, 128);
    }

    #[test]
    fn rejects_fft_smaller_than_frame() {
        assert!(matches!(
            power_spectrogram(&[0.0; 100], 8000, 512, 128, 256),
            Err(FeatureError::TransformFailure(_))
        ));
    }
}
