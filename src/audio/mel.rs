//! Mel filterbank, log-mel spectrogram and band-energy statistics.

use ndarray::{Array2, Axis};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::stats::{argmax, Moments};
use super::stft::{fft_frequencies, Spectrogram};
use crate::error::{FeatureError, Result};

/// Floor applied before every logarithm.
pub const AMIN: f32 = 1e-10;

pub fn hz_to_mel(hz: f32) -> f32 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

pub fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10f32.powf(mel / 2595.0) - 1.0)
}

/// Triangular filters mapping FFT bins to mel bands, `(band, bin)`.
///
/// Depends only on the sample rate, the transform size and the band count.
#[derive(Clone, Debug)]
pub struct MelFilterBank {
    weights: Array2<f32>,
    centers_hz: Vec<f32>,
}

impl MelFilterBank {
    pub fn new(sample_rate: u32, fft_size: usize, n_mels: usize) -> Result<Self> {
        if sample_rate == 0 || fft_size < 2 || n_mels == 0 {
            return Err(FeatureError::transform(format!(
                "cannot build {} mel filters for fft size {} at {} Hz",
                n_mels, fft_size, sample_rate
            )));
        }

        let bin_freqs = fft_frequencies(sample_rate, fft_size);
        let n_bins = bin_freqs.len();
        let mel_max = hz_to_mel(sample_rate as f32 / 2.0);
        let edges: Vec<f32> = (0..n_mels + 2)
            .map(|i| mel_to_hz(mel_max * i as f32 / (n_mels + 1) as f32))
            .collect();

        let mut weights = Array2::<f32>::zeros((n_mels, n_bins));
        let mut empty = 0;
        for m in 0..n_mels {
            let (left, center, right) = (edges[m], edges[m + 1], edges[m + 2]);
            // Area normalization keeps each filter's total response comparable
            let enorm = 2.0 / (right - left);
            let mut row = weights.row_mut(m);
            for (k, &f) in bin_freqs.iter().enumerate() {
                let rising = (f - left) / (center - left);
                let falling = (right - f) / (right - center);
                let w = rising.min(falling);
                if w > 0.0 {
                    row[k] = w * enorm;
                }
            }
            if row.iter().all(|&w| w == 0.0) {
                // Narrower than one bin: fall back to the bin nearest the centre
                let bin_hz = sample_rate as f32 / fft_size as f32;
                let nearest = ((center / bin_hz).round() as usize).min(n_bins - 1);
                row[nearest] = enorm;
                empty += 1;
            }
        }
        if empty > 0 {
            log::warn!(
                "{} of {} mel filters are narrower than one FFT bin; consider a larger fft_size",
                empty, n_mels
            );
        }

        Ok(Self {
            weights,
            centers_hz: edges[1..=n_mels].to_vec(),
        })
    }

    pub fn n_mels(&self) -> usize {
        self.weights.nrows()
    }

    pub fn n_bins(&self) -> usize {
        self.weights.ncols()
    }

    pub fn weights(&self) -> &Array2<f32> {
        &self.weights
    }

    /// Centre frequency of each band, in Hz.
    pub fn centers_hz(&self) -> &[f32] {
        &self.centers_hz
    }

    /// Band whose centre frequency is closest to `hz`.
    pub fn band_for(&self, hz: f32) -> usize {
        let distances: Vec<f32> = self.centers_hz.iter().map(|c| -(c - hz).abs()).collect();
        argmax(&distances)
    }

    /// Projects a power spectrogram onto the bands, `(band, frame)`.
    pub fn apply(&self, spectrogram: &Spectrogram) -> Result<Array2<f32>> {
        if spectrogram.n_bins() != self.n_bins() {
            return Err(FeatureError::transform(format!(
                "filterbank expects {} bins, spectrogram has {}",
                self.n_bins(),
                spectrogram.n_bins()
            )));
        }
        Ok(self.weights.dot(&spectrogram.power))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct FilterBankKey {
    sample_rate: u32,
    fft_size: usize,
    n_mels: usize,
}

/// Filterbanks reused across runs with identical parameters.
///
/// Handed-out banks are immutable, so concurrent runs share them freely.
#[derive(Debug, Default)]
pub struct FilterBankCache {
    banks: RwLock<HashMap<FilterBankKey, Arc<MelFilterBank>>>,
}

impl FilterBankCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_build(
        &self,
        sample_rate: u32,
        fft_size: usize,
        n_mels: usize,
    ) -> Result<Arc<MelFilterBank>> {
        let key = FilterBankKey { sample_rate, fft_size, n_mels };
        if let Ok(banks) = self.banks.read() {
            if let Some(bank) = banks.get(&key) {
                return Ok(Arc::clone(bank));
            }
        }
        let bank = Arc::new(MelFilterBank::new(sample_rate, fft_size, n_mels)?);
        if let Ok(mut banks) = self.banks.write() {
            let entry = banks.entry(key).or_insert_with(|| Arc::clone(&bank));
            return Ok(Arc::clone(entry));
        }
        Ok(bank)
    }

    pub fn len(&self) -> usize {
        self.banks.read().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `10 * log10(max(x, AMIN) / max(peak, AMIN))`, optionally floored at `-top_db`.
pub fn power_to_db(power: &Array2<f32>, top_db: Option<f32>) -> Array2<f32> {
    let peak = power.iter().copied().fold(0.0f32, f32::max);
    let ref_db = 10.0 * peak.max(AMIN).log10();
    let mut db = power.mapv(|x| 10.0 * x.max(AMIN).log10() - ref_db);
    if let Some(top_db) = top_db {
        let max_db = db.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let floor = max_db - top_db;
        db.mapv_inplace(|x| x.max(floor));
    }
    db
}

/// Mel spectrogram in power and decibel form.
#[derive(Clone, Debug)]
pub struct MelSpectrogram {
    pub power: Array2<f32>,
    pub db: Array2<f32>,
}

impl MelSpectrogram {
    pub fn compute(
        bank: &MelFilterBank,
        spectrogram: &Spectrogram,
        top_db: Option<f32>,
    ) -> Result<Self> {
        let power = bank.apply(spectrogram)?;
        let db = power_to_db(&power, top_db);
        Ok(Self { power, db })
    }

    /// Moments of every dB value, flattened.
    pub fn db_moments(&self) -> Moments {
        let values: Vec<f32> = self.db.iter().copied().collect();
        Moments::of(&values)
    }

    /// Total power of each band across all frames.
    pub fn band_energies(&self) -> Vec<f32> {
        self.power
            .sum_axis(Axis(1))
            .iter()
            .copied()
            .collect()
    }
}

/// Low / mid / high split of the mel power.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BandRatios {
    pub dominant_band: usize,
    pub low: f64,
    pub mid: f64,
    pub high: f64,
}

impl BandRatios {
    /// Splits the band axis at 33% and 66% of the band count; all ratios
    /// are 0 when there is no energy at all.
    pub fn from_energies(band_energies: &[f32]) -> Self {
        let n = band_energies.len();
        let low_end = (n as f64 * 0.33) as usize;
        let mid_end = (n as f64 * 0.66) as usize;
        let sum = |range: &[f32]| range.iter().map(|&e| e as f64).sum::<f64>();

        let low = sum(&band_energies[..low_end]);
        let mid = sum(&band_energies[low_end..mid_end]);
        let high = sum(&band_energies[mid_end..]);
        let total = low + mid + high;

        let ratio = |part: f64| if total > 0.0 { part / total } else { 0.0 };
        BandRatios {
            dominant_band: argmax(band_energies),
            low: ratio(low),
            mid: ratio(mid),
            high: ratio(high),
        }
    }
}
