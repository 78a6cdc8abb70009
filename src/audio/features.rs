use ndarray::Array2;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::config::SUMMARIZED_MFCC;

/// A scalar feature value, as exported.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FeatureValue {
    Float(f64),
    Int(usize),
}

impl FeatureValue {
    pub fn as_f64(self) -> f64 {
        match self {
            FeatureValue::Float(v) => v,
            FeatureValue::Int(v) => v as f64,
        }
    }
}

impl std::fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureValue::Float(v) => write!(f, "{}", v),
            FeatureValue::Int(v) => write!(f, "{}", v),
        }
    }
}

/// Scalar summary of one recording.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeatureSet {
    /// Seconds.
    pub duration: f64,
    pub mel_mean: f64,
    pub mel_std: f64,
    pub mel_skew: f64,
    pub mel_kurtosis: f64,
    pub dominant_mel_band: usize,
    pub low_freq_ratio: f64,
    pub mid_freq_ratio: f64,
    pub high_freq_ratio: f64,
    pub mfcc_mean: [f64; SUMMARIZED_MFCC],
    pub mfcc_std: [f64; SUMMARIZED_MFCC],
    pub zcr_mean: f64,
    pub rms_mean: f64,
    /// Beats per minute, 0 without rhythmic onsets.
    pub tempo: f64,
    pub spectral_centroid_mean: f64,
    pub spectral_bandwidth_mean: f64,
    pub spectral_rolloff_mean: f64,
    pub spectral_contrast_mean: f64,
    pub tonnetz_mean: f64,
}

impl FeatureSet {
    /// Name-indexed view, in export column order.
    pub fn entries(&self) -> Vec<(String, FeatureValue)> {
        use FeatureValue::{Float, Int};

        let mut entries = vec![
            ("duration".to_string(), Float(self.duration)),
            ("mel_mean".to_string(), Float(self.mel_mean)),
            ("mel_std".to_string(), Float(self.mel_std)),
            ("mel_skew".to_string(), Float(self.mel_skew)),
            ("mel_kurtosis".to_string(), Float(self.mel_kurtosis)),
            ("dominant_mel_band".to_string(), Int(self.dominant_mel_band)),
            ("low_freq_ratio".to_string(), Float(self.low_freq_ratio)),
            ("mid_freq_ratio".to_string(), Float(self.mid_freq_ratio)),
            ("high_freq_ratio".to_string(), Float(self.high_freq_ratio)),
        ];
        for i in 0..SUMMARIZED_MFCC {
            entries.push((format!("mfcc_{}_mean", i + 1), Float(self.mfcc_mean[i])));
            entries.push((format!("mfcc_{}_std", i + 1), Float(self.mfcc_std[i])));
        }
        entries.extend([
            ("zcr_mean".to_string(), Float(self.zcr_mean)),
            ("rms_mean".to_string(), Float(self.rms_mean)),
            ("tempo".to_string(), Float(self.tempo)),
            ("spectral_centroid_mean".to_string(), Float(self.spectral_centroid_mean)),
            ("spectral_bandwidth_mean".to_string(), Float(self.spectral_bandwidth_mean)),
            ("spectral_rolloff_mean".to_string(), Float(self.spectral_rolloff_mean)),
            ("spectral_contrast_mean".to_string(), Float(self.spectral_contrast_mean)),
            ("tonnetz_mean".to_string(), Float(self.tonnetz_mean)),
        ]);
        entries
    }

    pub fn get(&self, name: &str) -> Option<FeatureValue> {
        self.entries()
            .into_iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        self.entries()
            .iter()
            .zip(other.entries().iter())
            .all(|((_, a), (_, b))| (a.as_f64() - b.as_f64()).abs() <= tolerance)
    }
}

/// Every feature name, in export column order.
pub fn feature_names() -> Vec<String> {
    FeatureSet::default()
        .entries()
        .into_iter()
        .map(|(name, _)| name)
        .collect()
}

impl Serialize for FeatureSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entries = self.entries();
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (name, value) in &entries {
            match value {
                FeatureValue::Float(v) => map.serialize_entry(name, v)?,
                FeatureValue::Int(v) => map.serialize_entry(name, v)?,
            }
        }
        map.end()
    }
}

/// Time-frequency representations kept for display, indexed `(row, frame)`.
#[derive(Clone, Debug)]
pub struct Matrices {
    pub sample_rate: u32,
    pub hop_length: usize,
    pub waveform: Vec<f32>,
    /// Log-mel spectrogram in dB relative to its peak.
    pub mel_spectrogram: Array2<f32>,
    pub mfcc: Array2<f32>,
    pub delta_mfcc: Array2<f32>,
    pub chroma: Array2<f32>,
    /// Total mel power per band.
    pub band_energies: Vec<f32>,
    pub spectral_centroid: Vec<f32>,
    pub spectral_bandwidth: Vec<f32>,
    pub spectral_rolloff: Vec<f32>,
    pub spectral_contrast: Array2<f32>,
    pub tonnetz: Array2<f32>,
    pub zcr: Vec<f32>,
    pub rms: Vec<f32>,
    pub onset_envelope: Vec<f32>,
}

impl Matrices {
    pub fn n_frames(&self) -> usize {
        self.mel_spectrogram.ncols()
    }
}

/// Result of one extraction run.
#[derive(Clone, Debug)]
pub struct Analysis {
    pub features: FeatureSet,
    pub matrices: Matrices,
}
