use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{FeatureError, Result};
use crate::export::Category;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub csv: Option<PathBuf>,
    #[serde(default)]
    pub matrices: Option<PathBuf>,
}

/// Parameters of one extraction run.
///
/// Every field has a default, so a partial `[analysis]` table in a config
/// file only overrides what it names.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct AnalysisConfig {
    /// Samples per analysis frame.
    #[serde(default = "default_frame_length")]
    pub frame_length: usize,
    /// Samples between the starts of consecutive frames.
    #[serde(default = "default_hop_length")]
    pub hop_length: usize,
    /// Transform size; `None` zero-pads each frame to
    /// `(2 * frame_length).next_power_of_two()` samples.
    #[serde(default)]
    pub fft_size: Option<usize>,
    #[serde(default = "default_n_mels")]
    pub n_mels: usize,
    #[serde(default = "default_n_mfcc")]
    pub n_mfcc: usize,
    /// Half-width `W` of the delta regression window.
    #[serde(default = "default_delta_width")]
    pub delta_width: usize,
    #[serde(default = "default_rolloff_fraction")]
    pub rolloff_fraction: f32,
    #[serde(default = "default_tempo_range_bpm")]
    pub tempo_range_bpm: (f32, f32),
    /// Centre of the tempo prior.
    #[serde(default = "default_start_bpm")]
    pub start_bpm: f32,
    /// Dynamic range kept below the peak of the log-mel spectrogram.
    #[serde(default = "default_top_db")]
    pub top_db: Option<f32>,
    #[serde(default = "default_contrast_bands")]
    pub contrast_bands: usize,
    #[serde(default = "default_contrast_fmin")]
    pub contrast_fmin: f32,
    #[serde(default = "default_contrast_quantile")]
    pub contrast_quantile: f32,
    /// Median filter length (frames and bins) of the harmonic separation.
    #[serde(default = "default_hpss_kernel")]
    pub hpss_kernel: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            frame_length: default_frame_length(),
            hop_length: default_hop_length(),
            fft_size: None,
            n_mels: default_n_mels(),
            n_mfcc: default_n_mfcc(),
            delta_width: default_delta_width(),
            rolloff_fraction: default_rolloff_fraction(),
            tempo_range_bpm: default_tempo_range_bpm(),
            start_bpm: default_start_bpm(),
            top_db: default_top_db(),
            contrast_bands: default_contrast_bands(),
            contrast_fmin: default_contrast_fmin(),
            contrast_quantile: default_contrast_quantile(),
            hpss_kernel: default_hpss_kernel(),
        }
    }
}

/// Number of cepstral coefficients summarized in the feature set.
pub const SUMMARIZED_MFCC: usize = 5;

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        if self.frame_length == 0 {
            return Err(FeatureError::invalid("frame_length must be positive"));
        }
        if self.hop_length == 0 {
            return Err(FeatureError::invalid("hop_length must be positive"));
        }
        if self.n_mels == 0 {
            return Err(FeatureError::invalid("n_mels must be positive"));
        }
        if self.n_mfcc < SUMMARIZED_MFCC || self.n_mfcc > self.n_mels {
            return Err(FeatureError::invalid(format!(
                "n_mfcc must be between {} and n_mels ({}), got {}",
                SUMMARIZED_MFCC, self.n_mels, self.n_mfcc
            )));
        }
        if self.delta_width == 0 {
            return Err(FeatureError::invalid("delta_width must be positive"));
        }
        if !(self.rolloff_fraction > 0.0 && self.rolloff_fraction < 1.0) {
            return Err(FeatureError::invalid(format!(
                "rolloff_fraction must lie in (0, 1), got {}",
                self.rolloff_fraction
            )));
        }
        let (min_bpm, max_bpm) = self.tempo_range_bpm;
        if !(min_bpm > 0.0 && min_bpm < max_bpm && max_bpm.is_finite()) {
            return Err(FeatureError::invalid(format!(
                "tempo_range_bpm must satisfy 0 < min < max, got ({}, {})",
                min_bpm, max_bpm
            )));
        }
        if !(self.start_bpm > 0.0 && self.start_bpm.is_finite()) {
            return Err(FeatureError::invalid("start_bpm must be positive"));
        }
        if let Some(top_db) = self.top_db {
            if !(top_db >= 0.0) {
                return Err(FeatureError::invalid("top_db must be non-negative"));
            }
        }
        if self.contrast_bands == 0 || !(self.contrast_fmin > 0.0 && self.contrast_fmin.is_finite()) {
            return Err(FeatureError::invalid(
                "contrast_bands and contrast_fmin must be positive",
            ));
        }
        if !(self.contrast_quantile > 0.0 && self.contrast_quantile < 1.0) {
            return Err(FeatureError::invalid("contrast_quantile must lie in (0, 1)"));
        }
        if self.hpss_kernel == 0 || self.hpss_kernel % 2 == 0 {
            return Err(FeatureError::invalid("hpss_kernel must be odd"));
        }
        Ok(())
    }

    /// Transform size used for every frame.
    pub fn resolved_fft_size(&self) -> Result<usize> {
        match self.fft_size {
            Some(n) if n < self.frame_length => Err(FeatureError::transform(format!(
                "fft_size {} is smaller than frame_length {}",
                n, self.frame_length
            ))),
            Some(n) => Ok(n.next_power_of_two()),
            None => Ok((2 * self.frame_length).next_power_of_two()),
        }
    }
}

fn default_frame_length() -> usize { 2048 }
fn default_hop_length() -> usize { 512 }
fn default_n_mels() -> usize { 128 }
fn default_n_mfcc() -> usize { 20 }
fn default_delta_width() -> usize { 2 }
fn default_rolloff_fraction() -> f32 { 0.85 }
fn default_tempo_range_bpm() -> (f32, f32) { (30.0, 300.0) }
fn default_start_bpm() -> f32 { 120.0 }
fn default_top_db() -> Option<f32> { Some(80.0) }
fn default_contrast_bands() -> usize { 6 }
fn default_contrast_fmin() -> f32 { 200.0 }
fn default_contrast_quantile() -> f32 { 0.02 }
fn default_hpss_kernel() -> usize { 31 }

pub fn load_config(path: &Path) -> Option<Config> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(err) => {
            log::warn!("Invalid config {}: {}", path.display(), err);
            None
        }
    }
}

/// `./spectra.toml`, then the per-user config locations.
pub fn find_config() -> Option<PathBuf> {
    let local = PathBuf::from("spectra.toml");
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("spectra").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("spectra").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}
