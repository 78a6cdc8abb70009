//! Output of an analysis run: tabular feature rows, matrix dumps and the
//! key-features summary shown on the terminal.

pub mod csv;
pub mod matrices;

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::audio::features::{FeatureSet, FeatureValue};
use crate::config::SUMMARIZED_MFCC;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Label attached to a recording in exported rows.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum Category {
    #[default]
    Music,
    HumanVoice,
    AnimalSound,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Music => "music",
            Category::HumanVoice => "human_voice",
            Category::AnimalSound => "animal_sound",
        };
        f.write_str(name)
    }
}

/// One analyzed recording with the metadata exported next to its features.
#[derive(Clone, Debug)]
pub struct Record {
    pub filename: String,
    pub category: Category,
    pub features: FeatureSet,
}

impl Record {
    pub fn new(path: &Path, category: Category, features: FeatureSet) -> Self {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { filename, category, features }
    }

    /// `<stem>_features.csv` next to the working directory.
    pub fn default_csv_path(&self) -> PathBuf {
        let stem = Path::new(&self.filename)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio".to_string());
        PathBuf::from(format!("{}_features.csv", stem))
    }
}

/// Label and formatted value of the headline features, floats to two decimals.
pub fn key_features(record: &Record) -> Vec<(String, String)> {
    const LABELS: [(&str, &str); 14] = [
        ("duration", "Duration (s)"),
        ("dominant_mel_band", "Dominant Mel Band"),
        ("low_freq_ratio", "Low Freq Ratio"),
        ("mid_freq_ratio", "Mid Freq Ratio"),
        ("high_freq_ratio", "High Freq Ratio"),
        ("mel_mean", "Mel Spec Mean (dB)"),
        ("zcr_mean", "Zero Crossing Rate"),
        ("rms_mean", "RMS Energy"),
        ("tempo", "Tempo (BPM)"),
        ("spectral_centroid_mean", "Spectral Centroid"),
        ("spectral_bandwidth_mean", "Spectral Bandwidth"),
        ("spectral_rolloff_mean", "Spectral Rolloff"),
        ("spectral_contrast_mean", "Spectral Contrast"),
        ("tonnetz_mean", "Tonnetz"),
    ];

    let mut rows = vec![
        ("Filename".to_string(), record.filename.clone()),
        ("Category".to_string(), record.category.to_string()),
    ];
    let mut push = |key: String, label: String| {
        if let Some(value) = record.features.get(&key) {
            let text = match value {
                FeatureValue::Float(v) => format!("{:.2}", v),
                FeatureValue::Int(v) => v.to_string(),
            };
            rows.push((label, text));
        }
    };
    for (key, label) in LABELS {
        push(key.to_string(), label.to_string());
    }
    for i in 1..=SUMMARIZED_MFCC {
        push(format!("mfcc_{}_mean", i), format!("MFCC {} Mean", i));
    }
    rows
}

/// Two-column text table of [`key_features`].
pub fn render_table(record: &Record) -> String {
    let rows = key_features(record);
    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let mut out = String::new();
    for (label, value) in rows {
        out.push_str(&format!("  {:<width$}  {}\n", label, value, width = width));
    }
    out
}
