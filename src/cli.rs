use clap::Parser;
use std::path::PathBuf;

use spectra::config::OutputConfig;
use spectra::{AnalysisConfig, Category};

#[derive(Parser, Debug)]
#[command(name = "spectra", about = "Audio feature extractor")]
pub struct Cli {
    /// Input audio file (WAV, MP3, FLAC, OGG)
    pub input: Option<PathBuf>,

    /// Category label exported with the features
    #[arg(short = 'k', long, value_enum, default_value_t = Category::Music)]
    pub category: Category,

    /// Write the feature row as CSV to this path
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Write the feature row to <input stem>_features.csv
    #[arg(short, long)]
    pub export: bool,

    /// Write the time-frequency matrices as JSON to this path
    #[arg(short, long)]
    pub matrices: Option<PathBuf>,

    /// Config file (defaults to ./spectra.toml or the user config)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Samples per analysis frame
    #[arg(long, default_value_t = 2048)]
    pub frame_length: usize,

    /// Samples between consecutive frames
    #[arg(long, default_value_t = 512)]
    pub hop_length: usize,

    /// Transform size (power of two, at least the frame length)
    #[arg(long)]
    pub fft_size: Option<usize>,

    /// Number of mel bands
    #[arg(long, default_value_t = 128)]
    pub n_mels: usize,

    /// Number of cepstral coefficients
    #[arg(long, default_value_t = 20)]
    pub n_mfcc: usize,

    /// Fraction of spectral power below the roll-off frequency
    #[arg(long, default_value_t = 0.85)]
    pub rolloff: f32,

    /// Slowest tempo considered, in BPM
    #[arg(long, default_value_t = 30.0)]
    pub min_bpm: f32,

    /// Fastest tempo considered, in BPM
    #[arg(long, default_value_t = 300.0)]
    pub max_bpm: f32,

    /// Print every feature as JSON instead of the summary table
    #[arg(long)]
    pub json: bool,

    /// List the extracted feature names and exit
    #[arg(long)]
    pub list_features: bool,
}

impl Cli {
    /// Analysis parameters: file values, overridden by every flag that is
    /// not at its default.
    pub fn analysis_config(&self, file: Option<&AnalysisConfig>) -> AnalysisConfig {
        let defaults = AnalysisConfig::default();
        let mut config = file.cloned().unwrap_or_default();
        if self.frame_length != defaults.frame_length { config.frame_length = self.frame_length; }
        if self.hop_length != defaults.hop_length { config.hop_length = self.hop_length; }
        if self.fft_size.is_some() { config.fft_size = self.fft_size; }
        if self.n_mels != defaults.n_mels { config.n_mels = self.n_mels; }
        if self.n_mfcc != defaults.n_mfcc { config.n_mfcc = self.n_mfcc; }
        if self.rolloff != defaults.rolloff_fraction { config.rolloff_fraction = self.rolloff; }
        if self.min_bpm != defaults.tempo_range_bpm.0 { config.tempo_range_bpm.0 = self.min_bpm; }
        if self.max_bpm != defaults.tempo_range_bpm.1 { config.tempo_range_bpm.1 = self.max_bpm; }
        config
    }

    /// Output settings from the file apply only where no flag was given.
    pub fn merge_output(&mut self, output: OutputConfig) {
        if self.category == Category::default() {
            if let Some(category) = output.category {
                self.category = category;
            }
        }
        if self.csv.is_none() { self.csv = output.csv; }
        if self.matrices.is_none() { self.matrices = output.matrices; }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_analysis_defaults() {
        let cli = Cli::parse_from(["spectra", "clip.wav"]);
        assert_eq!(cli.analysis_config(None), AnalysisConfig::default());
        assert_eq!(cli.category, Category::Music);
    }

    #[test]
    fn flags_override_file_values() {
        let cli = Cli::parse_from(["spectra", "clip.wav", "--n-mels", "64", "--max-bpm", "200"]);
        let file = AnalysisConfig { n_mels: 40, hop_length: 256, ..Default::default() };
        let config = cli.analysis_config(Some(&file));
        assert_eq!(config.n_mels, 64);
        assert_eq!(config.hop_length, 256);
        assert_eq!(config.tempo_range_bpm, (30.0, 200.0));
    }

    #[test]
    fn file_output_fills_missing_flags() {
        let mut cli = Cli::parse_from(["spectra", "clip.wav", "--csv", "row.csv"]);
        cli.merge_output(OutputConfig {
            category: Some(Category::AnimalSound),
            csv: Some(PathBuf::from("other.csv")),
            matrices: Some(PathBuf::from("m.json")),
        });
        assert_eq!(cli.category, Category::AnimalSound);
        assert_eq!(cli.csv, Some(PathBuf::from("row.csv")));
        assert_eq!(cli.matrices, Some(PathBuf::from("m.json")));
    }

    #[test]
    fn category_uses_snake_case_values() {
        let cli = Cli::parse_from(["spectra", "v.wav", "--category", "human_voice"]);
        assert_eq!(cli.category, Category::HumanVoice);
    }
}
