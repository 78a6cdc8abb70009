//! Audio feature extraction: a fixed set of time, spectral, cepstral, tonal
//! and rhythmic descriptors computed from a mono signal.

pub mod audio;
pub mod config;
pub mod error;
pub mod export;

pub use audio::analysis::{analyze, analyze_with_cache};
pub use audio::features::{feature_names, Analysis, FeatureSet, FeatureValue, Matrices};
pub use audio::mel::FilterBankCache;
pub use audio::signal::Signal;
pub use config::AnalysisConfig;
pub use error::{FeatureError, Result};
pub use export::Category;
