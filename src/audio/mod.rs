pub mod analysis;
pub mod cepstral;
pub mod chroma;
pub mod decode;
pub mod features;
pub mod frames;
pub mod harmonic;
pub mod mel;
pub mod signal;
pub mod spectral;
pub mod stats;
pub mod stft;
pub mod tempo;
pub mod temporal;
