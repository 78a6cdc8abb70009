use crate::error::{FeatureError, Result};

/// A complete mono recording held in memory.
#[derive(Clone, Debug)]
pub struct Signal {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Signal {
    /// Rejects empty or non-finite sample arrays and a zero sample rate.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(FeatureError::invalid("sample rate must be positive"));
        }
        if samples.is_empty() {
            return Err(FeatureError::invalid("signal is empty"));
        }
        if let Some(pos) = samples.iter().position(|s| !s.is_finite()) {
            return Err(FeatureError::invalid(format!(
                "non-finite sample at index {}",
                pos
            )));
        }
        Ok(Self { samples, sample_rate })
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Length in seconds.
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    pub fn peak_amplitude(&self) -> f32 {
        self.samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max)
    }
}
