//! Time-domain descriptors computed on raw (unwindowed) frames.

use super::frames::Frames;

/// Sign changes between consecutive samples divided by `len - 1`.
///
/// Zero counts as non-negative, so an all-zero frame has no crossings.
pub fn zero_crossing_rate(frame: &[f32]) -> f32 {
    if frame.len() < 2 {
        return 0.0;
    }
    let crossings = frame
        .windows(2)
        .filter(|w| (w[0] < 0.0) != (w[1] < 0.0))
        .count();
    crossings as f32 / (frame.len() - 1) as f32
}

pub fn rms(frame: &[f32]) -> f32 {
    if frame.is_empty() {
        return 0.0;
    }
    let energy: f64 = frame.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (energy / frame.len() as f64).sqrt() as f32
}

/// Per-frame zero-crossing rate and RMS energy.
#[derive(Clone, Debug, Default)]
pub struct TemporalFeatures {
    pub zcr: Vec<f32>,
    pub rms: Vec<f32>,
}

impl TemporalFeatures {
    pub fn compute(samples: &[f32], frame_length: usize, hop_length: usize) -> Self {
        let mut features = TemporalFeatures::default();
        for frame in Frames::raw(samples, frame_length, hop_length) {
            features.zcr.push(zero_crossing_rate(&frame));
            features.rms.push(rms(&frame));
        }
        features
    }
}
