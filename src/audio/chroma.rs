//! Chroma feature extraction.
//!
//! Folds spectral power into the 12 pitch classes of the equal-tempered
//! scale (A4 = 440 Hz, C = 0), regardless of octave.

use ndarray::Array2;

pub const N_CHROMA: usize = 12;

const A440: f32 = 440.0;
// A is pitch class 9 when C is 0
const A_PITCH_CLASS: i64 = 9;

/// Pitch class of a frequency, or `None` for DC.
pub fn pitch_class(hz: f32) -> Option<usize> {
    if hz <= 0.0 {
        return None;
    }
    let semitones = (12.0 * (hz / A440).log2()).round() as i64;
    Some((semitones + A_PITCH_CLASS).rem_euclid(N_CHROMA as i64) as usize)
}

/// Chromagram `(pitch class, frame)` of a power spectrogram whose rows are
/// the bins at `freqs`. Every frame is divided by its maximum; a frame with
/// no energy stays at zero.
pub fn chromagram(power: &Array2<f32>, freqs: &[f32]) -> Array2<f32> {
    let classes: Vec<Option<usize>> = freqs.iter().map(|&f| pitch_class(f)).collect();
    let mut chroma = Array2::<f32>::zeros((N_CHROMA, power.ncols()));

    for (t, column) in power.columns().into_iter().enumerate() {
        let mut folded = [0.0f64; N_CHROMA];
        for (&p, class) in column.iter().zip(&classes) {
            if let Some(c) = class {
                folded[*c] += p as f64;
            }
        }
        let peak = folded.iter().copied().fold(0.0f64, f64::max);
        if peak > 0.0 {
            for (c, value) in folded.iter().enumerate() {
                chroma[[c, t]] = (value / peak) as f32;
            }
        }
    }
    chroma
}
