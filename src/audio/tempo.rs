//! Tempo estimation.
//!
//! The onset envelope is the half-wave rectified frame-to-frame increase of
//! the log-mel spectrogram, summed over bands. Its autocorrelation, weighted
//! by a log-normal prior around a reference tempo, gives the dominant beat
//! period.

use ndarray::Array2;

/// Envelope values below this fraction of the envelope peak are ignored.
const ONSET_GATE: f32 = 0.1;
/// Weakest onset, in dB summed over bands, that counts as a rhythmic event.
const MIN_ONSET: f32 = 1.0;

/// One onset-strength value per frame; the first frame is 0.
pub fn onset_envelope(log_mel: &Array2<f32>) -> Vec<f32> {
    let frames = log_mel.ncols();
    let mut envelope = vec![0.0f32; frames];
    for t in 1..frames {
        envelope[t] = log_mel
            .column(t)
            .iter()
            .zip(log_mel.column(t - 1).iter())
            .map(|(cur, prev)| (cur - prev).max(0.0))
            .sum();
    }
    envelope
}

/// Zeroes onsets of frames that run past the end of the signal.
///
/// The cut under the window spreads energy over every band, which would
/// otherwise read as an onset. A signal shorter than one frame keeps its
/// single frame.
pub fn suppress_padded_frames(
    envelope: &mut [f32],
    signal_len: usize,
    frame_length: usize,
    hop_length: usize,
) {
    if signal_len < frame_length {
        return;
    }
    for (t, value) in envelope.iter_mut().enumerate() {
        if t * hop_length + frame_length > signal_len {
            *value = 0.0;
        }
    }
}

pub struct TempoEstimator {
    pub hop_seconds: f32,
    pub min_bpm: f32,
    pub max_bpm: f32,
    pub start_bpm: f32,
}

impl TempoEstimator {
    fn lag_to_bpm(&self, lag: usize) -> f32 {
        60.0 / (lag as f32 * self.hop_seconds)
    }

    /// Prior weight, one octave standard deviation around `start_bpm`.
    fn prior(&self, bpm: f32) -> f32 {
        let octaves = (bpm / self.start_bpm).log2();
        (-0.5 * octaves * octaves).exp()
    }

    /// Dominant tempo in BPM, or 0 when the envelope carries no periodic onsets.
    pub fn estimate(&self, envelope: &[f32]) -> f32 {
        let peak = envelope.iter().copied().fold(0.0f32, f32::max);
        if peak <= MIN_ONSET {
            log::debug!("Flat onset envelope, reporting tempo 0");
            return 0.0;
        }

        let gate = (ONSET_GATE * peak).max(MIN_ONSET);
        let gated: Vec<f32> = envelope
            .iter()
            .map(|&v| if v >= gate { v } else { 0.0 })
            .collect();

        let n = gated.len();
        let min_lag = ((60.0 / (self.max_bpm * self.hop_seconds)).floor() as usize).max(1);
        let max_lag = ((60.0 / (self.min_bpm * self.hop_seconds)).ceil() as usize).min(n.saturating_sub(1));
        if min_lag > max_lag {
            return 0.0;
        }

        let mut best: Option<(usize, f32)> = None;
        for lag in min_lag..=max_lag {
            let bpm = self.lag_to_bpm(lag);
            if bpm < self.min_bpm || bpm > self.max_bpm {
                continue;
            }
            let ac: f32 = gated[..n - lag]
                .iter()
                .zip(&gated[lag..])
                .map(|(a, b)| a * b)
                .sum();
            let score = ac * self.prior(bpm);
            if score > 0.0 && best.map_or(true, |(_, s)| score > s) {
                best = Some((lag, score));
            }
        }

        match best {
            Some((lag, _)) => self.lag_to_bpm(lag),
            None => {
                log::debug!("No periodic onsets in tempo range, reporting tempo 0");
                0.0
            }
        }
    }
}
