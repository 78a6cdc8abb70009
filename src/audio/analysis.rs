use ndarray::Array2;

use super::cepstral::{coefficient_stats, delta, mfcc};
use super::chroma::chromagram;
use super::features::{Analysis, FeatureSet, Matrices};
use super::harmonic::{harmonic_power, tonnetz};
use super::mel::{BandRatios, FilterBankCache, MelSpectrogram};
use super::signal::Signal;
use super::spectral::{spectral_contrast, SpectralShape};
use super::stats::mean;
use super::stft::{power_spectrogram, Spectrogram};
use super::temporal::TemporalFeatures;
use super::tempo::{onset_envelope, suppress_padded_frames, TempoEstimator};
use crate::config::{AnalysisConfig, SUMMARIZED_MFCC};
use crate::error::Result;

/// Runs the whole extraction with a filterbank built for this run only.
pub fn analyze(signal: &Signal, config: &AnalysisConfig) -> Result<Analysis> {
    analyze_with_cache(signal, config, &FilterBankCache::new())
}

/// Runs the whole extraction, taking the mel filterbank from `cache`.
///
/// Any failing stage fails the run; no partial result is returned.
pub fn analyze_with_cache(
    signal: &Signal,
    config: &AnalysisConfig,
    cache: &FilterBankCache,
) -> Result<Analysis> {
    config.validate()?;
    let fft_size = config.resolved_fft_size()?;
    let samples = signal.samples();
    let sample_rate = signal.sample_rate();

    log::debug!("Pass 1: Power spectrogram...");
    let spectrogram = power_spectrogram(
        samples,
        sample_rate,
        config.frame_length,
        config.hop_length,
        fft_size,
    )?;
    let bank = cache.get_or_build(sample_rate, fft_size, config.n_mels)?;

    // The spectrogram is only read from here on; branches share it.
    log::debug!("Pass 2: Mel, spectral shape and tonal branches...");
    let (mel, (shape, tonal)) = rayon::join(
        || MelSpectrogram::compute(&bank, &spectrogram, config.top_db),
        || {
            rayon::join(
                || spectral_branch(&spectrogram, config),
                || tonal_branch(&spectrogram, config.hpss_kernel),
            )
        },
    );
    let mel = mel?;
    let (shape, contrast) = shape;
    let (chroma, tonnetz) = tonal;

    log::debug!("Pass 3: Cepstrum, temporal statistics and tempo...");
    let coeffs = mfcc(&mel.db, config.n_mfcc);
    let delta_coeffs = delta(&coeffs, config.delta_width);
    let temporal = TemporalFeatures::compute(samples, config.frame_length, config.hop_length);
    let mut envelope = onset_envelope(&mel.db);
    suppress_padded_frames(&mut envelope, samples.len(), config.frame_length, config.hop_length);
    let estimator = TempoEstimator {
        hop_seconds: config.hop_length as f32 / sample_rate as f32,
        min_bpm: config.tempo_range_bpm.0,
        max_bpm: config.tempo_range_bpm.1,
        start_bpm: config.start_bpm,
    };
    let tempo = estimator.estimate(&envelope);

    let moments = mel.db_moments();
    let band_energies = mel.band_energies();
    let ratios = BandRatios::from_energies(&band_energies);

    let mut mfcc_mean = [0.0; SUMMARIZED_MFCC];
    let mut mfcc_std = [0.0; SUMMARIZED_MFCC];
    for (i, (m, s)) in coefficient_stats(&coeffs, SUMMARIZED_MFCC).into_iter().enumerate() {
        mfcc_mean[i] = m;
        mfcc_std[i] = s;
    }

    let features = FeatureSet {
        duration: signal.duration(),
        mel_mean: moments.mean,
        mel_std: moments.std,
        mel_skew: moments.skew,
        mel_kurtosis: moments.kurtosis,
        dominant_mel_band: ratios.dominant_band,
        low_freq_ratio: ratios.low,
        mid_freq_ratio: ratios.mid,
        high_freq_ratio: ratios.high,
        mfcc_mean,
        mfcc_std,
        zcr_mean: mean(&temporal.zcr),
        rms_mean: mean(&temporal.rms),
        tempo: tempo as f64,
        spectral_centroid_mean: mean(&shape.centroid),
        spectral_bandwidth_mean: mean(&shape.bandwidth),
        spectral_rolloff_mean: mean(&shape.rolloff),
        spectral_contrast_mean: matrix_mean(&contrast),
        tonnetz_mean: matrix_mean(&tonnetz.mapv(f32::abs)),
    };

    log::info!(
        "Analysis: {:.2}s, {} frames, dominant band {}, tempo {:.1} BPM",
        features.duration,
        spectrogram.n_frames(),
        features.dominant_mel_band,
        features.tempo
    );

    let matrices = Matrices {
        sample_rate,
        hop_length: config.hop_length,
        waveform: samples.to_vec(),
        mel_spectrogram: mel.db,
        mfcc: coeffs,
        delta_mfcc: delta_coeffs,
        chroma,
        band_energies,
        spectral_centroid: shape.centroid,
        spectral_bandwidth: shape.bandwidth,
        spectral_rolloff: shape.rolloff,
        spectral_contrast: contrast,
        tonnetz,
        zcr: temporal.zcr,
        rms: temporal.rms,
        onset_envelope: envelope,
    };

    Ok(Analysis { features, matrices })
}

fn spectral_branch(
    spectrogram: &Spectrogram,
    config: &AnalysisConfig,
) -> (SpectralShape, Array2<f32>) {
    let shape = SpectralShape::compute(spectrogram, config.rolloff_fraction);
    let contrast = spectral_contrast(
        spectrogram,
        config.contrast_bands,
        config.contrast_fmin,
        config.contrast_quantile,
    );
    (shape, contrast)
}

/// Chromagram of the full spectrum and tonnetz of its harmonic part.
fn tonal_branch(spectrogram: &Spectrogram, hpss_kernel: usize) -> (Array2<f32>, Array2<f32>) {
    let freqs = spectrogram.frequencies();
    let chroma = chromagram(&spectrogram.power, &freqs);
    let harmonic = harmonic_power(&spectrogram.power, hpss_kernel);
    let tonnetz = tonnetz(&chromagram(&harmonic, &freqs));
    (chroma, tonnetz)
}

fn matrix_mean(matrix: &Array2<f32>) -> f64 {
    let values: Vec<f32> = matrix.iter().copied().collect();
    mean(&values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeatureError;

    fn noise(len: usize) -> Vec<f32> {
        // Deterministic LCG noise in [-0.5, 0.5)
        let mut state: u32 = 12345;
        (0..len)
            .map(|_| {
                state = state.wrapping_mul(1_103_515_245).wrapping_add(12345);
                (state >> 8) as f32 / (1u32 << 24) as f32 - 0.5
            })
            .collect()
    }

    #[test]
    fn invalid_config_fails_the_run() {
        let signal = Signal::new(vec![0.1; 1000], 8000).unwrap();
        let config = AnalysisConfig { frame_length: 0, ..Default::default() };
        assert!(matches!(
            analyze(&signal, &config),
            Err(FeatureError::InvalidInput(_))
        ));
    }

    #[test]
    fn fft_mismatch_fails_the_run() {
        let signal = Signal::new(vec![0.1; 1000], 8000).unwrap();
        let config = AnalysisConfig { fft_size: Some(256), ..Default::default() };
        assert!(matches!(
            analyze(&signal, &config),
            Err(FeatureError::TransformFailure(_))
        ));
    }

    #[test]
    fn matrix_shapes_agree() {
        let signal = Signal::new(noise(22050), 22050).unwrap();
        let config = AnalysisConfig::default();
        let analysis = analyze(&signal, &config).unwrap();
        let m = &analysis.matrices;
        let frames = m.n_frames();
        assert_eq!(frames, 22050usize.div_ceil(512));
        assert_eq!(m.mel_spectrogram.dim(), (128, frames));
        assert_eq!(m.mfcc.dim(), (20, frames));
        assert_eq!(m.delta_mfcc.dim(), (20, frames));
        assert_eq!(m.chroma.dim(), (12, frames));
        assert_eq!(m.tonnetz.dim(), (6, frames));
        assert_eq!(m.spectral_contrast.ncols(), frames);
        assert_eq!(m.band_energies.len(), 128);
        assert_eq!(m.zcr.len(), frames);
        assert_eq!(m.onset_envelope.len(), frames);
        assert_eq!(m.waveform.len(), 22050);
    }

    #[test]
    fn noise_features_are_finite() {
        let signal = Signal::new(noise(11025), 22050).unwrap();
        let analysis = analyze(&signal, &AnalysisConfig::default()).unwrap();
        for (name, value) in analysis.features.entries() {
            assert!(value.as_f64().is_finite(), "{} is not finite", name);
        }
        let f = &analysis.features;
        assert!((f.low_freq_ratio + f.mid_freq_ratio + f.high_freq_ratio - 1.0).abs() < 1e-9);
        assert!(f.spectral_contrast_mean > 0.0);
    }

    #[test]
    fn cache_is_shared_across_runs() {
        let cache = FilterBankCache::new();
        let signal = Signal::new(noise(4096), 16000).unwrap();
        let config = AnalysisConfig { n_mels: 40, ..Default::default() };
        let a = analyze_with_cache(&signal, &config, &cache).unwrap();
        let b = analyze_with_cache(&signal, &config, &cache).unwrap();
        assert_eq!(cache.len(), 1);
        assert_eq!(a.features, b.features);
    }
}
