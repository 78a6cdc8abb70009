//! JSON dump of the time-frequency matrices, for plotting elsewhere.

use ndarray::Array2;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::ExportError;
use crate::audio::features::Matrices;

/// Row-major matrix with its shape.
#[derive(Debug, Serialize)]
pub struct NamedMatrix {
    pub shape: [usize; 2],
    pub data: Vec<Vec<f32>>,
}

impl NamedMatrix {
    fn from_array(array: &Array2<f32>) -> Self {
        Self {
            shape: [array.nrows(), array.ncols()],
            data: array.rows().into_iter().map(|row| row.to_vec()).collect(),
        }
    }

    fn from_series(values: &[f32]) -> Self {
        Self {
            shape: [1, values.len()],
            data: vec![values.to_vec()],
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MatrixDump {
    pub sample_rate: u32,
    pub hop_length: usize,
    pub matrices: BTreeMap<&'static str, NamedMatrix>,
}

impl MatrixDump {
    pub fn new(m: &Matrices) -> Self {
        let mut matrices = BTreeMap::new();
        matrices.insert("waveform", NamedMatrix::from_series(&m.waveform));
        matrices.insert("mel_spectrogram", NamedMatrix::from_array(&m.mel_spectrogram));
        matrices.insert("mfcc", NamedMatrix::from_array(&m.mfcc));
        matrices.insert("delta_mfcc", NamedMatrix::from_array(&m.delta_mfcc));
        matrices.insert("chroma", NamedMatrix::from_array(&m.chroma));
        matrices.insert("band_energies", NamedMatrix::from_series(&m.band_energies));
        matrices.insert("spectral_centroid", NamedMatrix::from_series(&m.spectral_centroid));
        matrices.insert("spectral_bandwidth", NamedMatrix::from_series(&m.spectral_bandwidth));
        matrices.insert("spectral_rolloff", NamedMatrix::from_series(&m.spectral_rolloff));
        matrices.insert("spectral_contrast", NamedMatrix::from_array(&m.spectral_contrast));
        matrices.insert("tonnetz", NamedMatrix::from_array(&m.tonnetz));
        matrices.insert("zcr", NamedMatrix::from_series(&m.zcr));
        matrices.insert("rms", NamedMatrix::from_series(&m.rms));
        matrices.insert("onset_envelope", NamedMatrix::from_series(&m.onset_envelope));
        Self {
            sample_rate: m.sample_rate,
            hop_length: m.hop_length,
            matrices,
        }
    }
}

pub fn write_matrices(path: &Path, matrices: &Matrices) -> Result<(), ExportError> {
    let dump = MatrixDump::new(matrices);
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, &dump)?;
    writer.flush()?;
    log::info!("{} matrices written to {}", dump.matrices.len(), path.display());
    Ok(())
}
