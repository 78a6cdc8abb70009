//! Single-row feature table: a header line and one value line.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::{ExportError, Record};
use crate::audio::features::feature_names;

/// Quotes a field holding a separator, quote or line break.
fn escape(field: &str) -> String {
    if field.contains(|c: char| matches!(c, ',' | '"' | '\n' | '\r')) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

pub fn header() -> String {
    let mut columns = vec!["filename".to_string(), "category".to_string()];
    columns.extend(feature_names());
    columns.join(",")
}

pub fn row(record: &Record) -> String {
    let mut fields = vec![escape(&record.filename), record.category.to_string()];
    fields.extend(
        record
            .features
            .entries()
            .into_iter()
            .map(|(_, value)| value.to_string()),
    );
    fields.join(",")
}

pub fn write_csv(path: &Path, record: &Record) -> Result<(), ExportError> {
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "{}", header())?;
    writeln!(writer, "{}", row(record))?;
    writer.flush()?;
    log::info!("Features exported to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::features::FeatureSet;
    use crate::export::Category;

    #[test]
    fn header_starts_with_metadata_columns() {
        let header = header();
        assert!(header.starts_with("filename,category,duration,mel_mean,"));
        assert!(header.ends_with(",tonnetz_mean"));
        assert_eq!(header.split(',').count(), 29);
    }

    #[test]
    fn row_keeps_full_precision() {
        let features = FeatureSet {
            mel_mean: -41.123456789,
            dominant_mel_band: 3,
            ..Default::default()
        };
        let record = Record {
            filename: "a.wav".to_string(),
            category: Category::HumanVoice,
            features,
        };
        let row = row(&record);
        let fields: Vec<&str> = row.split(',').collect();
        assert_eq!(fields[0], "a.wav");
        assert_eq!(fields[1], "human_voice");
        assert_eq!(fields[3], "-41.123456789");
        assert_eq!(fields[7], "3");
        assert_eq!(fields.len(), 29);
    }

    #[test]
    fn file_names_with_commas_are_quoted() {
        assert_eq!(escape("a,b.wav"), "\"a,b.wav\"");
        assert_eq!(escape("plain.wav"), "plain.wav");
        assert_eq!(escape("x\"y,z"), "\"x\"\"y,z\"");
    }

    #[test]
    fn writes_header_and_one_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip_features.csv");
        let record = Record {
            filename: "clip.wav".to_string(),
            category: Category::Music,
            features: FeatureSet::default(),
        };
        write_csv(&path, &record).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], header());
        assert!(lines[1].starts_with("clip.wav,music,0,"));
    }
}
