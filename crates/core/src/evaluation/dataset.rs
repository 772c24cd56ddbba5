use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::shared::constants::{DATASET_AUDIO_DIR, DATASET_AUDIO_EXTENSION, DATASET_METADATA_FILE};

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed metadata on line {line}: '{content}'")]
    MalformedLine { line: usize, content: String },
}

/// One utterance of an LJSpeech-style dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetEntry {
    pub id: String,
    pub transcription: String,
    /// Transcription with numbers and abbreviations spelled out.
    pub normalized_transcription: String,
}

/// Parses `id|transcription|normalized_transcription` lines.
///
/// Blank lines are skipped. A line with only two fields reuses the raw
/// transcription as its normalized form.
pub fn parse_metadata(text: &str) -> Result<Vec<DatasetEntry>, DatasetError> {
    let mut entries = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        let mut fields = line.splitn(3, '|');
        let id = fields.next().unwrap_or_default().trim();
        let transcription = fields.next();
        let normalized = fields.next();

        let transcription = match transcription {
            Some(t) if !id.is_empty() => t,
            _ => {
                return Err(DatasetError::MalformedLine {
                    line: i + 1,
                    content: line.to_string(),
                })
            }
        };

        entries.push(DatasetEntry {
            id: id.to_string(),
            transcription: transcription.to_string(),
            normalized_transcription: normalized.unwrap_or(transcription).to_string(),
        });
    }
    Ok(entries)
}

/// A dataset laid out as `<root>/metadata.csv` plus `<root>/wavs/<id>.wav`.
#[derive(Debug, Clone)]
pub struct Dataset {
    root: PathBuf,
    entries: Vec<DatasetEntry>,
}

impl Dataset {
    pub fn open(root: &Path) -> Result<Self, DatasetError> {
        let path = root.join(DATASET_METADATA_FILE);
        let text = fs::read_to_string(&path).map_err(|source| DatasetError::Read {
            path: path.clone(),
            source,
        })?;
        let entries = parse_metadata(&text)?;
        log::info!("Loaded {} entries from {}", entries.len(), path.display());
        Ok(Self {
            root: root.to_path_buf(),
            entries,
        })
    }

    pub fn entries(&self) -> &[DatasetEntry] {
        &self.entries
    }

    pub fn audio_path(&self, entry: &DatasetEntry) -> PathBuf {
        self.root
            .join(DATASET_AUDIO_DIR)
            .join(format!("{}.{DATASET_AUDIO_EXTENSION}", entry.id))
    }
}
