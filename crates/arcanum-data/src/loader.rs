//! Data-pack file plumbing: which file backs a list, what format it is in,
//! and how its entries come off disk.
//!
//! Lists are split into [`RawEntry`] values in the file's own value model
//! (`ron::Value`, `serde_json::Value`, `toml::Value`) before any record type
//! is applied, so the pipeline can decode and reject entries one by one.

use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

// ===========================================================================
// Errors
// ===========================================================================

/// File-level failures. Any of these aborts the load of the whole pack.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// No file with this base name and a supported extension.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// `themes.ron` next to `themes.json`, for example.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// The file as a whole could not be parsed.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DataLoadError {
    fn parse(path: &Path, detail: impl ToString) -> Self {
        Self::Parse {
            file: path.to_path_buf(),
            detail: detail.to_string(),
        }
    }
}

// ===========================================================================
// Formats and discovery
// ===========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

impl Format {
    /// Probe order when looking for a base name.
    pub const ALL: [Format; 3] = [Format::Ron, Format::Toml, Format::Json];

    pub fn extension(self) -> &'static str {
        match self {
            Self::Ron => "ron",
            Self::Toml => "toml",
            Self::Json => "json",
        }
    }
}

/// Format of `path`, by extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    let extension = path.extension().and_then(|e| e.to_str());
    Format::ALL
        .into_iter()
        .find(|format| Some(format.extension()) == extension)
        .ok_or_else(|| DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        })
}

/// The one file in `dir` named `{base_name}.{ron,toml,json}`, if any.
///
/// More than one match is a [`DataLoadError::ConflictingFormats`].
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;
    for format in Format::ALL {
        let candidate = dir.join(format!("{base_name}.{}", format.extension()));
        if !candidate.exists() {
            continue;
        }
        if let Some(existing) = found {
            return Err(DataLoadError::ConflictingFormats {
                a: existing,
                b: candidate,
            });
        }
        found = Some(candidate);
    }
    Ok(found)
}

/// [`find_data_file`] for lists the pack cannot do without.
pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

// ===========================================================================
// Reading
// ===========================================================================

/// Read and parse `path` as a whole into `T`.
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| DataLoadError::parse(path, e)),
        Format::Json => serde_json::from_str(&content).map_err(|e| DataLoadError::parse(path, e)),
        Format::Toml => toml::from_str(&content).map_err(|e| DataLoadError::parse(path, e)),
    }
}

/// One list entry that parsed but has not been given a record type yet.
#[derive(Debug, Clone, PartialEq)]
pub enum RawEntry {
    Ron(ron::Value),
    Json(serde_json::Value),
    Toml(toml::Value),
}

impl RawEntry {
    /// Apply a record type. The error is the deserializer's message.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, String> {
        match self {
            Self::Ron(value) => value.into_rust().map_err(|e| e.to_string()),
            Self::Json(value) => serde_json::from_value(value).map_err(|e| e.to_string()),
            Self::Toml(value) => value.try_into().map_err(|e: toml::de::Error| e.to_string()),
        }
    }
}

/// Split a list file into its entries.
///
/// RON and JSON files are a top-level list. TOML files hold the list as an
/// array of tables under `toml_key`; an absent key is an empty list.
pub fn read_entries(path: &Path, toml_key: &str) -> Result<Vec<RawEntry>, DataLoadError> {
    let entries = match detect_format(path)? {
        Format::Ron => deserialize_file::<Vec<ron::Value>>(path)?
            .into_iter()
            .map(RawEntry::Ron)
            .collect(),
        Format::Json => deserialize_file::<Vec<serde_json::Value>>(path)?
            .into_iter()
            .map(RawEntry::Json)
            .collect(),
        Format::Toml => {
            let mut table: toml::Table = deserialize_file(path)?;
            match table.remove(toml_key) {
                None => Vec::new(),
                Some(toml::Value::Array(items)) => items.into_iter().map(RawEntry::Toml).collect(),
                Some(_) => {
                    return Err(DataLoadError::parse(
                        path,
                        format!("'{toml_key}' must be an array of tables"),
                    ));
                }
            }
        }
    };
    Ok(entries)
}

// ===========================================================================
// Tests
// ===========================================================================
