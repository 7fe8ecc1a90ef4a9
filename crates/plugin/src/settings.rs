//! Per-consumer settings files in a dedicated directory.
//!
//! A consumer is any pipeline part that loads settings: a policy, a
//! renderer, a whole plugin. Consumers are identified by a stable string ID;
//! one settings file per consumer, named `<consumer_id>.<ext>`. Only direct
//! children of the directory with a recognized extension are considered.

use serde::de::DeserializeOwned;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Serialization format of a settings file.
///
/// Only JSON is wired in; the enum leaves room for more.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
}

impl Format {
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Format::Json => &["json"],
        }
    }

    pub fn for_extension(ext: &str) -> Option<Format> {
        match ext {
            "json" => Some(Format::Json),
            _ => None,
        }
    }
}

/// A settings file found by [`SettingsDirectory::discover`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredSettings {
    pub consumer_id: String,
    pub file: PathBuf,
    pub format: Format,
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed settings: {0}")]
    Json(#[from] serde_json::Error),
}

/// A directory containing settings files for pipeline consumers.
#[derive(Debug, Clone)]
pub struct SettingsDirectory {
    path: PathBuf,
}

impl SettingsDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes a settings file for the given consumer, creating the
    /// directory if needed.
    pub fn write(&self, consumer_id: &str, format: Format, content: &str) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.path)?;
        let file = self.file_for(consumer_id, format);
        fs::write(&file, content)?;
        debug!(consumer = consumer_id, file = %file.display(), "settings written");
        Ok(file)
    }

    /// Lists the settings files present in the directory, sorted by
    /// consumer ID. Files with unrecognized extensions are skipped.
    pub fn discover(&self) -> io::Result<Vec<DiscoveredSettings>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut found = Vec::new();
        for entry in fs::read_dir(&self.path)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file = entry.path();
            let Some(ext) = file.extension().and_then(|e| e.to_str()) else {
                continue;
            };
            let Some(format) = Format::for_extension(ext) else {
                continue;
            };
            let Some(stem) = file.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            found.push(DiscoveredSettings {
                consumer_id: stem.to_owned(),
                file,
                format,
            });
        }
        found.sort_by(|a, b| a.consumer_id.cmp(&b.consumer_id));
        Ok(found)
    }

    /// Loads and deserializes the settings of the given consumer.
    ///
    /// `Ok(None)` means no settings file exists for the consumer, which is
    /// an expected outcome, not an error.
    pub fn load<T: DeserializeOwned>(&self, consumer_id: &str) -> Result<Option<T>, SettingsError> {
        let file = self.file_for(consumer_id, Format::Json);
        if !file.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&file)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn file_for(&self, consumer_id: &str, format: Format) -> PathBuf {
        self.path
            .join(format!("{consumer_id}.{}", format.extensions()[0]))
    }
}
