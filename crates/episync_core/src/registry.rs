//! Persistent offsets per episode.
//!
//! A small JSON document mapping episode name to the accepted offset of each
//! track:
//!
//! ```json
//! {
//!   "show_s01e01": { "jp": 480, "en": -120 }
//! }
//! ```
//!
//! Keys are kept sorted so the file diffs cleanly.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from reading or writing the registry.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Failed to access offset registry '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Offset registry '{}' is not valid JSON: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl RegistryError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Accepted offsets for one episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeOffsets {
    /// Japanese track offset in milliseconds.
    pub jp: i64,
    /// English track offset in milliseconds.
    pub en: i64,
}

/// Episode to offsets map backed by a JSON file.
#[derive(Debug, Clone)]
pub struct OffsetRegistry {
    path: PathBuf,
    entries: BTreeMap<String, EpisodeOffsets>,
}

impl OffsetRegistry {
    /// Load the registry, starting empty if the file does not exist.
    pub fn load(path: impl Into<PathBuf>) -> RegistryResult<Self> {
        let path = path.into();

        let entries = match fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => serde_json::from_str(&content).map_err(|source| RegistryError::Json {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(RegistryError::io(&path, e)),
        };

        Ok(Self { path, entries })
    }

    /// Registry file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Offsets for an episode.
    pub fn get(&self, episode: &str) -> Option<EpisodeOffsets> {
        self.entries.get(episode).copied()
    }

    /// Set the offsets for an episode, returning the previous value.
    pub fn set(
        &mut self,
        episode: impl Into<String>,
        offsets: EpisodeOffsets,
    ) -> Option<EpisodeOffsets> {
        self.entries.insert(episode.into(), offsets)
    }

    /// Number of episodes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry has no episodes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate episodes in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &EpisodeOffsets)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Write the registry atomically (temp file, then rename).
    pub fn save(&self) -> RegistryResult<()> {
        let json = serde_json::to_string_pretty(&self.entries).map_err(|source| {
            RegistryError::Json {
                path: self.path.clone(),
                source,
            }
        })?;

        self.atomic_write(&json)
            .map_err(|e| RegistryError::io(&self.path, e))?;

        tracing::debug!(
            "Saved {} episode offsets to {}",
            self.entries.len(),
            self.path.display()
        );
        Ok(())
    }

    fn atomic_write(&self, content: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = self.path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(content.as_bytes())?;
            file.write_all(b"\n")?;
            file.sync_all()?;
        }

        fs::rename(&temp_path, &self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let registry = OffsetRegistry::load(dir.path().join("offsets.json")).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn set_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("offsets.json");

        let mut registry = OffsetRegistry::load(&path).unwrap();
        registry.set("s01e02", EpisodeOffsets { jp: 480, en: -120 });
        let previous = registry.set("s01e01", EpisodeOffsets { jp: 0, en: 10 });
        assert!(previous.is_none());
        registry.save().unwrap();

        assert!(!path.with_extension("json.tmp").exists());

        let reloaded = OffsetRegistry::load(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.get("s01e02"), Some(EpisodeOffsets { jp: 480, en: -120 }));

        // Sorted keys
        let names: Vec<&str> = reloaded.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["s01e01", "s01e02"]);

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.find("s01e01").unwrap() < content.find("s01e02").unwrap());
        assert!(content.contains("\"jp\": 480"));
    }

    #[test]
    fn set_replaces_existing() {
        let dir = tempdir().unwrap();
        let mut registry = OffsetRegistry::load(dir.path().join("offsets.json")).unwrap();
        registry.set("ep", EpisodeOffsets { jp: 1, en: 2 });
        let previous = registry.set("ep", EpisodeOffsets { jp: 3, en: 4 });
        assert_eq!(previous, Some(EpisodeOffsets { jp: 1, en: 2 }));
        assert_eq!(registry.get("ep"), Some(EpisodeOffsets { jp: 3, en: 4 }));
    }

    #[test]
    fn invalid_json_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("offsets.json");
        fs::write(&path, "{ not json").unwrap();

        let err = OffsetRegistry::load(&path).unwrap_err();
        assert!(matches!(err, RegistryError::Json { .. }));
    }
}
