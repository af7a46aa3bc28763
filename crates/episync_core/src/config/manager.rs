//! Reading and writing `episync.toml`.
//!
//! The file is always written whole to `<name>.toml.tmp` and renamed into
//! place. [`ConfigManager::update_section`] goes through `toml_edit` so that
//! hand edits in the other tables survive.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use toml_edit::{DocumentMut, Item};

use super::settings::{ConfigSection, Settings};

/// Config file failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Cannot serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Cannot edit config '{}': {source}", path.display())]
    Edit {
        path: PathBuf,
        #[source]
        source: toml_edit::TomlError,
    },

    #[error("No config file at '{}'", .0.display())]
    NotFound(PathBuf),
}

impl ConfigError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn parse(path: &Path, source: toml::de::Error) -> Self {
        Self::Parse {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result alias for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Owns the in-memory [`Settings`] and the file they came from.
pub struct ConfigManager {
    config_path: PathBuf,
    settings: Settings,
}

impl ConfigManager {
    /// Manager for `config_path` holding default settings until loaded.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            settings: Settings::default(),
        }
    }

    /// `.config/episync.toml` under the working directory.
    pub fn default_path() -> PathBuf {
        PathBuf::from(".config").join("episync.toml")
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// In-memory settings; nothing reaches disk until `save` or
    /// `update_section`.
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Read the file. A missing file is [`ConfigError::NotFound`].
    pub fn load(&mut self) -> ConfigResult<()> {
        if !self.config_path.exists() {
            return Err(ConfigError::NotFound(self.config_path.clone()));
        }

        let content = self.read()?;
        self.settings =
            toml::from_str(&content).map_err(|e| ConfigError::parse(&self.config_path, e))?;
        Ok(())
    }

    /// Read the file, or write the defaults when there is none.
    ///
    /// A file with missing or unknown keys is rewritten in canonical form.
    pub fn load_or_create(&mut self) -> ConfigResult<()> {
        if !self.config_path.exists() {
            self.settings = Settings::default();
            self.save()?;
            tracing::info!("Created default config at {}", self.config_path.display());
            return Ok(());
        }

        let content = self.read()?;
        let (settings, canonical) = parse_and_check(&self.config_path, &content)?;
        self.settings = settings;

        if !canonical {
            tracing::debug!("Normalizing config file {}", self.config_path.display());
            self.save()?;
        }
        Ok(())
    }

    /// Create the temp and logs folders and the registry's parent folder.
    pub fn ensure_dirs_exist(&self) -> ConfigResult<()> {
        let registry_parent = self
            .registry_path()
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf);

        for dir in [Some(self.temp_root()), Some(self.logs_folder()), registry_parent]
            .into_iter()
            .flatten()
        {
            fs::create_dir_all(&dir).map_err(|e| ConfigError::io(&dir, e))?;
        }
        Ok(())
    }

    pub fn logs_folder(&self) -> PathBuf {
        PathBuf::from(&self.settings.paths.logs_folder)
    }

    pub fn temp_root(&self) -> PathBuf {
        PathBuf::from(&self.settings.paths.temp_root)
    }

    pub fn registry_path(&self) -> PathBuf {
        PathBuf::from(&self.settings.paths.registry_path)
    }

    /// Write every section, each under its comment.
    pub fn save(&self) -> ConfigResult<()> {
        let content = self.render()?;
        self.atomic_write(&content)
    }

    /// Replace one table in the on-disk file with the in-memory section.
    ///
    /// Everything else in the file, comments included, is kept as it is on
    /// disk, even if it differs from memory.
    pub fn update_section(&mut self, section: ConfigSection) -> ConfigResult<()> {
        let on_disk = if self.config_path.exists() {
            self.read()?
        } else {
            String::new()
        };

        let mut doc = on_disk
            .parse::<DocumentMut>()
            .map_err(|source| ConfigError::Edit {
                path: self.config_path.clone(),
                source,
            })?;

        let replacement = self
            .section_toml(section)?
            .parse::<DocumentMut>()
            .map_err(|source| ConfigError::Edit {
                path: self.config_path.clone(),
                source,
            })?;
        doc[section.table_name()] = Item::Table(replacement.as_table().clone());

        self.atomic_write(&doc.to_string())
    }

    /// One section's fields without the table header.
    fn section_toml(&self, section: ConfigSection) -> ConfigResult<String> {
        let s = &self.settings;
        Ok(match section {
            ConfigSection::Paths => toml::to_string_pretty(&s.paths)?,
            ConfigSection::Logging => toml::to_string_pretty(&s.logging)?,
            ConfigSection::Search => toml::to_string_pretty(&s.search)?,
            ConfigSection::Speech => toml::to_string_pretty(&s.speech)?,
            ConfigSection::Confidence => toml::to_string_pretty(&s.confidence)?,
        })
    }

    fn render(&self) -> ConfigResult<String> {
        let s = &self.settings;
        let mut out = String::from(
            "# episync configuration\n\
             # Rewritten by episync; comments survive single-section updates.\n",
        );

        for section in ConfigSection::ALL {
            let table = match section {
                ConfigSection::Paths => named_table(section, &s.paths)?,
                ConfigSection::Logging => named_table(section, &s.logging)?,
                ConfigSection::Search => named_table(section, &s.search)?,
                ConfigSection::Speech => named_table(section, &s.speech)?,
                ConfigSection::Confidence => named_table(section, &s.confidence)?,
            };
            out.push_str(&format!("\n# {}\n{}", section.comment(), table));
        }
        Ok(out)
    }

    fn read(&self) -> ConfigResult<String> {
        fs::read_to_string(&self.config_path).map_err(|e| ConfigError::io(&self.config_path, e))
    }

    fn atomic_write(&self, content: &str) -> ConfigResult<()> {
        let path = &self.config_path;
        let temp_path = path.with_extension("toml.tmp");

        let write = || -> io::Result<()> {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
            fs::rename(&temp_path, path)
        };
        write().map_err(|e| ConfigError::io(path, e))
    }
}

/// Serialize a section under its table name, nested tables included.
fn named_table<T: Serialize>(section: ConfigSection, value: &T) -> ConfigResult<String> {
    let mut table = toml::Table::new();
    table.insert(section.table_name().to_string(), toml::Value::try_from(value)?);
    Ok(toml::to_string_pretty(&table)?)
}

/// Parse settings and report whether `content` is already canonical.
fn parse_and_check(path: &Path, content: &str) -> ConfigResult<(Settings, bool)> {
    let settings: Settings = toml::from_str(content).map_err(|e| ConfigError::parse(path, e))?;
    let on_disk: toml::Table = toml::from_str(content).map_err(|e| ConfigError::parse(path, e))?;

    let canonical = toml::Value::Table(on_disk) == toml::Value::try_from(&settings)?;
    Ok((settings, canonical))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn load_or_create_creates_default() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(".config").join("episync.toml");

        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_create().unwrap();

        assert!(config_path.exists());
        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[paths]"));
        assert!(content.contains("[search]"));
        assert!(content.contains("[confidence.reference]"));
        assert!(content.contains("# Offset search range and resolution"));

        // The generated file reads back as the defaults
        let reread: Settings = toml::from_str(&content).unwrap();
        assert_eq!(reread, Settings::default());
    }

    #[test]
    fn load_or_create_preserves_existing() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("episync.toml");

        fs::write(&config_path, "[search]\ncoarse_step_ms = 250\n").unwrap();

        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_create().unwrap();

        assert_eq!(manager.settings().search.coarse_step_ms, 250);
        assert_eq!(manager.settings().search.fine_step_ms, 20);

        // Missing keys were filled in on disk
        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("coarse_step_ms = 250"));
        assert!(content.contains("fine_step_ms = 20"));
    }

    #[test]
    fn canonical_file_is_not_modified() {
        let settings = Settings::default();
        let content = toml::to_string_pretty(&settings).unwrap();
        let path = Path::new("episync.toml");
        let (_, canonical) = parse_and_check(path, &content).unwrap();
        assert!(canonical);

        let with_unknown = format!("{content}\n[legacy]\nkey = 1\n");
        let (_, canonical) = parse_and_check(path, &with_unknown).unwrap();
        assert!(!canonical);
    }

    #[test]
    fn invalid_toml_names_the_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("episync.toml");
        fs::write(&config_path, "[search\nmin_offset_ms = ").unwrap();

        let mut manager = ConfigManager::new(&config_path);
        let err = manager.load_or_create().unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("episync.toml"));
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let mut manager = ConfigManager::new(dir.path().join("missing.toml"));
        assert!(matches!(manager.load(), Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn update_section_only_changes_target() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("episync.toml");

        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_create().unwrap();

        // Hand edit to another section on disk
        let content = fs::read_to_string(&config_path).unwrap();
        fs::write(&config_path, content.replace("fine_step_ms = 20", "fine_step_ms = 5")).unwrap();

        manager.settings_mut().logging.compact = false;
        manager.update_section(ConfigSection::Logging).unwrap();

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("compact = false"));
        // The on-disk search section was left alone
        assert!(content.contains("fine_step_ms = 5"));
        assert!(content.contains("[paths]"));
    }

    #[test]
    fn update_nested_section() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("episync.toml");

        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_create().unwrap();

        manager.settings_mut().confidence.speech.high_score = 0.65;
        manager.update_section(ConfigSection::Confidence).unwrap();

        let mut reloaded = ConfigManager::new(&config_path);
        reloaded.load().unwrap();
        assert_eq!(reloaded.settings().confidence.speech.high_score, 0.65);
        assert_eq!(
            reloaded.settings().confidence.reference,
            crate::confidence::ConfidenceThresholds::reference()
        );
    }

    #[test]
    fn ensure_dirs_creates_configured_folders() {
        let dir = tempdir().unwrap();
        let mut manager = ConfigManager::new(dir.path().join("episync.toml"));
        {
            let paths = &mut manager.settings_mut().paths;
            paths.temp_root = dir.path().join("tmp").display().to_string();
            paths.logs_folder = dir.path().join("logs").display().to_string();
            paths.registry_path = dir.path().join("data/offsets.json").display().to_string();
        }

        manager.ensure_dirs_exist().unwrap();

        assert!(dir.path().join("tmp").is_dir());
        assert!(dir.path().join("logs").is_dir());
        assert!(dir.path().join("data").is_dir());
    }

    #[test]
    fn atomic_write_creates_no_temp_on_success() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("episync.toml");

        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_create().unwrap();

        let temp_path = config_path.with_extension("toml.tmp");
        assert!(!temp_path.exists());
    }
}
