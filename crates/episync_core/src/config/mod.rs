//! `episync.toml`: search, speech, confidence, logging and path settings.
//!
//! Missing keys fall back to defaults and the file is rewritten in full on
//! load when it is not canonical. [`ConfigManager::update_section`] swaps a
//! single table and leaves the rest of the file untouched.
//!
//! ```no_run
//! use episync_core::config::{ConfigManager, ConfigSection};
//!
//! let mut config = ConfigManager::new(ConfigManager::default_path());
//! config.load_or_create()?;
//!
//! config.settings_mut().search.sample_sec = 900.0;
//! config.update_section(ConfigSection::Search)?;
//! # Ok::<(), episync_core::config::ConfigError>(())
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    ConfidenceSettings, ConfigSection, LoggingSettings, PathSettings, SearchSettings, Settings,
    SpeechSettings,
};
