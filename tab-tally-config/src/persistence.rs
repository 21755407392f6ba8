//! Preferences file I/O: YAML load/save with atomic writes.
//!
//! The default location is `<config dir>/tab-tally/preferences.yaml`
//! (XDG on Linux, Application Support on macOS, AppData on Windows).

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml_ng::{Mapping, Value};

use crate::config::Config;
use crate::error::Result;
use crate::migrate;

const APP_DIR: &str = "tab-tally";
const FILE_NAME: &str = "preferences.yaml";

impl Config {
    /// Directory holding the preferences file.
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }

    /// Full path of the preferences file.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join(FILE_NAME)
    }

    /// Load preferences from the default location, creating it with
    /// defaults when it does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load preferences from `path`.
    ///
    /// A missing file yields defaults, which are written back so the user has
    /// something to edit. Legacy keys are migrated and, if anything changed,
    /// the upgraded file is saved.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("Preferences not found, creating defaults at {:?}", path);
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        log::info!("Loading preferences from {:?}", path);
        let contents = fs::read_to_string(path)?;
        let (config, migrated) = Self::from_yaml(&contents)?;
        if migrated {
            log::info!("Saving migrated preferences to {:?}", path);
            config.save_to(path)?;
        }
        Ok(config)
    }

    /// Parse YAML text, applying migrations. Returns the config and whether
    /// any migration ran.
    pub fn from_yaml(contents: &str) -> Result<(Self, bool)> {
        let value: Value = serde_yaml_ng::from_str(contents)?;
        let mut mapping = match value {
            Value::Mapping(m) => m,
            // An empty file parses as null.
            Value::Null => Mapping::new(),
            other => {
                return Err(crate::ConfigError::Validation(format!(
                    "preferences must be a mapping, got {other:?}"
                )));
            }
        };
        let migrated = migrate::migrate(&mut mapping);
        let config: Config = serde_yaml_ng::from_value(Value::Mapping(mapping))?;
        config.validate()?;
        Ok((config, migrated))
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save to `path` atomically: write a temp file, then rename over.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml_ng::to_string(self)?;
        let temp_path = path.with_extension("yaml.tmp");
        fs::write(&temp_path, &yaml)?;
        fs::rename(&temp_path, path)?;
        log::debug!("Preferences saved to {:?}", path);
        Ok(())
    }
}
