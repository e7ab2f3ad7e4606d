//! Settings configuration
//!
//! Manages user-configurable settings for the input method: which
//! schemes are enabled, their rotation order, and the preferred scheme.
//! Default values are defined in `config/default.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::scheme::registry::{SchemeMetadata, SchemeRegistry};

/// Default configuration TOML embedded from config/default.toml
const DEFAULT_CONFIG_TOML: &str = include_str!("../../config/default.toml");

/// Enabled set used when the configured one matches nothing.
pub const DEFAULT_ENABLED: &[&str] = &["cangjie", "english"];

/// Configuration settings for the input method
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Scheme enablement and ordering
    pub schemes: SchemeSettings,
}

/// Scheme-related settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemeSettings {
    /// Schemes the user has enabled, by id
    pub enabled: Vec<String>,
    /// Rotation order (scheme ids)
    pub order: Vec<String>,
    /// Scheme selected at startup
    pub preferred: String,
    /// Directory containing CIN table files (defaults to data_dir/tables)
    pub table_dir: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG_TOML).expect("embedded default.toml must be valid")
    }
}

impl SchemeSettings {
    /// Enabled schemes in the user's order, resolved against the
    /// registry. Falls back to the default enabled set when nothing in
    /// the configuration resolves.
    pub fn ordered_enabled(&self, registry: &SchemeRegistry) -> Vec<SchemeMetadata> {
        let result: Vec<SchemeMetadata> = self
            .order
            .iter()
            .filter(|id| self.enabled.iter().any(|e| e == *id))
            .filter_map(|id| registry.get(id))
            .cloned()
            .collect();
        if result.is_empty() {
            return DEFAULT_ENABLED
                .iter()
                .filter_map(|id| registry.get(id))
                .cloned()
                .collect();
        }
        result
    }
}

/// Recursively merge `overlay` TOML values on top of `base`.
fn merge_toml(base: &mut toml::Value, overlay: &toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                if let Some(base_value) = base_table.get_mut(key) {
                    merge_toml(base_value, value);
                } else {
                    base_table.insert(key.clone(), value.clone());
                }
            }
        }
        (base, _) => {
            *base = overlay.clone();
        }
    }
}

/// Parse user TOML content merged on top of default.toml.
fn parse_with_defaults(user_content: &str) -> Result<Settings> {
    let mut base: toml::Value = toml::from_str(DEFAULT_CONFIG_TOML)?;
    let user: toml::Value = toml::from_str(user_content)?;
    merge_toml(&mut base, &user);
    let settings: Settings = base.try_into()?;
    Ok(settings)
}

/// Get the project directories for cintab-im.
fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "cintab", "cintab-im")
}

impl Settings {
    /// Get the data directory path
    pub fn data_dir() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
    }

    /// Get the configuration directory path
    pub fn config_dir() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the configuration file path
    pub fn config_file() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Directory the scheme tables are read from.
    ///
    /// Default: `~/.local/share/cintab-im/tables/`
    pub fn table_dir(&self) -> Option<PathBuf> {
        match &self.schemes.table_dir {
            Some(dir) => Some(PathBuf::from(dir)),
            None => Self::data_dir().map(|dir| dir.join("tables")),
        }
    }

    /// Load settings from the default configuration file.
    /// Falls back to embedded default.toml if the config file does not exist.
    pub fn load() -> Result<Self> {
        let Some(config_file) = Self::config_file() else {
            warn!("Could not determine config directory, using defaults");
            return Ok(Self::default());
        };

        if !config_file.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }

        debug!("Loading config from {:?}", config_file);
        let content = fs::read_to_string(&config_file)?;
        parse_with_defaults(&content)
    }

    /// Load settings from a specific file, merged on top of defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        parse_with_defaults(&content)
    }

    /// Save settings to the default configuration file
    pub fn save(&self) -> Result<()> {
        let Some(config_file) = Self::config_file() else {
            anyhow::bail!("Could not determine config directory");
        };

        if let Some(parent) = config_file.parent() {
            fs::create_dir_all(parent)?;
        }

        debug!("Saving config to {:?}", config_file);
        let content = toml::to_string_pretty(self)?;
        fs::write(&config_file, content)?;
        Ok(())
    }

    /// Save settings to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
