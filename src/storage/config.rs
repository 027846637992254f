use super::Result;
use crate::api::client::{ClientOptions, DEFAULT_TIMEOUT_SECS};
use crate::api::query::QueryVariant;
use crate::core::payload::PartyEncodingConfig;
use crate::display::columns::{ColumnStrategy, ColumnStrategyKind};
use crate::error::StorageError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const APP_DIR_NAME: &str = "worksearch";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DEFAULT_PROFILE_NAME: &str = "default";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

/// Connection and rendering settings for one search endpoint.
///
/// Unset fields fall back to the built-in defaults.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrity_header: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_variant: Option<QueryVariant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_strategy: Option<ColumnStrategyKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declared_columns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub party_encoding: Option<PartyEncodingConfig>,
}

impl Profile {
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            timeout_secs: self.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS),
            integrity_header: self.integrity_header.unwrap_or(true),
            variant: self.query_variant.unwrap_or_default(),
        }
    }

    pub fn column_strategy(&self) -> ColumnStrategy {
        ColumnStrategy::from_kind(
            self.column_strategy.unwrap_or_default(),
            self.declared_columns.as_deref(),
        )
    }

    pub fn party_encoding(&self) -> PartyEncodingConfig {
        self.party_encoding.unwrap_or_default()
    }
}

impl Config {
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p,
            None => Self::config_file_path()?,
        };

        if !config_path.exists() {
            log::debug!("no config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(|source| StorageError::FileIo {
            path: config_path.to_string_lossy().to_string(),
            source,
        })?;

        toml::from_str(&content).map_err(|e| StorageError::ConfigParseError {
            message: format!("{}: {}", config_path.display(), e),
        })
    }

    pub fn save(&self, path: Option<PathBuf>) -> Result<()> {
        let config_path = match path {
            Some(p) => p,
            None => Self::config_file_path()?,
        };

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|source| StorageError::FileIo {
                path: parent.to_string_lossy().to_string(),
                source,
            })?;
        }

        let toml_content = toml::to_string(self).map_err(|e| StorageError::ConfigSaveFailed {
            message: e.to_string(),
        })?;

        fs::write(&config_path, toml_content).map_err(|source| StorageError::FileIo {
            path: config_path.to_string_lossy().to_string(),
            source,
        })?;

        log::debug!("saved config to {}", config_path.display());
        Ok(())
    }

    /// `<config_dir>/worksearch/config.toml`
    pub fn config_file_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or(StorageError::ConfigDirNotFound)?;
        Ok(config_dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Config file inside an explicit directory, or the platform default.
    pub fn resolve_path(config_dir: Option<&Path>) -> Result<PathBuf> {
        match config_dir {
            Some(dir) => Ok(dir.join(CONFIG_FILE_NAME)),
            None => Self::config_file_path(),
        }
    }

    /// The explicitly requested profile, else the configured default, else `default`.
    pub fn active_profile_name(&self, requested: Option<&str>) -> String {
        requested
            .map(str::to_string)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| DEFAULT_PROFILE_NAME.to_string())
    }

    pub fn get_profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }

    pub fn profile_mut(&mut self, name: &str) -> &mut Profile {
        self.profiles.entry(name.to_string()).or_default()
    }

    pub fn set_profile(&mut self, name: String, profile: Profile) {
        self.profiles.insert(name, profile);
    }
}
