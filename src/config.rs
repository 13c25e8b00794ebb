use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};

use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

use crate::clock::{DateBasis, UnknownDateBasis};

static PROJECT_DIR: LazyLock<Option<ProjectDirs>> =
    LazyLock::new(|| ProjectDirs::from("fyi", "hydrate", "hydrate-tracker"));

pub const CONFIG_FILE_NAME: &str = "config.toml";

pub const ENV_DATA_DIR: &str = "HYDRATE_DATA_DIR";
pub const ENV_LOG_DIR: &str = "HYDRATE_LOG_DIR";
pub const ENV_DATE_BASIS: &str = "HYDRATE_DATE_BASIS";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unable to determine a home directory for app data")]
    NoHomeDirectory,

    #[error("Unable to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    DateBasis(#[from] UnknownDateBasis),
}

/// Optional overrides read from `config.toml`
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    log_dir: Option<PathBuf>,
    date_basis: Option<DateBasis>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Directory holding the storage slot
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
    pub date_basis: DateBasis,
}

impl TrackerConfig {
    /// Platform data directories, then `config.toml`, then environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let dirs = PROJECT_DIR.as_ref().ok_or(ConfigError::NoHomeDirectory)?;
        let config_path = dirs.config_dir().join(CONFIG_FILE_NAME);

        Self::with_data_dir(dirs.data_dir())
            .merge_file(&config_path)?
            .apply_env(|key| std::env::var(key).ok())
    }

    /// Defaults rooted at `data_dir`, logs in `data_dir/logs`
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            log_dir: data_dir.join("logs"),
            data_dir,
            date_basis: DateBasis::default(),
        }
    }

    /// A missing file is not an error
    pub fn merge_file(self, path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => self.merge_toml(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(self),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn merge_toml(mut self, contents: &str) -> Result<Self, toml::de::Error> {
        let file: ConfigFile = toml::from_str(contents)?;

        if let Some(data_dir) = file.data_dir {
            if file.log_dir.is_none() {
                self.log_dir = data_dir.join("logs");
            }
            self.data_dir = data_dir;
        }
        if let Some(log_dir) = file.log_dir {
            self.log_dir = log_dir;
        }
        if let Some(date_basis) = file.date_basis {
            self.date_basis = date_basis;
        }

        Ok(self)
    }

    pub fn apply_env(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| var(key).filter(|value| !value.trim().is_empty());

        if let Some(data_dir) = non_empty(ENV_DATA_DIR) {
            self.data_dir = PathBuf::from(data_dir);
        }
        if let Some(log_dir) = non_empty(ENV_LOG_DIR) {
            self.log_dir = PathBuf::from(log_dir);
        }
        if let Some(date_basis) = non_empty(ENV_DATE_BASIS) {
            self.date_basis = date_basis.parse()?;
        }

        Ok(self)
    }
}
