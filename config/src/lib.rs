//! Configuration loading for Carelog.
//!
//! ```toml
//! [ledger]
//! admin = "${CARELOG_ADMIN}"
//! max_sessions = 10000
//! logging_fee = 100
//! party_index_cap = 100
//! ```
//!
//! Every field is optional in the file. Missing values fall back to
//! [`LedgerSettings`] defaults, except the admin, which must come from the
//! file or from the caller.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use toml::de::Error as TomlError;

use carelog_types::{LedgerSettings, Principal, SettingsError};

#[derive(Debug, Default, Deserialize)]
pub struct CarelogConfig {
    pub ledger: Option<LedgerConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerConfig {
    /// Initial admin principal. `${ENV_VAR}` references are expanded.
    pub admin: Option<String>,
    pub max_sessions: Option<u64>,
    pub logging_fee: Option<u64>,
    pub party_index_cap: Option<usize>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config at {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config at {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: TomlError,
    },
    #[error("no admin principal configured")]
    MissingAdmin,
    #[error(transparent)]
    Invalid(#[from] SettingsError),
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => {
                Some(path.as_path())
            }
            ConfigError::MissingAdmin | ConfigError::Invalid(_) => None,
        }
    }
}

pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        let Some(end_rel) = rest[start + 2..].find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        let var = &rest[start + 2..start + 2 + end_rel];
        if !var.is_empty() {
            out.push_str(&env::var(var).unwrap_or_default());
        }
        rest = &rest[start + 2 + end_rel + 1..];
    }

    out.push_str(rest);
    out
}

impl CarelogConfig {
    /// Load from the default location. `Ok(None)` when no file exists.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    /// Load from an explicit path. `Ok(None)` when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file");
            return Ok(None);
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    /// Resolve into validated settings.
    ///
    /// `admin_override` wins over the file's `admin`.
    pub fn ledger_settings(
        &self,
        admin_override: Option<Principal>,
    ) -> Result<LedgerSettings, ConfigError> {
        let section = self.ledger.as_ref();
        let admin = admin_override
            .or_else(|| {
                section
                    .and_then(|ledger| ledger.admin.as_deref())
                    .map(|raw| Principal::new(expand_env_vars(raw)))
            })
            .ok_or(ConfigError::MissingAdmin)?;

        let settings = LedgerSettings::new(
            admin,
            section
                .and_then(|ledger| ledger.max_sessions)
                .unwrap_or(LedgerSettings::DEFAULT_MAX_SESSIONS),
            section
                .and_then(|ledger| ledger.logging_fee)
                .unwrap_or(LedgerSettings::DEFAULT_LOGGING_FEE),
            section
                .and_then(|ledger| ledger.party_index_cap)
                .unwrap_or(LedgerSettings::DEFAULT_PARTY_INDEX_CAP),
        )?;
        Ok(settings)
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".carelog").join("config.toml"))
}
