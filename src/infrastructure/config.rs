use std::env;
use std::path::PathBuf;

use crate::domain::DomainError;

pub const BACKEND_URL_VAR: &str = "PNE_BACKEND_URL";
pub const TOKEN_FILE_VAR: &str = "PNE_TOKEN_FILE";
pub const SETTINGS_FILE_VAR: &str = "PNE_SETTINGS_FILE";
pub const EXPORT_DIR_VAR: &str = "PNE_EXPORT_DIR";
pub const OFFLINE_VAR: &str = "PNE_OFFLINE";

const DEFAULT_TOKEN_FILE: &str = ".pne-admin/token";
const DEFAULT_SETTINGS_FILE: &str = ".pne-admin/settings.json";

/// Runtime configuration, read from the environment (and `.env`).
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub backend_url: Option<String>,
    pub token_file: PathBuf,
    pub settings_file: PathBuf,
    pub export_dir: PathBuf,
    pub offline: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: None,
            token_file: PathBuf::from(DEFAULT_TOKEN_FILE),
            settings_file: PathBuf::from(DEFAULT_SETTINGS_FILE),
            export_dir: PathBuf::from("."),
            offline: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        Self {
            backend_url: get(BACKEND_URL_VAR),
            token_file: get(TOKEN_FILE_VAR).map(PathBuf::from).unwrap_or(defaults.token_file),
            settings_file: get(SETTINGS_FILE_VAR)
                .map(PathBuf::from)
                .unwrap_or(defaults.settings_file),
            export_dir: get(EXPORT_DIR_VAR).map(PathBuf::from).unwrap_or(defaults.export_dir),
            offline: get(OFFLINE_VAR)
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
                .unwrap_or(false),
        }
    }

    pub fn backend_url(&self) -> Result<&str, DomainError> {
        self.backend_url.as_deref().ok_or_else(|| {
            DomainError::validation(format!(
                "{} is not set; set it or run with --offline",
                BACKEND_URL_VAR
            ))
        })
    }
}
