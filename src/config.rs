//! Per-user application config.
//!
//! Stored as JSON at `<config dir>/pomocli/config.json` and created with
//! defaults on first run. `POMOCLI_HOME` overrides the directory.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{PersistenceError, Result};
use crate::timer::{DEFAULT_BREAK_SECS, DEFAULT_SESSION_SECS};

pub const DEFAULT_MESSAGE_SECS: u32 = 20;
pub const CONFIG_FILE: &str = "config.json";
pub const HOME_ENV: &str = "POMOCLI_HOME";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "PascalCase", default)]
pub struct AppConfig {
    /// Directory for project files. Empty means none configured.
    pub save_project_file_path: String,
    /// Seconds.
    pub default_session_time: u32,
    pub default_break_time: u32,
    /// How long a status message stays on screen, in seconds.
    pub default_message_time: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            save_project_file_path: String::new(),
            default_session_time: DEFAULT_SESSION_SECS,
            default_break_time: DEFAULT_BREAK_SECS,
            default_message_time: DEFAULT_MESSAGE_SECS,
        }
    }
}

impl AppConfig {
    /// Reads the config at `path`, writing defaults there if it is missing.
    ///
    /// A file that exists but cannot be parsed is left untouched and the
    /// defaults are used for this run.
    pub fn load_or_create(path: &Path) -> Result<Self, PersistenceError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                config.save(path)?;
                info!(path = %path.display(), "created default config");
                return Ok(config);
            }
            Err(e) => return Err(PersistenceError::io(path, e)),
        };

        match serde_json::from_str::<Self>(&raw) {
            Ok(config) => Ok(config.sanitized()),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable config, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), PersistenceError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| PersistenceError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| PersistenceError::Format {
            path: path.into(),
            source,
        })?;
        fs::write(path, json).map_err(|e| PersistenceError::io(path, e))
    }

    /// Zero durations are replaced by the defaults.
    fn sanitized(mut self) -> Self {
        let d = Self::default();
        if self.default_session_time == 0 {
            self.default_session_time = d.default_session_time;
        }
        if self.default_break_time == 0 {
            self.default_break_time = d.default_break_time;
        }
        if self.default_message_time == 0 {
            self.default_message_time = d.default_message_time;
        }
        self
    }

    pub fn project_dir(&self) -> Option<PathBuf> {
        let p = self.save_project_file_path.trim();
        (!p.is_empty()).then(|| PathBuf::from(p))
    }
}

/// Directory holding the config file and the log.
pub fn config_dir() -> PathBuf {
    if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(home);
    }
    dirs::config_dir()
        .map(|d| d.join("pomocli"))
        .unwrap_or_else(|| PathBuf::from(".pomocli"))
}
