//! Error types for pomocli.
//!
//! Nothing in here is fatal once the run loop has started: every variant is
//! turned into a short-lived status message by the command interpreter.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Malformed user input. Never alters state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a name for the session")]
    EmptyName,

    #[error("A session needs at least one repeat")]
    ZeroRepeats,

    #[error("A session needs a duration above zero")]
    ZeroDuration,

    #[error("Ignored invalid number '{0}'")]
    InvalidNumber(String),

    #[error("Please enter a name for the project")]
    EmptyProjectName,

    #[error("Set a project name first (project <name>) or give a file path")]
    MissingProjectName,
}

/// Failures while reading or writing project and config files.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// A relative path was given but no project directory is configured.
    #[error("Cannot resolve '{}': no project directory configured, use an absolute path", .0.display())]
    PathResolution(PathBuf),

    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON in {}: {source}", path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl PersistenceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(path)
        } else {
            Self::Io { path, source }
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
