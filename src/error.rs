//! Error types for cachenv
//!
//! All modules use `CachenvResult<T>` as their return type.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for cachenv operations
pub type CachenvResult<T> = Result<T, CachenvError>;

/// All errors that can occur in cachenv
#[derive(Error, Debug)]
pub enum CachenvError {
    // Activation errors
    #[error("cachenv directory not set; activate an environment or pass --dir")]
    NotActivated,

    // Configuration errors
    #[error("Configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("'{0}' is reserved by the cachenv environment and cannot be memoized")]
    ReservedName(String),

    #[error("Invalid command name: {0:?}")]
    InvalidCommandName(String),

    // Resolution errors
    #[error("Command not found on the search path: {0}")]
    CommandNotFound(String),

    // Store errors
    #[error("No cache entry for key {0}")]
    EntryNotFound(String),

    #[error("Cache entry artifact {path} is unreadable: {reason}")]
    EntryParse { path: PathBuf, reason: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    // Process errors
    #[error("Failed to start {command}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("{command} terminated by signal {signal}")]
    ProcessSignaled { command: String, signal: i32 },

    // Serialization errors
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("{0}")]
    User(String),
}

impl CachenvError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a spawn error for a program that could not be started
    pub fn spawn(command: impl Into<String>, source: io::Error) -> Self {
        Self::Spawn {
            command: command.into(),
            source,
        }
    }

    /// Process exit code to report for this error, following shell conventions
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Spawn { source, .. } => match source.kind() {
                io::ErrorKind::NotFound => 127,
                io::ErrorKind::PermissionDenied => 126,
                _ => 1,
            },
            Self::ProcessSignaled { signal, .. } => {
                u8::try_from(128 + (*signal).clamp(0, 127)).unwrap_or(1)
            }
            _ => 1,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::NotActivated => Some("Run: source <DIR>/bin/activate"),
            Self::ConfigNotFound(_) => Some("Run: cachenv init <DIR>"),
            Self::CommandNotFound(_) => Some("Install the program or fix PATH, then run: cachenv link"),
            Self::Spawn { .. } => Some("The real-target link may be stale. Run: cachenv link"),
            Self::EntryParse { .. } => {
                Some("The entry may be partially written; delete its directory under data/")
            }
            _ => None,
        }
    }
}
