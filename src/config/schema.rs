//! Registration document schema
//!
//! Stored as `DIR/cachenv.toml`:
//!
//! ```toml
//! [memoize_commands.ls]
//!
//! [cache]
//! max_entries = 1000
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Commands to memoize, keyed by name
    pub memoize_commands: BTreeMap<String, CommandConfig>,

    /// Store settings
    pub cache: CacheConfig,
}

impl Config {
    /// Whether `command` is registered
    pub fn is_memoized(&self, command: &str) -> bool {
        self.memoize_commands.contains_key(command)
    }

    /// Registered command names in sorted order
    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.memoize_commands.keys().map(String::as_str)
    }

    /// Register `command`; returns false if it was already present
    pub fn register(&mut self, command: &str) -> bool {
        if self.is_memoized(command) {
            return false;
        }
        self.memoize_commands
            .insert(command.to_string(), CommandConfig::default());
        true
    }

    /// Drop `command`; returns false if it was not registered
    pub fn unregister(&mut self, command: &str) -> bool {
        self.memoize_commands.remove(command).is_some()
    }
}

/// Per-command options (none yet)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandConfig {}

/// Store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Declared capacity in entries. Not enforced.
    pub max_entries: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { max_entries: 1000 }
    }
}
