//! Registration document loading and saving

pub mod schema;

pub use schema::{CacheConfig, CommandConfig, Config};

use crate::environment::{ACTIVATE_NAME, CONTROL_NAME};
use crate::error::{CachenvError, CachenvResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Configuration manager for one environment's registration document
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a config manager for a document path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Load the document; a missing file is an error
    pub async fn load(&self) -> CachenvResult<Config> {
        if !self.config_path.exists() {
            return Err(CachenvError::ConfigNotFound(self.config_path.clone()));
        }

        let content = fs::read_to_string(&self.config_path).await.map_err(|e| {
            CachenvError::io(
                format!("reading config from {}", self.config_path.display()),
                e,
            )
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| CachenvError::ConfigInvalid {
            path: self.config_path.clone(),
            reason: e.to_string(),
        })?;

        debug!(
            "Loaded {} memoized command(s) from {}",
            config.memoize_commands.len(),
            self.config_path.display()
        );
        Ok(config)
    }

    /// Save the document
    pub async fn save(&self, config: &Config) -> CachenvResult<()> {
        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            CachenvError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Write the default document unless one exists; returns whether it was created
    pub async fn init_default(&self) -> CachenvResult<bool> {
        if self.config_path.exists() {
            debug!("Config already present at {}", self.config_path.display());
            return Ok(false);
        }

        self.save(&Config::default()).await?;
        Ok(true)
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

/// Check that `command` can be used as an interception link name
pub fn validate_command_name(command: &str) -> CachenvResult<()> {
    // Both names live in bin/ alongside the interception links.
    if command == CONTROL_NAME || command == ACTIVATE_NAME {
        return Err(CachenvError::ReservedName(command.to_string()));
    }

    let invalid = command.is_empty()
        || command == "."
        || command == ".."
        || command.contains('/')
        || command.contains('\0');
    if invalid {
        return Err(CachenvError::InvalidCommandName(command.to_string()));
    }

    Ok(())
}
