//! On-disk layout of a cachenv environment
//!
//! ```text
//! DIR/
//!   cachenv.toml      registration document
//!   bin/              interception links + activate script (goes on PATH)
//!   ogbin/            real-target links + self link (never on PATH)
//!   data/             content-addressed store
//! ```

pub mod activation;
pub mod script;

pub use activation::Activation;

use crate::error::{CachenvError, CachenvResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name the control command is invoked as; also the self link name in `ogbin/`
pub const CONTROL_NAME: &str = "cachenv";

/// Registration document file name
pub const CONFIG_NAME: &str = "cachenv.toml";

/// Activate script file name inside `bin/`
pub const ACTIVATE_NAME: &str = "activate";

pub const BIN_DIR: &str = "bin";
pub const OGBIN_DIR: &str = "ogbin";
pub const DATA_DIR: &str = "data";

/// Paths of one environment rooted at a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    root: PathBuf,
}

impl Environment {
    /// Environment rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Pick the root from an explicit directory, falling back to the active one
    pub fn resolve(dir: Option<PathBuf>, activation: &Activation) -> CachenvResult<Self> {
        dir.or_else(|| activation.root.clone())
            .map(Self::new)
            .ok_or(CachenvError::NotActivated)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_NAME)
    }

    /// Directory of interception links
    pub fn bin_dir(&self) -> PathBuf {
        self.root.join(BIN_DIR)
    }

    /// Private directory of real-target links
    pub fn ogbin_dir(&self) -> PathBuf {
        self.root.join(OGBIN_DIR)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join(DATA_DIR)
    }

    pub fn activate_script_path(&self) -> PathBuf {
        self.bin_dir().join(ACTIVATE_NAME)
    }

    /// Real-target link for `command`
    pub fn real_target(&self, command: &str) -> PathBuf {
        self.ogbin_dir().join(command)
    }

    /// Create the root and every subdirectory
    pub fn ensure_dirs(&self) -> CachenvResult<()> {
        for dir in [
            self.root.clone(),
            self.bin_dir(),
            self.ogbin_dir(),
            self.data_dir(),
        ] {
            fs::create_dir_all(&dir)
                .map_err(|e| CachenvError::io(format!("creating directory {}", dir.display()), e))?;
        }
        debug!("Environment directories ready under {}", self.root.display());
        Ok(())
    }
}
