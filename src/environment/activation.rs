//! Activation context captured once from the process environment
//!
//! The activate script exports these variables; nothing else in the crate
//! reads the process environment.

use std::ffi::OsString;
use std::path::PathBuf;

/// Marks activation and names the environment root
pub const DIR_VAR: &str = "CACHENV_DIR";

/// Absolute path of the cachenv executable
pub const EXE_VAR: &str = "CACHENV_EXE";

/// Search path used to resolve real programs
pub const PATH_VAR: &str = "PATH";

/// Snapshot of the variables the activate script maintains
#[derive(Debug, Clone, Default)]
pub struct Activation {
    /// Environment root, present only while activated
    pub root: Option<PathBuf>,
    /// The cachenv executable
    pub exe: Option<PathBuf>,
    /// Search path at invocation time
    pub search_path: Option<OsString>,
}

impl Activation {
    /// Capture from the current process
    pub fn from_env() -> Self {
        let mut activation = Self::from_lookup(|key| std::env::var_os(key));
        if activation.exe.is_none() {
            activation.exe = std::env::current_exe().ok();
        }
        activation
    }

    /// Capture through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.is_empty());
        Self {
            root: non_empty(DIR_VAR).map(PathBuf::from),
            exe: non_empty(EXE_VAR).map(PathBuf::from),
            search_path: non_empty(PATH_VAR),
        }
    }

    /// Whether an environment is active
    pub fn is_active(&self) -> bool {
        self.root.is_some()
    }
}
