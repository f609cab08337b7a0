//! Search-path resolution of real programs
//!
//! A plain PATH lookup run while an environment is active finds the
//! environment's own interception link first. Resolution therefore skips the
//! interception directory and any candidate that is, after following links,
//! the cachenv executable itself (e.g. another environment's `bin/`).

use std::ffi::OsStr;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directories and executables that must never be chosen as a real target
#[derive(Debug, Default)]
pub struct Exclusions<'a> {
    pub dirs: &'a [PathBuf],
    pub executable: Option<&'a Path>,
}

/// Find the first executable named `command` on `search_path`
pub fn find_program(
    command: &str,
    search_path: &OsStr,
    exclusions: &Exclusions<'_>,
) -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok();
    let own_exe = exclusions.executable.and_then(|p| fs::canonicalize(p).ok());

    for dir in std::env::split_paths(search_path) {
        // POSIX: an empty entry means the current directory.
        let dir = if dir.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            dir
        };
        let dir = match (&cwd, dir.is_relative()) {
            (Some(cwd), true) => cwd.join(dir),
            _ => dir,
        };

        if exclusions.dirs.iter().any(|excluded| same_dir(excluded, &dir)) {
            debug!("Skipping excluded search directory {}", dir.display());
            continue;
        }

        let candidate = dir.join(command);
        if !is_executable_file(&candidate) {
            continue;
        }

        if let Some(own) = &own_exe {
            if fs::canonicalize(&candidate).ok().as_ref() == Some(own) {
                debug!("Skipping {}: resolves to cachenv itself", candidate.display());
                continue;
            }
        }

        return Some(candidate);
    }

    None
}

fn same_dir(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn is_executable_file(path: &Path) -> bool {
    fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}
