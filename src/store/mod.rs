//! Content-addressed store of captured executions
//!
//! One directory per key under the data directory, each holding three flat
//! files so a store can be copied between hosts and read with ordinary tools:
//!
//! | File     | Content                       |
//! |----------|-------------------------------|
//! | `out`    | raw stdout bytes              |
//! | `err`    | raw stderr bytes              |
//! | `status` | exit code as decimal text     |
//!
//! Entries are staged in a dot-prefixed sibling directory and published with a
//! single rename, so readers never observe a half-written entry. When two
//! writers race on one key the first rename wins and the loser's staging
//! directory is discarded.

pub mod key;

pub use key::CacheKey;

use crate::error::{CachenvError, CachenvResult};
use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const STDOUT_FILE: &str = "out";
const STDERR_FILE: &str = "err";
const STATUS_FILE: &str = "status";
const STAGING_PREFIX: &str = ".staging-";

/// One captured execution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheEntry {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub exit_code: i32,
}

/// Filesystem-backed store rooted at a data directory
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Directory holding the entry for `key`
    pub fn entry_dir(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.as_str())
    }

    /// Path of the stored stdout for `key`
    pub fn stdout_path(&self, key: &CacheKey) -> PathBuf {
        self.entry_dir(key).join(STDOUT_FILE)
    }

    /// True iff a directory for `key` is present. Completeness is not checked.
    pub fn exists(&self, key: &CacheKey) -> bool {
        self.entry_dir(key).is_dir()
    }

    /// Persist `entry` under `key`
    pub fn write(&self, key: &CacheKey, entry: &CacheEntry) -> CachenvResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            CachenvError::io(format!("creating store directory {}", self.dir.display()), e)
        })?;

        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(&self.dir)
            .map_err(|e| CachenvError::io("creating staging directory", e))?;

        let status = entry.exit_code.to_string();
        let artifacts: [(&str, &[u8]); 3] = [
            (STDOUT_FILE, &entry.stdout),
            (STDERR_FILE, &entry.stderr),
            (STATUS_FILE, status.as_bytes()),
        ];
        for (name, bytes) in artifacts {
            let path = staging.path().join(name);
            fs::write(&path, bytes)
                .map_err(|e| CachenvError::io(format!("writing {}", path.display()), e))?;
        }

        // Staging directories are created 0700; published entries are shareable.
        fs::set_permissions(staging.path(), fs::Permissions::from_mode(0o755))
            .map_err(|e| CachenvError::io("setting entry permissions", e))?;

        // After a successful rename the staging path is gone and dropping the
        // guard is a no-op.
        let target = self.entry_dir(key);
        match fs::rename(staging.path(), &target) {
            Ok(()) => {
                debug!("Stored entry {}", key);
                Ok(())
            }
            Err(_) if target.is_dir() => {
                // Another writer published this key first; entries are immutable.
                debug!("Entry {} already published, discarding staged copy", key);
                Ok(())
            }
            Err(e) => Err(CachenvError::io(
                format!("publishing entry {}", target.display()),
                e,
            )),
        }
    }

    /// Read the entry for `key`; every artifact must be present and parse
    pub fn read(&self, key: &CacheKey) -> CachenvResult<CacheEntry> {
        let dir = self.entry_dir(key);
        let stdout = read_artifact(&dir.join(STDOUT_FILE))?;
        let stderr = read_artifact(&dir.join(STDERR_FILE))?;

        let status_path = dir.join(STATUS_FILE);
        let status = read_artifact(&status_path)?;
        let exit_code = std::str::from_utf8(&status)
            .ok()
            .and_then(|text| text.trim().parse::<i32>().ok())
            .ok_or_else(|| CachenvError::EntryParse {
                path: status_path.clone(),
                reason: format!("not a decimal exit code: {:?}", String::from_utf8_lossy(&status)),
            })?;

        Ok(CacheEntry {
            stdout,
            stderr,
            exit_code,
        })
    }

    /// All published keys, sorted. Staging leftovers and stray files are skipped.
    pub fn keys(&self) -> CachenvResult<Vec<CacheKey>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => {
                return Err(CachenvError::io(
                    format!("reading store directory {}", self.dir.display()),
                    e,
                ))
            }
        };

        let mut keys = vec![];
        for entry in entries {
            let entry = entry.map_err(|e| CachenvError::io("reading store entry", e))?;
            let name = entry.file_name();
            let Some(key) = name.to_str().and_then(CacheKey::parse) else {
                if name.to_string_lossy().starts_with(STAGING_PREFIX) {
                    warn!("Ignoring leftover staging directory {}", name.to_string_lossy());
                }
                continue;
            };
            if entry.path().is_dir() {
                keys.push(key);
            }
        }

        keys.sort();
        Ok(keys)
    }
}

fn read_artifact(path: &Path) -> CachenvResult<Vec<u8>> {
    fs::read(path).map_err(|e| CachenvError::io(format!("reading {}", path.display()), e))
}
