//! Cache key derivation
//!
//! A key is the SHA256 of the command name and its arguments joined by single
//! spaces. Arguments are not escaped, so `["a b"]` and `["a", "b"]` derive the
//! same key. Keys depend on nothing but their inputs, which is what makes a
//! store directory portable between machines.

use sha2::{Digest, Sha256};
use std::ffi::OsStr;
use std::fmt;
use std::os::unix::ffi::OsStrExt;

/// Hex-encoded 256-bit digest identifying one (command, arguments) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive the key for an invocation
    pub fn derive<A: AsRef<OsStr>>(command: &str, args: &[A]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(command.as_bytes());
        hasher.update(b" ");
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                hasher.update(b" ");
            }
            hasher.update(arg.as_ref().as_bytes());
        }
        Self(hex::encode(hasher.finalize()))
    }

    /// Accept a directory name from the store if it is a well-formed key
    pub fn parse(hex: &str) -> Option<Self> {
        let well_formed = hex.len() == 64
            && hex
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        well_formed.then(|| Self(hex.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
