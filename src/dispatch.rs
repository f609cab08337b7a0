//! Hit/miss execution of intercepted commands
//!
//! A hit replays the stored stdout, stderr and exit code without spawning
//! anything. A miss runs the real-target link with both streams captured,
//! stores the result and then replays it. Stream interleaving is not
//! preserved: stdout is always emitted before stderr.

use crate::config::{Config, ConfigManager};
use crate::environment::{Activation, Environment};
use crate::error::{CachenvError, CachenvResult};
use crate::store::{CacheEntry, CacheKey, Store};
use std::ffi::OsString;
use std::io::{self, Write};
use std::os::unix::process::ExitStatusExt;
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Result of one memoized invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Replayed from the store
    Hit(CacheEntry),
    /// Executed and captured
    Miss(CacheEntry),
    /// Executed, killed by a signal, not stored
    Signaled {
        stdout: Vec<u8>,
        stderr: Vec<u8>,
        signal: i32,
    },
}

impl Outcome {
    fn streams(&self) -> (&[u8], &[u8]) {
        match self {
            Self::Hit(entry) | Self::Miss(entry) => {
                (entry.stdout.as_slice(), entry.stderr.as_slice())
            }
            Self::Signaled { stdout, stderr, .. } => (stdout.as_slice(), stderr.as_slice()),
        }
    }
}

/// Ties key derivation, the store and real-target execution together
pub struct Dispatcher {
    env: Environment,
    store: Store,
}

impl Dispatcher {
    pub fn new(env: Environment) -> Self {
        let store = Store::new(env.data_dir());
        Self { env, store }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Serve an intercepted invocation and return the exit code to report.
    /// Unregistered commands are passed through uncached.
    pub async fn run(
        &self,
        command: &str,
        args: &[OsString],
        config: &Config,
    ) -> CachenvResult<i32> {
        if !config.is_memoized(command) {
            info!("{} is not memoized; running it uncached", command);
            return self.passthrough(command, args).await;
        }

        let outcome = self.memoize(command, args).await?;
        let (stdout, stderr) = outcome.streams();
        emit(stdout, stderr)?;

        match outcome {
            Outcome::Hit(entry) | Outcome::Miss(entry) => Ok(entry.exit_code),
            Outcome::Signaled { signal, .. } => Err(CachenvError::ProcessSignaled {
                command: command.to_string(),
                signal,
            }),
        }
    }

    /// Look up the invocation, executing and storing it on a miss
    pub async fn memoize(&self, command: &str, args: &[OsString]) -> CachenvResult<Outcome> {
        let key = CacheKey::derive(command, args);

        if self.store.exists(&key) {
            debug!("Cache hit for {} ({})", command, key);
            return self.store.read(&key).map(Outcome::Hit);
        }

        debug!("Cache miss for {} ({})", command, key);
        let output = self.execute(command, args).await?;

        match exit_code(&output.status) {
            Ok(exit_code) => {
                let entry = CacheEntry {
                    stdout: output.stdout,
                    stderr: output.stderr,
                    exit_code,
                };
                // Caching is best effort; the caller still gets the result.
                if let Err(e) = self.store.write(&key, &entry) {
                    warn!("Failed to write cache entry for {}: {}", command, e);
                } else {
                    info!("Cached {} ({})", command, key);
                }
                Ok(Outcome::Miss(entry))
            }
            Err(signal) => {
                warn!("{} terminated by signal {}; not cached", command, signal);
                Ok(Outcome::Signaled {
                    stdout: output.stdout,
                    stderr: output.stderr,
                    signal,
                })
            }
        }
    }

    /// Run the real program with stdout and stderr captured
    pub async fn execute(
        &self,
        command: &str,
        args: &[OsString],
    ) -> CachenvResult<std::process::Output> {
        let program = self.env.real_target(command);
        debug!("Executing {} {:?}", program.display(), args);

        Command::new(&program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| CachenvError::spawn(command, e))
    }

    /// Run the real program with inherited streams
    async fn passthrough(&self, command: &str, args: &[OsString]) -> CachenvResult<i32> {
        let status = Command::new(self.env.real_target(command))
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| CachenvError::spawn(command, e))?;

        exit_code(&status).map_err(|signal| CachenvError::ProcessSignaled {
            command: command.to_string(),
            signal,
        })
    }
}

/// Serve an intercepted invocation in the active environment
pub async fn intercept(
    command: &str,
    args: &[OsString],
    activation: &Activation,
) -> CachenvResult<i32> {
    let env = Environment::resolve(None, activation)?;
    let config = ConfigManager::with_path(env.config_path()).load().await?;
    Dispatcher::new(env).run(command, args, &config).await
}

/// Exit code of a finished process, or the signal that killed it
fn exit_code(status: &ExitStatus) -> Result<i32, i32> {
    match status.code() {
        Some(code) => Ok(code),
        None => Err(status.signal().unwrap_or(0)),
    }
}

/// Write captured streams to the real stdout and stderr
fn emit(stdout: &[u8], stderr: &[u8]) -> CachenvResult<()> {
    write_stream(&mut io::stdout().lock(), stdout)
        .map_err(|e| CachenvError::io("writing stdout", e))?;
    write_stream(&mut io::stderr().lock(), stderr)
        .map_err(|e| CachenvError::io("writing stderr", e))?;
    Ok(())
}

/// A reader that went away (`cmd | head`) is not an error.
fn write_stream(stream: &mut impl Write, bytes: &[u8]) -> io::Result<()> {
    match stream.write_all(bytes).and_then(|()| stream.flush()) {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        result => result,
    }
}
