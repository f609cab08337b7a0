//! Diff command - compare live stdout with the cached stdout

use crate::cli::args::InvocationArgs;
use crate::dispatch::Dispatcher;
use crate::environment::{Activation, Environment};
use crate::error::{CachenvError, CachenvResult};
use crate::store::CacheKey;
use std::io::Write;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Execute the diff command; returns the exit code of `diff`
///
/// The real program runs through its real-target link, so the command must be
/// linked. The store is left untouched.
pub async fn execute(
    args: InvocationArgs,
    dir: Option<PathBuf>,
    activation: &Activation,
) -> CachenvResult<i32> {
    let (command, command_args) = args.split()?;
    let env = Environment::resolve(dir, activation)?;
    let dispatcher = Dispatcher::new(env);

    let key = CacheKey::derive(command, command_args);
    if !dispatcher.store().exists(&key) {
        return Err(CachenvError::EntryNotFound(key.to_string()));
    }

    let output = dispatcher.execute(command, command_args).await?;
    debug!(
        "Live run of {} exited with {:?}, {} bytes of stderr discarded",
        command,
        output.status.code(),
        output.stderr.len()
    );

    let mut live = tempfile::NamedTempFile::new()
        .map_err(|e| CachenvError::io("creating temporary file", e))?;
    live.write_all(&output.stdout)
        .and_then(|()| live.flush())
        .map_err(|e| CachenvError::io("writing live output", e))?;

    let status = Command::new("diff")
        .arg(dispatcher.store().stdout_path(&key))
        .arg(live.path())
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .map_err(|e| CachenvError::spawn("diff", e))?;

    Ok(status.code().unwrap_or(1))
}
