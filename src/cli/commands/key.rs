//! Key command - print the cache key of an invocation

use crate::cli::args::KeyArgs;
use crate::environment::{Activation, Environment};
use crate::error::CachenvResult;
use crate::store::{CacheKey, Store};
use std::path::PathBuf;
use tracing::{debug, info};

/// Execute the key command
///
/// Only `--path` needs an environment; plain key derivation works anywhere.
pub async fn execute(
    args: KeyArgs,
    dir: Option<PathBuf>,
    activation: &Activation,
) -> CachenvResult<()> {
    let (command, command_args) = args.invocation.split()?;
    let key = CacheKey::derive(command, command_args);

    let env = match Environment::resolve(dir, activation) {
        Ok(env) => Some(env),
        Err(e) if !args.path => {
            debug!("No environment for store lookup: {}", e);
            None
        }
        Err(e) => return Err(e),
    };

    match env {
        Some(env) => {
            let store = Store::new(env.data_dir());
            if store.exists(&key) {
                info!("Entry {} is cached", key);
            } else {
                info!("Entry {} is not cached", key);
            }

            if args.path {
                println!("{}", store.entry_dir(&key).display());
            } else {
                println!("{}", key);
            }
        }
        None => println!("{}", key),
    }

    Ok(())
}
