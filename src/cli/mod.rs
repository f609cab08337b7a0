//! Control-mode command line

pub mod args;
pub mod commands;

pub use args::{Cli, Commands};

use crate::environment::Activation;
use crate::error::CachenvResult;
use std::process::ExitCode;

/// Run a parsed control command
pub async fn run(cli: Cli, activation: &Activation) -> CachenvResult<ExitCode> {
    let dir = cli.dir;
    match cli.command {
        Commands::Init(args) => commands::init(args, activation).await?,
        Commands::Add(args) => commands::add(args, dir, activation).await?,
        Commands::Remove(args) => commands::remove(args, dir, activation).await?,
        Commands::Link(args) => commands::link(args, dir, activation).await?,
        Commands::Unlink(args) => commands::unlink(args, dir, activation).await?,
        Commands::Status => commands::status(dir, activation).await?,
        Commands::Key(args) => commands::key(args, dir, activation).await?,
        Commands::Diff(args) => {
            let code = commands::diff(args, dir, activation).await?;
            return Ok(ExitCode::from(u8::try_from(code).unwrap_or(1)));
        }
    }
    Ok(ExitCode::SUCCESS)
}
