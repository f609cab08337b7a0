//! CLI argument definitions using clap derive

use crate::error::{CachenvError, CachenvResult};
use clap::{ArgAction, Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;

/// cachenv - memoize shell commands
///
/// Commands registered in an environment are intercepted through PATH;
/// the first run executes the real program and records its output, later
/// runs with the same arguments replay it.
#[derive(Parser, Debug)]
#[command(name = "cachenv")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Environment directory (defaults to the active environment)
    #[arg(short, long, global = true)]
    pub dir: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an environment and its activate script
    Init(InitArgs),

    /// Memoize commands in the environment
    Add(CommandsArgs),

    /// Stop memoizing commands
    Remove(CommandsArgs),

    /// Resynchronize links with the configuration
    Link(LinkArgs),

    /// Remove every link from the environment
    Unlink(LinkArgs),

    /// Show environment, links and store summary
    Status,

    /// Print the cache key of an invocation
    Key(KeyArgs),

    /// Diff live stdout of an invocation against the cached stdout
    Diff(InvocationArgs),
}

/// Arguments for the init command
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Directory to create the environment in
    pub dir: PathBuf,
}

/// Arguments naming one or more commands
#[derive(Parser, Debug)]
pub struct CommandsArgs {
    /// Command names
    #[arg(required = true)]
    pub commands: Vec<String>,
}

/// Arguments for link and unlink
#[derive(Parser, Debug)]
pub struct LinkArgs {
    /// Environment directory (defaults to --dir or the active environment)
    pub dir: Option<PathBuf>,
}

/// A command invocation to inspect
///
/// Everything after the subcommand is taken verbatim, so the command's own
/// flags (`-v`, `-d`, `-h`) never reach cachenv's parser.
#[derive(Parser, Debug)]
pub struct InvocationArgs {
    /// Command name followed by its arguments
    #[arg(
        value_name = "COMMAND",
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub argv: Vec<OsString>,
}

impl InvocationArgs {
    /// Split into the command name and its arguments
    pub fn split(&self) -> CachenvResult<(&str, &[OsString])> {
        let (command, args) = self
            .argv
            .split_first()
            .ok_or_else(|| CachenvError::User("no command given".into()))?;
        let command = command.to_str().ok_or_else(|| {
            CachenvError::InvalidCommandName(command.to_string_lossy().into_owned())
        })?;
        Ok((command, args))
    }
}

/// Arguments for the key command
#[derive(Parser, Debug)]
pub struct KeyArgs {
    /// Print the entry directory instead of the key
    #[arg(long)]
    pub path: bool,

    #[command(flatten)]
    pub invocation: InvocationArgs,
}
