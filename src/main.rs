//! cachenv - memoize shell commands
//!
//! One binary, two roles: invoked as `cachenv` it is the control CLI,
//! invoked through an interception link it serves that command from the store.

use cachenv::cli::Cli;
use cachenv::dispatch;
use cachenv::environment::Activation;
use cachenv::error::CachenvError;
use cachenv::invocation::Invocation;
use clap::Parser;
use console::style;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Log filter for intercepted commands, which take no flags
const LOG_VAR: &str = "CACHENV_LOG";

/// Set to `json` for machine-readable log lines
const LOG_FORMAT_VAR: &str = "CACHENV_LOG_FORMAT";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let activation = Activation::from_env();

    match Invocation::detect(std::env::args_os()) {
        Invocation::Control(argv) => {
            let cli = Cli::parse_from(argv);

            // 0 = warn, 1 = info, 2+ = debug
            let filter = match cli.verbose {
                0 => EnvFilter::new("cachenv=warn"),
                1 => EnvFilter::new("cachenv=info"),
                _ => EnvFilter::new("cachenv=debug"),
            };
            init_logging(filter);

            match cachenv::cli::run(cli, &activation).await {
                Ok(code) => code,
                Err(e) => fail(&e),
            }
        }
        Invocation::Intercepted { command, args } => {
            let filter = EnvFilter::try_from_env(LOG_VAR)
                .unwrap_or_else(|_| EnvFilter::new("cachenv=warn"));
            init_logging(filter);

            match dispatch::intercept(&command, &args, &activation).await {
                Ok(code) => ExitCode::from(u8::try_from(code & 0xff).unwrap_or(1)),
                Err(e) => fail(&e),
            }
        }
    }
}

/// Logs always go to stderr; stdout belongs to the memoized command.
fn init_logging(filter: EnvFilter) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr);

    if std::env::var_os(LOG_FORMAT_VAR).is_some_and(|format| format == "json") {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn fail(e: &CachenvError) -> ExitCode {
    eprintln!("{} {}", style("Error:").red().bold(), e);
    if let Some(hint) = e.hint() {
        eprintln!("{} {}", style("Hint:").yellow(), hint);
    }
    ExitCode::from(e.exit_code())
}
