//! Add and remove commands - change which commands are memoized

use crate::cli::args::CommandsArgs;
use crate::config::{validate_command_name, ConfigManager};
use crate::environment::{Activation, Environment};
use crate::error::{CachenvError, CachenvResult};
use crate::links::LinkManager;
use crate::ui::{self, UiContext};
use std::path::PathBuf;

/// Register each command and link it
///
/// A command that cannot be linked stays registered; the next `cachenv link`
/// retries it. Returns an error after processing every command if any failed.
pub async fn add(
    args: CommandsArgs,
    dir: Option<PathBuf>,
    activation: &Activation,
) -> CachenvResult<()> {
    let ctx = UiContext::detect();
    let env = Environment::resolve(dir, activation)?;

    for command in &args.commands {
        validate_command_name(command)?;
    }

    let manager = ConfigManager::with_path(env.config_path());
    let mut config = manager.load().await?;
    let mut changed = false;
    for command in &args.commands {
        if config.register(command) {
            changed = true;
        } else {
            ui::step_info(&ctx, &format!("{} is already memoized; relinking", command));
        }
    }
    if changed {
        manager.save(&config).await?;
    }

    let links = LinkManager::from_activation(&env, activation)?;
    links.install_self_link()?;

    let mut failed = 0;
    for command in &args.commands {
        match links.refresh(command) {
            Ok(real) => ui::step_ok_detail(
                &ctx,
                &format!("Memoizing {}", command),
                &real.display().to_string(),
            ),
            Err(e) => {
                failed += 1;
                ui::step_error_detail(&ctx, &format!("Failed to link {}", command), &e.to_string());
            }
        }
    }

    if failed > 0 {
        return Err(CachenvError::User(format!(
            "{} command(s) could not be linked",
            failed
        )));
    }
    Ok(())
}

/// Unregister each command and remove its links; cached entries are kept
pub async fn remove(
    args: CommandsArgs,
    dir: Option<PathBuf>,
    activation: &Activation,
) -> CachenvResult<()> {
    let ctx = UiContext::detect();
    let env = Environment::resolve(dir, activation)?;

    for command in &args.commands {
        validate_command_name(command)?;
    }

    let manager = ConfigManager::with_path(env.config_path());
    let mut config = manager.load().await?;
    let mut changed = false;
    for command in &args.commands {
        if config.unregister(command) {
            changed = true;
        } else {
            ui::step_warn(&ctx, &format!("{} is not memoized", command));
        }
    }
    if changed {
        manager.save(&config).await?;
    }

    let links = LinkManager::from_activation(&env, activation)?;
    for command in &args.commands {
        if links.remove(command)? {
            ui::step_ok(&ctx, &format!("Stopped memoizing {}", command));
        }
    }

    Ok(())
}
