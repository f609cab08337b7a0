//! Link and unlink commands - resynchronize or tear down interception links

use crate::cli::args::LinkArgs;
use crate::config::ConfigManager;
use crate::environment::{Activation, Environment};
use crate::error::{CachenvError, CachenvResult};
use crate::links::{LinkManager, RefreshReport};
use crate::ui::{self, UiContext};
use std::path::PathBuf;

/// Execute the link command
pub async fn execute(
    args: LinkArgs,
    dir: Option<PathBuf>,
    activation: &Activation,
) -> CachenvResult<()> {
    let ctx = UiContext::detect();
    let env = Environment::resolve(args.dir.or(dir), activation)?;

    let config = ConfigManager::with_path(env.config_path()).load().await?;
    let links = LinkManager::from_activation(&env, activation)?;
    let report = links.refresh_all(config.commands())?;

    if report.linked.is_empty() && report.failed.is_empty() {
        ui::step_info(&ctx, "No commands are memoized");
    }
    report_refresh(&ctx, &report)
}

/// Execute the unlink command
pub async fn unlink(
    args: LinkArgs,
    dir: Option<PathBuf>,
    activation: &Activation,
) -> CachenvResult<()> {
    let ctx = UiContext::detect();
    let env = Environment::resolve(args.dir.or(dir), activation)?;

    let links = LinkManager::from_activation(&env, activation)?;
    let removed = links.teardown()?;

    for command in &removed {
        ui::step_ok(&ctx, &format!("Unlinked {}", command));
    }
    ui::step_info(
        &ctx,
        &format!(
            "Removed {} link(s); the store and configuration are untouched",
            removed.len()
        ),
    );

    Ok(())
}

/// Print a refresh report; fails when any command could not be linked
pub(crate) fn report_refresh(ctx: &UiContext, report: &RefreshReport) -> CachenvResult<()> {
    for (command, real) in &report.linked {
        ui::step_ok_detail(ctx, &format!("Linked {}", command), &real.display().to_string());
    }
    for command in &report.pruned {
        ui::step_warn_hint(
            ctx,
            &format!("Removed stale link for {}", command),
            "not in cachenv.toml",
        );
    }
    for (command, err) in &report.failed {
        ui::step_error_detail(ctx, &format!("Failed to link {}", command), &err.to_string());
    }

    if report.is_success() {
        Ok(())
    } else {
        Err(CachenvError::User(format!(
            "{} command(s) could not be linked",
            report.failed.len()
        )))
    }
}
