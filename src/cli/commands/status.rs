//! Status command - summarize an environment

use crate::config::ConfigManager;
use crate::environment::{Activation, Environment};
use crate::error::CachenvResult;
use crate::links::LinkManager;
use crate::store::Store;
use crate::ui::{self, UiContext};
use console::style;
use std::path::PathBuf;

/// Link state of one registered command
#[derive(Debug, PartialEq, Eq)]
enum LinkState {
    Linked(PathBuf),
    Unlinked,
}

/// Execute the status command
pub async fn execute(dir: Option<PathBuf>, activation: &Activation) -> CachenvResult<()> {
    let ctx = UiContext::detect();
    let env = Environment::resolve(dir, activation)?;
    let config = ConfigManager::with_path(env.config_path()).load().await?;
    let links = LinkManager::from_activation(&env, activation)?;
    let entries = Store::new(env.data_dir()).keys()?.len();

    ui::intro(&ctx, "cachenv status");

    println!("{}", style("Environment:").bold());
    ui::key_value(&ctx, "Root", &env.root().display().to_string());
    let active = activation.root.as_deref() == Some(env.root());
    ui::key_value_status(&ctx, "Active", if active { "yes" } else { "no" }, active);

    println!();
    println!("{}", style("Commands:").bold());
    let mut all_linked = true;
    for command in config.commands() {
        match link_state(&links, command) {
            LinkState::Linked(real) => {
                ui::key_value_status(&ctx, command, &real.display().to_string(), true)
            }
            LinkState::Unlinked => {
                all_linked = false;
                ui::key_value_status(&ctx, command, "not linked", false);
            }
        }
    }
    if config.memoize_commands.is_empty() {
        ui::key_value(&ctx, "(none)", "run: cachenv add <CMD>");
    }

    println!();
    println!("{}", style("Store:").bold());
    ui::key_value(
        &ctx,
        "Entries",
        &format!("{} (max_entries = {})", entries, config.cache.max_entries),
    );

    if !all_linked {
        println!();
        ui::step_warn_hint(&ctx, "Some commands are not linked", "run: cachenv link");
    }

    Ok(())
}

fn link_state(links: &LinkManager, command: &str) -> LinkState {
    match links.real_target(command) {
        Some(real) if links.is_intercepted(command) => LinkState::Linked(real),
        _ => LinkState::Unlinked,
    }
}
