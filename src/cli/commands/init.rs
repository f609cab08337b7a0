//! Init command - create an environment directory

use super::link::report_refresh;
use crate::cli::args::InitArgs;
use crate::config::ConfigManager;
use crate::environment::{script, Activation, Environment};
use crate::error::{CachenvError, CachenvResult};
use crate::links::LinkManager;
use crate::ui::{self, UiContext};

/// Execute the init command
pub async fn execute(args: InitArgs, activation: &Activation) -> CachenvResult<()> {
    let ctx = UiContext::detect();

    let root = std::path::absolute(&args.dir)
        .map_err(|e| CachenvError::io(format!("resolving {}", args.dir.display()), e))?;
    let env = Environment::new(root);

    ui::intro(&ctx, "cachenv init");

    env.ensure_dirs()?;

    let manager = ConfigManager::with_path(env.config_path());
    if manager.init_default().await? {
        ui::step_ok_detail(
            &ctx,
            "Created configuration",
            &manager.path().display().to_string(),
        );
    } else {
        ui::step_info(
            &ctx,
            &format!("Keeping existing {}", manager.path().display()),
        );
    }
    let config = manager.load().await?;

    let links = LinkManager::from_activation(&env, activation)?;
    let report = links.refresh_all(config.commands())?;

    script::write(&env, links.self_exe())?;
    ui::step_ok_detail(
        &ctx,
        "Wrote activate script",
        &env.activate_script_path().display().to_string(),
    );

    let result = report_refresh(&ctx, &report);

    println!();
    println!(
        "Activate with: source {}",
        env.activate_script_path().display()
    );

    result
}
