//! Report lines for the control commands
//!
//! Every helper has two renderings: a `cliclack` log line on a terminal and a
//! tagged plain line (`[OK] Linked ls (/usr/bin/ls)`) when piped.

use super::context::UiContext;
use console::{style, Style, StyledObject};

/// Plain-mode line: indented tag, then the message
fn plain(tag: StyledObject<&str>, message: &str) {
    println!("  {} {}", tag, message);
}

/// Title printed once at the top of `init` and `status`
pub fn intro(ctx: &UiContext, title: &str) {
    if ctx.use_fancy_output() {
        cliclack::intro(style(title).cyan().bold()).ok();
    } else {
        println!("{}\n", style(title).cyan().bold());
    }
}

/// A completed change, e.g. `Unlinked ls`
pub fn step_ok(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::success(message).ok();
    } else {
        plain(style("[OK]").green(), message);
    }
}

/// A completed change with the path or target it produced
pub fn step_ok_detail(ctx: &UiContext, message: &str, detail: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::success(format!("{} ({})", message, style(detail).dim())).ok();
    } else {
        plain(style("[OK]").green(), &format!("{} ({})", message, detail));
    }
}

/// Something left as-is that the user may want to act on
pub fn step_warn(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::warning(message).ok();
    } else {
        plain(style("[WARN]").yellow(), message);
    }
}

/// Warning plus the command that resolves it (`run: cachenv link`)
pub fn step_warn_hint(ctx: &UiContext, message: &str, hint: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::warning(format!("{} - {}", message, style(hint).dim())).ok();
    } else {
        plain(style("[WARN]").yellow(), &format!("{} - {}", message, hint));
    }
}

/// Per-command failure inside a batch; the batch itself carries on
pub fn step_error_detail(ctx: &UiContext, message: &str, detail: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::error(format!("{}: {}", message, style(detail).red())).ok();
    } else {
        plain(style("[FAIL]").red(), &format!("{}: {}", message, detail));
    }
}

pub fn step_info(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::info(message).ok();
    } else {
        plain(style("[INFO]").cyan(), message);
    }
}

/// `status` field, e.g. `Root: /home/me/env`
pub fn key_value(ctx: &UiContext, key: &str, value: &str) {
    if ctx.use_fancy_output() {
        println!("  {}: {}", style(key).dim(), value);
    } else {
        println!("  {}: {}", key, value);
    }
}

/// `status` field colored by health, such as a command's link state
pub fn key_value_status(ctx: &UiContext, key: &str, value: &str, ok: bool) {
    if ctx.use_fancy_output() {
        let value_style = if ok {
            Style::new().green()
        } else {
            Style::new().yellow()
        };
        println!("  {}: {}", style(key).dim(), value_style.apply_to(value));
    } else if ok {
        plain(style("[OK]").green(), &format!("{}: {}", key, value));
    } else {
        plain(style("[WARN]").yellow(), &format!("{}: {}", key, value));
    }
}
