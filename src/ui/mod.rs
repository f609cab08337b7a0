//! Terminal output for the control commands
//!
//! Uses `cliclack` log lines in an interactive terminal and falls back to
//! plain `[OK]`/`[WARN]` lines when piped or running in CI. Intercepted
//! commands never print through this module.

mod context;
mod output;

pub use context::UiContext;
pub use output::{
    intro, key_value, key_value_status, step_error_detail, step_info, step_ok, step_ok_detail,
    step_warn, step_warn_hint,
};
