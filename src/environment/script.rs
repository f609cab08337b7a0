//! Generated `bin/activate` shell snippet

use super::Environment;
use crate::error::{CachenvError, CachenvResult};
use std::fs;
use std::path::Path;
use tracing::info;

/// Bash script that prepends `bin/` to PATH and exports the activation context.
/// `__CACHENV_EXE__` is substituted with the executable path at write time.
const ACTIVATE_TEMPLATE: &str = r#"#!/bin/bash
# DIR/bin/activate - source this file to activate cachenv

if [ -n "$CACHENV_DIR" ]; then
    echo "cachenv is already activated ($CACHENV_DIR)."
else
    CACHENV_BIN="$(cd "$(dirname "${BASH_SOURCE[0]}")" && pwd)"

    deactivate_cachenv() {
        if [ -z "$CACHENV_DIR" ]; then
            echo "cachenv is not activated."
            return
        fi

        export PATH="$CACHENV_OLD_PATH"
        unset CACHENV_OLD_PATH
        unset CACHENV_DIR
        unset CACHENV_EXE
        unalias cachenv 2>/dev/null
        unset -f deactivate_cachenv

        echo "cachenv deactivated."
    }

    export CACHENV_DIR="$(cd "$CACHENV_BIN/.." && pwd)"
    export CACHENV_EXE='__CACHENV_EXE__'
    export CACHENV_OLD_PATH="$PATH"
    export PATH="$CACHENV_BIN:$PATH"
    alias cachenv="$CACHENV_EXE"
    unset CACHENV_BIN

    echo "cachenv activated. Use 'deactivate_cachenv' to deactivate."
fi
"#;

/// Render the activate script for a given executable path
pub fn render(exe: &Path) -> String {
    // Single-quoted in the script; close, escape and reopen embedded quotes.
    let quoted = exe.to_string_lossy().replace('\'', r"'\''");
    ACTIVATE_TEMPLATE.replace("__CACHENV_EXE__", &quoted)
}

/// Write `bin/activate` with mode 0755
pub fn write(env: &Environment, exe: &Path) -> CachenvResult<()> {
    let path = env.activate_script_path();
    fs::write(&path, render(exe))
        .map_err(|e| CachenvError::io(format!("writing {}", path.display()), e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
            .map_err(|e| CachenvError::io(format!("setting permissions on {}", path.display()), e))?;
    }

    info!("Wrote activate script to {}", path.display());
    Ok(())
}
