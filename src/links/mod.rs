//! Link management for PATH interception
//!
//! Each memoized command owns a link pair:
//!
//! | Link | Target | Purpose |
//! |------|--------|---------|
//! | `bin/<cmd>` | `../ogbin/cachenv` (relative) | what the shell runs |
//! | `ogbin/<cmd>` | absolute path of the real program | what a cache miss runs |
//!
//! `ogbin/cachenv` is the self link to the tool's executable. Interception
//! links go through it so the environment directory can be moved or copied
//! and relinked with a single `install_self_link`.

pub mod resolve;

use crate::config::validate_command_name;
use crate::environment::{Activation, Environment, ACTIVATE_NAME, CONTROL_NAME, OGBIN_DIR};
use crate::error::{CachenvError, CachenvResult};
use resolve::{find_program, Exclusions};
use std::collections::BTreeSet;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Outcome of a `refresh_all` pass
#[derive(Debug, Default)]
pub struct RefreshReport {
    /// Commands linked, with their resolved real targets
    pub linked: Vec<(String, PathBuf)>,
    /// Commands that could not be linked
    pub failed: Vec<(String, CachenvError)>,
    /// Stale interception links removed
    pub pruned: Vec<String>,
}

impl RefreshReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Maintains the interception and real-target link directories
#[derive(Debug, Clone)]
pub struct LinkManager {
    bin_dir: PathBuf,
    ogbin_dir: PathBuf,
    self_exe: PathBuf,
    search_path: OsString,
}

impl LinkManager {
    /// Link manager for `env`, pointing interception at `self_exe`
    pub fn new(env: &Environment, self_exe: PathBuf, search_path: OsString) -> Self {
        Self {
            bin_dir: env.bin_dir(),
            ogbin_dir: env.ogbin_dir(),
            self_exe,
            search_path,
        }
    }

    /// Link manager using the executable and search path of the activation context
    pub fn from_activation(env: &Environment, activation: &Activation) -> CachenvResult<Self> {
        let exe = activation
            .exe
            .clone()
            .ok_or_else(|| CachenvError::User("cannot determine the cachenv executable path".into()))?;
        let exe = absolute(&exe)?;
        Ok(Self::new(
            env,
            exe,
            activation.search_path.clone().unwrap_or_default(),
        ))
    }

    /// Executable interception links resolve to
    pub fn self_exe(&self) -> &Path {
        &self.self_exe
    }

    fn interception_link(&self, command: &str) -> PathBuf {
        self.bin_dir.join(command)
    }

    fn real_target_link(&self, command: &str) -> PathBuf {
        self.ogbin_dir.join(command)
    }

    fn self_link(&self) -> PathBuf {
        self.ogbin_dir.join(CONTROL_NAME)
    }

    /// Relative target of every interception link
    fn interception_target() -> PathBuf {
        Path::new("..").join(OGBIN_DIR).join(CONTROL_NAME)
    }

    fn ensure_dirs(&self) -> CachenvResult<()> {
        for dir in [&self.bin_dir, &self.ogbin_dir] {
            fs::create_dir_all(dir)
                .map_err(|e| CachenvError::io(format!("creating directory {}", dir.display()), e))?;
        }
        Ok(())
    }

    /// Point `ogbin/cachenv` at the tool's executable
    pub fn install_self_link(&self) -> CachenvResult<()> {
        self.ensure_dirs()?;
        let link = self.self_link();
        remove_link(&link)?;
        create_link(&self.self_exe, &link)?;
        debug!("Self link {} -> {}", link.display(), self.self_exe.display());
        Ok(())
    }

    /// Remove `ogbin/cachenv`; returns whether it existed
    pub fn remove_self_link(&self) -> CachenvResult<bool> {
        remove_link(&self.self_link())
    }

    /// Resolve the real program for `command`, never an interception link
    pub fn resolve(&self, command: &str) -> CachenvResult<PathBuf> {
        let excluded = [self.bin_dir.clone()];
        let exclusions = Exclusions {
            dirs: &excluded,
            executable: Some(&self.self_exe),
        };
        find_program(command, &self.search_path, &exclusions)
            .ok_or_else(|| CachenvError::CommandNotFound(command.to_string()))
    }

    /// Recreate the link pair for `command`; returns the real target
    pub fn refresh(&self, command: &str) -> CachenvResult<PathBuf> {
        validate_command_name(command)?;
        self.ensure_dirs()?;

        let interception = self.interception_link(command);
        let real_link = self.real_target_link(command);
        remove_link(&interception)?;
        remove_link(&real_link)?;

        let real = self.resolve(command)?;

        // The real-target link must exist before the command is intercepted.
        create_link(&real, &real_link)?;
        create_link(&Self::interception_target(), &interception)?;

        info!("Linked {} -> {}", command, real.display());
        Ok(real)
    }

    /// Remove the link pair for `command`; returns whether anything was removed
    pub fn remove(&self, command: &str) -> CachenvResult<bool> {
        validate_command_name(command)?;
        let interception = remove_link(&self.interception_link(command))?;
        let real = remove_link(&self.real_target_link(command))?;
        if interception || real {
            info!("Unlinked {}", command);
        }
        Ok(interception || real)
    }

    /// Refresh every registered command, then prune links for unregistered ones
    pub fn refresh_all<'a, I>(&self, commands: I) -> CachenvResult<RefreshReport>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let registered: BTreeSet<&str> = commands.into_iter().collect();
        let mut report = RefreshReport::default();

        self.install_self_link()?;

        for command in &registered {
            match self.refresh(command) {
                Ok(real) => report.linked.push((command.to_string(), real)),
                Err(e) => {
                    warn!("Failed to link {}: {}", command, e);
                    report.failed.push((command.to_string(), e));
                }
            }
        }

        for name in self.prune_dir(&self.bin_dir, &registered, &[ACTIVATE_NAME, CONTROL_NAME])? {
            info!("Removed stale link for {}", name);
            report.pruned.push(name);
        }
        for name in self.prune_dir(&self.ogbin_dir, &registered, &[CONTROL_NAME])? {
            debug!("Removed stale real-target link for {}", name);
        }

        Ok(report)
    }

    /// Remove every link pair and the self link; returns the commands unlinked
    pub fn teardown(&self) -> CachenvResult<Vec<String>> {
        let none = BTreeSet::new();
        let removed = self.prune_dir(&self.bin_dir, &none, &[ACTIVATE_NAME])?;
        self.prune_dir(&self.ogbin_dir, &none, &[CONTROL_NAME])?;
        self.remove_self_link()?;
        Ok(removed)
    }

    /// Whether `bin/<command>` is present
    pub fn is_intercepted(&self, command: &str) -> bool {
        fs::symlink_metadata(self.interception_link(command)).is_ok()
    }

    /// Target recorded by `ogbin/<command>`, if linked
    pub fn real_target(&self, command: &str) -> Option<PathBuf> {
        fs::read_link(self.real_target_link(command)).ok()
    }

    /// Remove symlinks in `dir` whose names are neither registered nor protected
    fn prune_dir(
        &self,
        dir: &Path,
        registered: &BTreeSet<&str>,
        protected: &[&str],
    ) -> CachenvResult<Vec<String>> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => {
                return Err(CachenvError::io(
                    format!("reading directory {}", dir.display()),
                    e,
                ))
            }
        };

        let mut removed = vec![];
        for entry in entries {
            let entry = entry.map_err(|e| CachenvError::io("reading link entry", e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if protected.contains(&name.as_str()) || registered.contains(name.as_str()) {
                continue;
            }

            let is_link = entry.file_type().map(|t| t.is_symlink()).unwrap_or(false);
            if !is_link {
                debug!("Leaving non-link {} in {}", name, dir.display());
                continue;
            }

            remove_link(&entry.path())?;
            removed.push(name);
        }

        removed.sort();
        Ok(removed)
    }
}

fn absolute(path: &Path) -> CachenvResult<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|e| CachenvError::io("getting current directory", e))?;
    Ok(cwd.join(path))
}

/// Remove a link if present; returns whether it existed
fn remove_link(path: &Path) -> CachenvResult<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(CachenvError::io(format!("removing {}", path.display()), e)),
    }
}

fn create_link(target: &Path, link: &Path) -> CachenvResult<()> {
    symlink(target, link).map_err(|e| {
        CachenvError::io(
            format!("linking {} -> {}", link.display(), target.display()),
            e,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        env: Environment,
        tools: PathBuf,
        exe: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let env = Environment::new(temp.path().join("env"));
            env.ensure_dirs().unwrap();

            let tools = temp.path().join("tools");
            fs::create_dir_all(&tools).unwrap();
            for name in ["greet", "count", "stale"] {
                let path = tools.join(name);
                fs::write(&path, "#!/bin/sh\necho tool\n").unwrap();
                fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            }

            let exe = temp.path().join("install/cachenv");
            fs::create_dir_all(exe.parent().unwrap()).unwrap();
            fs::write(&exe, "#!/bin/sh\n").unwrap();
            fs::set_permissions(&exe, fs::Permissions::from_mode(0o755)).unwrap();

            Self {
                _temp: temp,
                env,
                tools,
                exe,
            }
        }

        /// Search path with the interception directory first, as when activated
        fn manager(&self) -> LinkManager {
            let search_path =
                std::env::join_paths([self.env.bin_dir(), self.tools.clone()]).unwrap();
            LinkManager::new(&self.env, self.exe.clone(), search_path)
        }

        fn link_targets(&self) -> Vec<(String, PathBuf)> {
            let mut targets = vec![];
            for dir in [self.env.bin_dir(), self.env.ogbin_dir()] {
                for entry in fs::read_dir(&dir).unwrap() {
                    let entry = entry.unwrap();
                    if let Ok(target) = fs::read_link(entry.path()) {
                        targets.push((entry.path().display().to_string(), target));
                    }
                }
            }
            targets.sort();
            targets
        }
    }

    #[test]
    fn refresh_creates_link_pair() {
        let fx = Fixture::new();
        let manager = fx.manager();
        manager.install_self_link().unwrap();

        let real = manager.refresh("greet").unwrap();

        assert_eq!(real, fx.tools.join("greet"));
        assert_eq!(manager.real_target("greet"), Some(fx.tools.join("greet")));
        assert_eq!(
            fs::read_link(fx.env.bin_dir().join("greet")).unwrap(),
            PathBuf::from("../ogbin/cachenv")
        );
        // The relative interception link resolves to the executable.
        assert_eq!(
            fs::canonicalize(fx.env.bin_dir().join("greet")).unwrap(),
            fs::canonicalize(&fx.exe).unwrap()
        );
    }

    #[test]
    fn refresh_while_intercepted_targets_real_program() {
        let fx = Fixture::new();
        let manager = fx.manager();
        manager.install_self_link().unwrap();

        manager.refresh("greet").unwrap();
        // bin/greet is now first on the search path; a second refresh must
        // still find the real program.
        let real = manager.refresh("greet").unwrap();
        assert_eq!(real, fx.tools.join("greet"));
    }

    #[test]
    fn refresh_unresolvable_command_fails() {
        let fx = Fixture::new();
        let err = fx.manager().refresh("no-such-tool").unwrap_err();
        assert!(matches!(err, CachenvError::CommandNotFound(_)));
        assert!(!fx.manager().is_intercepted("no-such-tool"));
    }

    #[test]
    fn refresh_rejects_control_name() {
        let fx = Fixture::new();
        let err = fx.manager().refresh("cachenv").unwrap_err();
        assert!(matches!(err, CachenvError::ReservedName(_)));
    }

    #[test]
    fn activate_script_survives_refresh_and_remove() {
        let fx = Fixture::new();
        let manager = fx.manager();
        crate::environment::script::write(&fx.env, &fx.exe).unwrap();

        let err = manager.refresh("activate").unwrap_err();
        assert!(matches!(err, CachenvError::ReservedName(_)));
        let err = manager.remove("activate").unwrap_err();
        assert!(matches!(err, CachenvError::ReservedName(_)));

        assert!(fx.env.activate_script_path().is_file());
    }

    #[test]
    fn refresh_all_is_idempotent() {
        let fx = Fixture::new();
        let manager = fx.manager();

        let first = manager.refresh_all(["greet", "count"]).unwrap();
        assert!(first.is_success());
        assert_eq!(first.linked.len(), 2);
        let targets = fx.link_targets();

        let second = manager.refresh_all(["greet", "count"]).unwrap();
        assert!(second.is_success());
        assert!(second.pruned.is_empty());
        assert_eq!(fx.link_targets(), targets);
    }

    #[test]
    fn refresh_all_prunes_orphans() {
        let fx = Fixture::new();
        let manager = fx.manager();
        manager.refresh_all(["greet", "stale"]).unwrap();
        let greet_target = manager.real_target("greet");

        let report = manager.refresh_all(["greet"]).unwrap();

        assert_eq!(report.pruned, vec!["stale".to_string()]);
        assert!(!manager.is_intercepted("stale"));
        assert_eq!(manager.real_target("stale"), None);
        assert!(manager.is_intercepted("greet"));
        assert_eq!(manager.real_target("greet"), greet_target);
        // Protected entries survive pruning.
        assert!(fs::symlink_metadata(fx.env.ogbin_dir().join("cachenv")).is_ok());
    }

    #[test]
    fn refresh_all_keeps_activate_script() {
        let fx = Fixture::new();
        fs::write(fx.env.activate_script_path(), "#!/bin/bash\n").unwrap();

        fx.manager().refresh_all(["greet"]).unwrap();

        assert!(fx.env.activate_script_path().is_file());
    }

    #[test]
    fn refresh_all_continues_past_failures() {
        let fx = Fixture::new();
        let report = fx.manager().refresh_all(["missing", "greet"]).unwrap();

        assert!(!report.is_success());
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "missing");
        assert_eq!(report.linked.len(), 1);
        assert_eq!(report.linked[0].0, "greet");
    }

    #[test]
    fn remove_and_teardown() {
        let fx = Fixture::new();
        let manager = fx.manager();
        manager.refresh_all(["greet", "count"]).unwrap();

        assert!(manager.remove("greet").unwrap());
        assert!(!manager.remove("greet").unwrap());
        assert!(!manager.is_intercepted("greet"));

        let removed = manager.teardown().unwrap();
        assert_eq!(removed, vec!["count".to_string()]);
        assert!(fs::read_dir(fx.env.ogbin_dir()).unwrap().next().is_none());
    }

    #[test]
    fn self_link_lifecycle() {
        let fx = Fixture::new();
        let manager = fx.manager();

        manager.install_self_link().unwrap();
        manager.install_self_link().unwrap();
        assert_eq!(
            fs::read_link(fx.env.ogbin_dir().join("cachenv")).unwrap(),
            fx.exe
        );

        assert!(manager.remove_self_link().unwrap());
        assert!(!manager.remove_self_link().unwrap());
    }
}
