//! Integration tests for cachenv

use assert_cmd::{cargo::cargo_bin_cmd, Command};
use predicates::prelude::*;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const EXE: &str = env!("CARGO_BIN_EXE_cachenv");

fn cachenv() -> Command {
    let mut cmd = cargo_bin_cmd!("cachenv");
    cmd.env_remove("CACHENV_DIR").env_remove("CACHENV_LOG");
    cmd
}

/// A temporary environment with one instrumented program, `greet`
struct Sandbox {
    temp: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("tools")).unwrap();

        let sandbox = Self { temp };
        let marker = sandbox.marker();
        sandbox.write_tool(
            "greet",
            &format!(
                "echo run >> '{}'\necho \"hello $*\"\necho warned >&2\nexit 3",
                marker.display()
            ),
        );
        sandbox
    }

    fn dir(&self) -> PathBuf {
        self.temp.path().join("env")
    }

    fn tools(&self) -> PathBuf {
        self.temp.path().join("tools")
    }

    fn marker(&self) -> PathBuf {
        self.temp.path().join("runs")
    }

    fn runs(&self) -> usize {
        fs::read_to_string(self.marker())
            .map(|s| s.lines().count())
            .unwrap_or(0)
    }

    fn write_tool(&self, name: &str, body: &str) {
        let path = self.tools().join(name);
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn search_path(&self, extra: &[PathBuf]) -> String {
        let mut dirs: Vec<PathBuf> = extra.to_vec();
        dirs.push(self.tools());
        dirs.push(PathBuf::from("/usr/bin"));
        dirs.push(PathBuf::from("/bin"));
        std::env::join_paths(dirs)
            .unwrap()
            .into_string()
            .unwrap()
    }

    /// Control command as run before activation
    fn control(&self) -> Command {
        let mut cmd = cachenv();
        cmd.env("CACHENV_EXE", EXE)
            .env("PATH", self.search_path(&[]));
        cmd
    }

    /// Control command as run inside an activated shell
    fn activated(&self) -> Command {
        let mut cmd = self.control();
        cmd.env("CACHENV_DIR", self.dir())
            .env("PATH", self.search_path(&[self.dir().join("bin")]));
        cmd
    }

    /// Run an intercepted command through its `bin/` link
    fn intercepted(&self, command: &str) -> Command {
        let mut cmd = Command::new(self.dir().join("bin").join(command));
        cmd.env("CACHENV_DIR", self.dir())
            .env("CACHENV_EXE", EXE)
            .env_remove("CACHENV_LOG")
            .env("PATH", self.search_path(&[self.dir().join("bin")]));
        cmd
    }

    fn init_with_greet(&self) {
        self.control()
            .arg("init")
            .arg(self.dir())
            .assert()
            .success();
        self.activated().args(["add", "greet"]).assert().success();
    }
}

fn read_link(path: &Path) -> PathBuf {
    fs::read_link(path).unwrap()
}

mod cli_tests {
    use super::*;

    #[test]
    fn help_displays() {
        cachenv()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("memoiz"));
    }

    #[test]
    fn version_displays() {
        cachenv()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("cachenv"));
    }

    #[test]
    fn init_creates_layout() {
        let sandbox = Sandbox::new();

        sandbox
            .control()
            .arg("init")
            .arg(sandbox.dir())
            .assert()
            .success()
            .stdout(predicate::str::contains("bin/activate"));

        let dir = sandbox.dir();
        assert!(dir.join("cachenv.toml").is_file());
        assert!(dir.join("data").is_dir());
        assert!(dir.join("bin/activate").is_file());
        assert_eq!(read_link(&dir.join("ogbin/cachenv")), PathBuf::from(EXE));
    }

    #[test]
    fn add_links_command() {
        let sandbox = Sandbox::new();
        sandbox.init_with_greet();

        let dir = sandbox.dir();
        assert_eq!(
            read_link(&dir.join("bin/greet")),
            PathBuf::from("../ogbin/cachenv")
        );
        assert_eq!(
            read_link(&dir.join("ogbin/greet")),
            sandbox.tools().join("greet")
        );
        assert!(fs::read_to_string(dir.join("cachenv.toml"))
            .unwrap()
            .contains("[memoize_commands.greet]"));
    }

    #[test]
    fn add_rejects_reserved_name() {
        let sandbox = Sandbox::new();
        sandbox.init_with_greet();

        sandbox
            .activated()
            .args(["add", "cachenv"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("reserved"));
    }

    #[test]
    fn add_without_environment_fails() {
        let sandbox = Sandbox::new();

        sandbox
            .control()
            .args(["add", "greet"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("not set"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn status_lists_commands() {
        let sandbox = Sandbox::new();
        sandbox.init_with_greet();

        sandbox
            .activated()
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("greet"))
            .stdout(predicate::str::contains("max_entries = 1000"));
    }

    #[test]
    fn key_prints_hash() {
        cachenv()
            .args(["key", "ls", "-a"])
            .assert()
            .success()
            .stdout("5c1fa7f4f5a9dc65179c7eb464b22c7d8f4c2582e2f5e3d375a62474e936bfc1\n");
    }

    #[test]
    fn key_keeps_command_flags() {
        cachenv()
            .args(["key", "grep", "-v", "x"])
            .assert()
            .success()
            .stdout("543356e0093f75e4021691bfb2189a9efb8aba0b96e58d390691649288ec3751\n");
    }

    #[test]
    fn unlink_then_link() {
        let sandbox = Sandbox::new();
        sandbox.init_with_greet();
        let link = sandbox.dir().join("bin/greet");

        sandbox.activated().arg("unlink").assert().success();
        assert!(!link.is_symlink());

        sandbox.activated().arg("link").assert().success();
        assert!(link.is_symlink());
    }

    #[test]
    fn remove_unlinks_command() {
        let sandbox = Sandbox::new();
        sandbox.init_with_greet();

        sandbox
            .activated()
            .args(["remove", "greet"])
            .assert()
            .success();

        assert!(!sandbox.dir().join("bin/greet").is_symlink());
        assert!(!fs::read_to_string(sandbox.dir().join("cachenv.toml"))
            .unwrap()
            .contains("greet"));
    }
}

mod memoization_tests {
    use super::*;

    #[test]
    fn miss_then_hit() {
        let sandbox = Sandbox::new();
        sandbox.init_with_greet();

        for _ in 0..2 {
            sandbox
                .intercepted("greet")
                .arg("world")
                .assert()
                .code(3)
                .stdout("hello world\n")
                .stderr(predicate::str::contains("warned"));
        }

        assert_eq!(sandbox.runs(), 1);

        let entry = sandbox
            .dir()
            .join("data/8ddaa08e09896c577e2e8036be7b8a65cec5209eca01b8060e8abbff45274ff1");
        assert_eq!(fs::read(entry.join("out")).unwrap(), b"hello world\n");
        assert_eq!(fs::read(entry.join("err")).unwrap(), b"warned\n");
        assert_eq!(fs::read_to_string(entry.join("status")).unwrap().trim(), "3");
    }

    #[test]
    fn different_args_miss() {
        let sandbox = Sandbox::new();
        sandbox.init_with_greet();

        sandbox.intercepted("greet").arg("a").assert().code(3);
        sandbox.intercepted("greet").arg("b").assert().code(3);

        assert_eq!(sandbox.runs(), 2);
    }

    #[test]
    fn intercepted_without_activation_fails() {
        let sandbox = Sandbox::new();
        sandbox.init_with_greet();

        sandbox
            .intercepted("greet")
            .env_remove("CACHENV_DIR")
            .assert()
            .failure()
            .stderr(predicate::str::contains("not set"));

        assert_eq!(sandbox.runs(), 0);
    }

    #[test]
    fn removed_program_reports_not_found() {
        let sandbox = Sandbox::new();
        sandbox.init_with_greet();
        fs::remove_file(sandbox.tools().join("greet")).unwrap();

        sandbox.intercepted("greet").arg("x").assert().code(127);
    }

    #[test]
    fn diff_without_entry_fails() {
        let sandbox = Sandbox::new();
        sandbox.init_with_greet();

        sandbox
            .activated()
            .args(["diff", "greet", "nobody"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No cache entry"));
    }

    #[test]
    fn diff_detects_changed_output() {
        let sandbox = Sandbox::new();
        sandbox.init_with_greet();
        sandbox.intercepted("greet").arg("world").assert().code(3);

        sandbox
            .activated()
            .args(["diff", "greet", "world"])
            .assert()
            .success();

        sandbox.write_tool("greet", "echo \"goodbye $*\"");
        sandbox
            .activated()
            .args(["diff", "greet", "world"])
            .assert()
            .code(1)
            .stdout(predicate::str::contains("goodbye world"));
    }
}
