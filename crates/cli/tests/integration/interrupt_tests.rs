//! Signals during a packaging run still clean up the scratch directory.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::thread::sleep;
use std::time::{Duration, Instant};

use super::common::TestEnv;

const TOOLS: [&str; 9] = ["git", "make", "cmake", "ninja", "cc", "msgfmt", "curl", "dpkg-deb", "fakeroot"];

fn write_tool(dir: &Path, name: &str, body: &str) {
  let path = dir.join(name);
  fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
  fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
}

fn wait_until(timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
  let start = Instant::now();
  while start.elapsed() < timeout {
    if done() {
      return true;
    }
    sleep(Duration::from_millis(50));
  }
  done()
}

fn scratch_runs(env: &TestEnv) -> Vec<String> {
  fs::read_dir(env.temp.path().join("cache/nvdeb/work"))
    .map(|entries| {
      entries
        .filter_map(Result::ok)
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|name| name.starts_with("run-"))
        .collect()
    })
    .unwrap_or_default()
}

/// Start a build whose clone hangs, send `signal` once the clone is running,
/// and return how the process exited.
fn interrupt_during_clone(env: &TestEnv, signal: &str) -> ExitStatus {
  let bin = env.bin_dir();
  fs::create_dir_all(&bin).unwrap();
  let started = env.temp.path().join("clone-started");
  for tool in TOOLS {
    write_tool(&bin, tool, "exit 0");
  }
  write_tool(&bin, "git", &format!("touch '{}'\nexec sleep 30", started.display()));

  let mut child = Command::new(env!("CARGO_BIN_EXE_nvdeb"))
    .args(["--name", "neovim", "--output", "out"])
    .current_dir(env.temp.path())
    .env("XDG_CACHE_HOME", env.temp.path().join("cache"))
    .env("PATH", format!("{}:/usr/bin:/bin", bin.display()))
    .stdout(Stdio::null())
    .stderr(Stdio::null())
    .spawn()
    .unwrap();

  assert!(wait_until(Duration::from_secs(20), || started.exists()), "clone never started");
  assert_eq!(scratch_runs(env).len(), 1, "scratch directory not created");

  let sent = Command::new("kill")
    .args([signal, &child.id().to_string()])
    .status()
    .unwrap();
  assert!(sent.success());

  let mut status = None;
  let exited = wait_until(Duration::from_secs(20), || {
    status = child.try_wait().unwrap();
    status.is_some()
  });
  if !exited {
    child.kill().unwrap();
    panic!("nvdeb did not exit after {signal}");
  }
  status.unwrap()
}

#[test]
fn sigint_during_clone_removes_scratch() {
  let env = TestEnv::new();

  let status = interrupt_during_clone(&env, "-INT");

  assert_eq!(status.code(), Some(130));
  assert!(scratch_runs(&env).is_empty(), "left behind: {:?}", scratch_runs(&env));
}

#[test]
fn sigterm_during_clone_removes_scratch() {
  let env = TestEnv::new();

  let status = interrupt_during_clone(&env, "-TERM");

  assert_eq!(status.code(), Some(130));
  assert!(scratch_runs(&env).is_empty(), "left behind: {:?}", scratch_runs(&env));
}
