//! External tools.
//!
//! Everything heavy (git, the editor's build, `dpkg-deb`) runs as a child
//! process. This module checks the tools are present and runs them.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Stdio;

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

/// Tools the pipeline needs, with the Debian package providing each.
pub const REQUIRED_TOOLS: &[(&str, &str)] = &[
  ("git", "git"),
  ("make", "make"),
  ("cmake", "cmake"),
  ("ninja", "ninja-build"),
  ("cc", "build-essential"),
  ("msgfmt", "gettext"),
  ("curl", "curl"),
  ("dpkg-deb", "dpkg"),
  ("fakeroot", "fakeroot"),
];

#[derive(Debug, Error)]
pub enum ToolError {
  #[error("missing required tools: {}\n  install them with: sudo apt-get install {}", tools.join(", "), packages.join(" "))]
  Missing { tools: Vec<String>, packages: Vec<String> },

  #[error("command failed with exit code {code:?}: {cmd}")]
  CmdFailed { cmd: String, code: Option<i32> },

  #[error("failed to run {cmd}: {source}")]
  Spawn { cmd: String, source: std::io::Error },
}

/// Locate every required tool on `PATH`.
///
/// # Errors
///
/// Returns [`ToolError::Missing`] listing every absent tool and the packages
/// to install. Nothing is installed automatically.
pub fn preflight() -> Result<Vec<(&'static str, PathBuf)>, ToolError> {
  preflight_in(REQUIRED_TOOLS, std::env::var_os("PATH"))
}

/// [`preflight`] against an explicit tool list and search path.
pub fn preflight_in(
  tools: &[(&'static str, &'static str)],
  path: Option<OsString>,
) -> Result<Vec<(&'static str, PathBuf)>, ToolError> {
  let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
  let mut found = Vec::new();
  let mut missing = Vec::new();

  for (tool, package) in tools {
    match which::which_in(tool, path.as_ref(), &cwd) {
      Ok(location) => {
        debug!(tool, path = %location.display(), "found tool");
        found.push((*tool, location));
      }
      Err(_) => missing.push((*tool, *package)),
    }
  }

  if missing.is_empty() {
    return Ok(found);
  }

  let tools = missing.iter().map(|(t, _)| t.to_string()).collect();
  let mut packages: Vec<String> = missing.iter().map(|(_, p)| p.to_string()).collect();
  packages.dedup();
  Err(ToolError::Missing { tools, packages })
}

/// A child process invocation.
#[derive(Debug, Clone)]
pub struct ToolCommand {
  program: OsString,
  args: Vec<OsString>,
  cwd: Option<PathBuf>,
}

impl ToolCommand {
  pub fn new(program: impl AsRef<OsStr>) -> Self {
    Self {
      program: program.as_ref().to_os_string(),
      args: Vec::new(),
      cwd: None,
    }
  }

  pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
    self.args.push(arg.as_ref().to_os_string());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
  {
    self.args.extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
    self
  }

  pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
    self.cwd = Some(dir.as_ref().to_path_buf());
    self
  }

  /// The command line, for logs and error messages.
  pub fn display(&self) -> String {
    std::iter::once(&self.program)
      .chain(&self.args)
      .map(|a| a.to_string_lossy())
      .collect::<Vec<_>>()
      .join(" ")
  }

  fn command(&self) -> Command {
    let mut command = Command::new(&self.program);
    command.args(&self.args).stdin(Stdio::null()).kill_on_drop(true);
    if let Some(cwd) = &self.cwd {
      command.current_dir(cwd);
    }
    command
  }

  /// Run with stdout/stderr passed through to the terminal.
  pub async fn run(&self) -> Result<(), ToolError> {
    let cmd = self.display();
    info!(cmd = %cmd, "running");

    let status = self
      .command()
      .status()
      .await
      .map_err(|source| ToolError::Spawn { cmd: cmd.clone(), source })?;

    if !status.success() {
      return Err(ToolError::CmdFailed {
        cmd,
        code: status.code(),
      });
    }
    Ok(())
  }

  /// Run and return trimmed stdout.
  pub async fn output(&self) -> Result<String, ToolError> {
    let cmd = self.display();
    debug!(cmd = %cmd, "capturing");

    let output = self
      .command()
      .output()
      .await
      .map_err(|source| ToolError::Spawn { cmd: cmd.clone(), source })?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if !stderr.is_empty() {
        debug!(stderr = %stderr, "command stderr");
      }
      return Err(ToolError::CmdFailed {
        cmd,
        code: output.status.code(),
      });
    }

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if !stdout.is_empty() {
      debug!(stdout = %stdout, "command output");
    }
    Ok(stdout)
  }
}
