//! `update-alternatives` backend.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use super::{AlternativeBinding, AlternativeGroup, Alternatives, AlternativesError, Candidate, Mode, SlaveLink};

/// Acts on the host's alternatives database through `update-alternatives`.
#[derive(Debug, Clone)]
pub struct SystemAlternatives {
  program: PathBuf,
}

impl Default for SystemAlternatives {
  fn default() -> Self {
    Self::new("update-alternatives")
  }
}

impl SystemAlternatives {
  pub fn new(program: impl Into<PathBuf>) -> Self {
    Self { program: program.into() }
  }

  fn run<I, S>(&self, args: I) -> Result<String, AlternativesError>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
  {
    let mut command = Command::new(&self.program);
    // Errors are matched on their text, which is only stable untranslated.
    command.args(args).env("LC_ALL", "C").env_remove("LANGUAGE");
    debug!(command = ?command, "running update-alternatives");

    let output = command.output()?;
    if !output.status.success() {
      return Err(AlternativesError::CommandFailed {
        command: format!("{command:?}"),
        code: output.status.code(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
      });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
  }
}

impl Alternatives for SystemAlternatives {
  fn query(&self, name: &str) -> Result<Option<AlternativeGroup>, AlternativesError> {
    match self.run(["--query", name]) {
      Ok(stdout) => Ok(Some(parse_query(name, &stdout))),
      Err(AlternativesError::CommandFailed { stderr, .. }) if stderr.contains("no alternatives for") => Ok(None),
      Err(e) => Err(e),
    }
  }

  fn install(&mut self, binding: &AlternativeBinding, slave: Option<&SlaveLink>) -> Result<(), AlternativesError> {
    let priority = binding.priority.to_string();
    let mut args: Vec<&OsStr> = vec![
      OsStr::new("--install"),
      binding.link.as_os_str(),
      OsStr::new(&binding.name),
      binding.target.as_os_str(),
      OsStr::new(&priority),
    ];
    if let Some(slave) = slave {
      args.extend([
        OsStr::new("--slave"),
        slave.link.as_os_str(),
        OsStr::new(&slave.name),
        slave.target.as_os_str(),
      ]);
    }
    self.run(args).map(drop)
  }

  fn remove(&mut self, name: &str, target: &Path) -> Result<(), AlternativesError> {
    self
      .run([OsStr::new("--remove"), OsStr::new(name), target.as_os_str()])
      .map(drop)
  }

  fn set_auto(&mut self, name: &str) -> Result<(), AlternativesError> {
    self.run(["--auto", name]).map(drop)
  }
}

/// Parse the machine-readable output of `update-alternatives --query`.
///
/// The first stanza describes the group; each following stanza starts with
/// `Alternative:` and carries that provider's `Priority:`.
pub fn parse_query(name: &str, output: &str) -> AlternativeGroup {
  let mut mode = Mode::Auto;
  let mut value = None;
  let mut candidates: Vec<Candidate> = Vec::new();

  for line in output.lines() {
    let Some((key, rest)) = line.split_once(':') else {
      continue;
    };
    let rest = rest.trim();
    match key {
      "Status" if rest == "manual" => mode = Mode::Manual,
      "Value" if rest != "none" => value = Some(PathBuf::from(rest)),
      "Alternative" => candidates.push(Candidate {
        path: PathBuf::from(rest),
        priority: 0,
      }),
      "Priority" => {
        if let (Some(candidate), Ok(priority)) = (candidates.last_mut(), rest.parse()) {
          candidate.priority = priority;
        }
      }
      _ => {}
    }
  }

  AlternativeGroup {
    name: name.to_string(),
    mode,
    value,
    candidates,
  }
}
