//! Editor alternatives.
//!
//! The package registers one binary as the provider of nine legacy editor
//! commands through the Debian alternatives system. This module models those
//! nine bindings and offers two ways to act on them:
//!
//! - [`script`] renders the postinst, prerm and postrm maintainer scripts
//!   embedded in the package.
//! - [`registrar`] applies the same decisions in-process against an
//!   [`Alternatives`] backend and reports the outcome of every binding.

pub mod memory;
pub mod registrar;
pub mod script;
pub mod system;

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::consts::{
  ALTERNATIVE_LINK_DIR, ALTERNATIVE_NAMES, ALTERNATIVE_PRIORITY, BINARY_NAME, MANPAGE_LINK_DIR, MANPAGE_NAME,
};

pub use memory::MemoryAlternatives;
pub use registrar::{AlternativesReport, BindingOutcome, Outcome, install, purge, remove};
pub use script::{MaintainerScript, render_install_procedure, render_purge_procedure, render_remove_procedure};
pub use system::SystemAlternatives;

/// Errors from an alternatives backend.
#[derive(Debug, Error)]
pub enum AlternativesError {
  #[error("no alternatives for {0}")]
  NoSuchGroup(String),

  #[error("{command} exited with code {code:?}: {stderr}")]
  CommandFailed {
    command: String,
    code: Option<i32>,
    stderr: String,
  },

  #[error("failed to run update-alternatives: {0}")]
  Io(#[from] std::io::Error),
}

/// Secondary link switched together with its primary link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlaveLink {
  pub name: String,
  pub link: PathBuf,
  pub target: PathBuf,
}

/// One alternatives group the package provides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlternativeBinding {
  /// Group name, e.g. `vi`.
  pub name: String,
  /// Path the command resolves through, e.g. `/usr/bin/vi`.
  pub link: PathBuf,
  /// Installed binary providing the command.
  pub target: PathBuf,
  pub priority: i32,
  /// Man page link, registered only when its target exists.
  pub slave: Option<SlaveLink>,
}

/// Selection mode of an alternatives group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
  Auto,
  Manual,
}

/// One registered provider within a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
  pub path: PathBuf,
  pub priority: i32,
}

/// Current state of an alternatives group, as reported by a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlternativeGroup {
  pub name: String,
  pub mode: Mode,
  /// The provider the link currently resolves to.
  pub value: Option<PathBuf>,
  pub candidates: Vec<Candidate>,
}

impl AlternativeGroup {
  /// Returns true if `path` is one of the registered providers.
  pub fn contains(&self, path: &Path) -> bool {
    self.candidates.iter().any(|c| c.path == path)
  }

  /// Returns true if the group currently resolves to `path`.
  pub fn points_at(&self, path: &Path) -> bool {
    self.value.as_deref() == Some(path)
  }
}

/// Read and write access to an alternatives database.
///
/// Every method acts on a single group; callers re-query before acting since
/// the database may change underneath them.
pub trait Alternatives {
  /// Returns `None` when the group does not exist.
  fn query(&self, name: &str) -> Result<Option<AlternativeGroup>, AlternativesError>;

  /// Register (or re-register) `binding.target` for `binding.name`.
  fn install(&mut self, binding: &AlternativeBinding, slave: Option<&SlaveLink>) -> Result<(), AlternativesError>;

  /// Drop `target` from the providers of `name`.
  fn remove(&mut self, name: &str, target: &Path) -> Result<(), AlternativesError>;

  /// Put `name` back into automatic mode.
  fn set_auto(&mut self, name: &str) -> Result<(), AlternativesError>;
}

/// The nine bindings of one build, all sharing a single target binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlternativeSet {
  target: PathBuf,
  manpage: Option<PathBuf>,
  bindings: Vec<AlternativeBinding>,
}

impl AlternativeSet {
  /// Bindings for an editor installed under `prefix`.
  ///
  /// The man page is expected gzip-compressed, as the staging step leaves it.
  pub fn for_prefix(prefix: &Path) -> Self {
    let target = prefix.join("bin").join(BINARY_NAME);
    let manpage = prefix
      .join("share")
      .join("man")
      .join("man1")
      .join(format!("{MANPAGE_NAME}.gz"));
    Self::new(target, Some(manpage))
  }

  pub fn new(target: PathBuf, manpage: Option<PathBuf>) -> Self {
    let compressed = manpage
      .as_deref()
      .is_some_and(|m| m.extension().is_some_and(|ext| ext == "gz"));
    let suffix = if compressed { ".1.gz" } else { ".1" };

    let bindings = ALTERNATIVE_NAMES
      .iter()
      .map(|name| AlternativeBinding {
        name: (*name).to_string(),
        link: Path::new(ALTERNATIVE_LINK_DIR).join(name),
        target: target.clone(),
        priority: ALTERNATIVE_PRIORITY,
        slave: manpage.as_ref().map(|manpage| SlaveLink {
          name: format!("{name}{suffix}"),
          link: Path::new(MANPAGE_LINK_DIR).join(format!("{name}{suffix}")),
          target: manpage.clone(),
        }),
      })
      .collect();

    Self {
      target,
      manpage,
      bindings,
    }
  }

  pub fn target(&self) -> &Path {
    &self.target
  }

  pub fn manpage(&self) -> Option<&Path> {
    self.manpage.as_deref()
  }

  pub fn bindings(&self) -> &[AlternativeBinding] {
    &self.bindings
  }
}
