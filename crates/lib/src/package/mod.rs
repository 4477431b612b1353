//! Debian package assembly.
//!
//! The editor's `make install` fills a [`Staging`] tree; this module adds the
//! `DEBIAN/` control files, hands the tree to `dpkg-deb` under `fakeroot`, and
//! finds the resulting archive.

pub mod control;
pub mod staging;

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::alternatives::{AlternativeSet, MaintainerScript};
use crate::tools::{ToolCommand, ToolError};

pub use control::ControlFile;
pub use staging::Staging;

#[derive(Debug, Error)]
pub enum PackageError {
  #[error("failed to create directory {}: {source}", path.display())]
  CreateDir { path: PathBuf, source: std::io::Error },

  #[error("failed to write file {}: {source}", path.display())]
  WriteFile { path: PathBuf, source: std::io::Error },

  #[error("failed to read {}: {source}", path.display())]
  Read { path: PathBuf, source: std::io::Error },

  #[error("failed to walk staging tree: {0}")]
  Walk(#[from] walkdir::Error),

  #[error(transparent)]
  Tool(#[from] ToolError),

  #[error("no package matching {pattern} found in {}", dir.display())]
  ArtifactNotFound { dir: PathBuf, pattern: String },
}

/// `<name>_<version>_<arch>.deb`, with any epoch dropped as `dpkg-name` does.
pub fn deb_file_name(package: &str, version: &str, arch: &str) -> String {
  let version = version.split_once(':').map_or(version, |(_, v)| v);
  format!("{package}_{version}_{arch}.deb")
}

/// Write `contents` to `path` and set its permission bits.
pub(crate) fn write_with_mode(path: &Path, contents: &str, mode: u32) -> Result<(), PackageError> {
  let write_err = |source| PackageError::WriteFile {
    path: path.to_path_buf(),
    source,
  };
  fs::write(path, contents).map_err(write_err)?;
  fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(write_err)
}

/// Write postinst, prerm and postrm for `set` into `dir`, executable.
pub fn write_maintainer_scripts(dir: &Path, set: &AlternativeSet) -> Result<Vec<PathBuf>, PackageError> {
  fs::create_dir_all(dir).map_err(|source| PackageError::CreateDir {
    path: dir.to_path_buf(),
    source,
  })?;

  MaintainerScript::ALL
    .iter()
    .map(|kind| -> Result<PathBuf, PackageError> {
      let path = dir.join(kind.file_name());
      write_with_mode(&path, &kind.render(set), 0o755)?;
      debug!(path = %path.display(), "wrote maintainer script");
      Ok(path)
    })
    .collect()
}

/// Build `output` from the staging tree with `fakeroot dpkg-deb`.
pub async fn assemble(staging: &Staging, output: &Path) -> Result<(), PackageError> {
  ToolCommand::new("fakeroot")
    .args(["dpkg-deb", "--build"])
    .arg(staging.root())
    .arg(output)
    .run()
    .await?;
  Ok(())
}

/// Find the built archive.
///
/// Returns `expected` when it exists, otherwise the newest `<package>_*.deb`
/// under `dir`.
pub fn locate_artifact(expected: &Path, dir: &Path, package: &str) -> Result<PathBuf, PackageError> {
  if expected.is_file() {
    return Ok(expected.to_path_buf());
  }

  let prefix = format!("{package}_");
  warn!(expected = %expected.display(), "package not at expected path, searching {}", dir.display());

  let newest = WalkDir::new(dir)
    .max_depth(2)
    .into_iter()
    .filter_map(Result::ok)
    .filter(|e| e.file_type().is_file())
    .filter(|e| {
      let name = e.file_name().to_string_lossy();
      name.starts_with(&prefix) && name.ends_with(".deb")
    })
    .filter_map(|e| {
      let modified = e.metadata().ok()?.modified().unwrap_or(SystemTime::UNIX_EPOCH);
      Some((modified, e.into_path()))
    })
    .max_by_key(|(modified, _)| *modified);

  newest.map(|(_, path)| path).ok_or_else(|| PackageError::ArtifactNotFound {
    dir: dir.to_path_buf(),
    pattern: format!("{prefix}*.deb"),
  })
}
