//! The packaging run, phase by phase.
//!
//! Every phase runs to completion before the next starts and the first error
//! ends the run. The scratch directory holding the clone and the staging tree
//! is a [`TempDir`], so it is removed on every exit path unless the
//! configuration asks to keep it. SIGINT and SIGTERM abort the running phase,
//! kill its child process, and go through the same cleanup.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use thiserror::Error;
use tokio::signal::unix::{SignalKind, signal};
use tracing::{debug, info, warn};

use crate::alternatives::AlternativeSet;
use crate::config::{BuildConfig, ConfigError};
use crate::package::{self, ControlFile, PackageError, Staging};
use crate::platform::{self, arch::Arch, paths};
use crate::source;
use crate::tools::{self, ToolCommand, ToolError};

#[derive(Debug, Error)]
pub enum PipelineError {
  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error(transparent)]
  Tool(#[from] ToolError),

  #[error(transparent)]
  Package(#[from] PackageError),

  #[error("unsupported architecture: {0}")]
  UnsupportedArch(&'static str),

  #[error("failed to prepare {}: {source}", path.display())]
  Io { path: PathBuf, source: std::io::Error },

  #[error("interrupted")]
  Interrupted,
}

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct PipelineResult {
  pub artifact: PathBuf,
  pub package: String,
  pub version: String,
  pub architecture: String,
  pub installed_size_kib: u64,
  /// Whether the maintainer scripts were embedded.
  pub alternatives: bool,
  /// Scratch directory left on disk because cleanup was disabled.
  pub kept_scratch: Option<PathBuf>,
}

/// Scratch space for one run.
struct Workspace {
  dir: TempDir,
}

impl Workspace {
  fn create() -> Result<Self, PipelineError> {
    let parent = paths::scratch_dir();
    std::fs::create_dir_all(&parent).map_err(|source| PipelineError::Io {
      path: parent.clone(),
      source,
    })?;
    let dir = tempfile::Builder::new()
      .prefix("run-")
      .tempdir_in(&parent)
      .map_err(|source| PipelineError::Io { path: parent, source })?;
    Ok(Self { dir })
  }

  fn path(&self) -> &Path {
    self.dir.path()
  }

  /// Drop the directory, or leave it on disk and return where it is.
  fn finish(self, cleanup: bool) -> Option<PathBuf> {
    if cleanup { None } else { Some(self.dir.keep()) }
  }
}

/// Build the editor described by `config` and package it.
pub async fn run(config: &BuildConfig) -> Result<PipelineResult, PipelineError> {
  let arch = Arch::current().ok_or(PipelineError::UnsupportedArch(std::env::consts::ARCH))?;

  info!(phase = "preflight", "checking required tools");
  tools::preflight()?;

  let output_dir = prepare_output_dir(config.output_dir())?;
  let workspace = Workspace::create()?;
  info!(path = %workspace.path().display(), "scratch directory");

  // Biased so the signal handlers exist before the first child is spawned.
  let result = tokio::select! {
    biased;
    () = interrupted() => {
      warn!("interrupted, stopping the current phase");
      Err(PipelineError::Interrupted)
    }
    result = run_in(config, arch, &output_dir, workspace.path()) => result,
  };

  let kept_scratch = workspace.finish(config.cleanup());
  if let Some(kept) = &kept_scratch {
    info!(path = %kept.display(), "keeping scratch directory");
  }

  result.map(|mut r| {
    r.kept_scratch = kept_scratch;
    r
  })
}

/// Resolves on the first SIGINT or SIGTERM. Never resolves if neither
/// handler can be installed.
async fn interrupted() {
  let mut terminate = signal(SignalKind::terminate())
    .inspect_err(|e| debug!(error = %e, "cannot listen for SIGTERM"))
    .ok();

  tokio::select! {
    Ok(()) = tokio::signal::ctrl_c() => {}
    Some(()) = async {
      match terminate.as_mut() {
        Some(term) => term.recv().await,
        None => None,
      }
    } => {}
    else => std::future::pending::<()>().await,
  }
}

async fn run_in(
  config: &BuildConfig,
  arch: Arch,
  output_dir: &Path,
  scratch: &Path,
) -> Result<PipelineResult, PipelineError> {
  let checkout = config
    .source_dir()
    .map(Path::to_path_buf)
    .unwrap_or_else(|| scratch.join("src"));

  info!(phase = "sync", url = config.repo_url(), "syncing source");
  source::sync(config.repo_url(), &checkout).await?;

  info!(phase = "checkout", git_ref = config.git_ref(), "checking out");
  source::checkout(&checkout, config.git_ref()).await?;

  let describe = source::describe(&checkout).await?;
  let project = source::project_version(&checkout);
  let version = source::debian_version(&describe, project.as_ref())?;
  info!(describe = %describe, project = ?project, version = %version, "derived package version");

  info!(phase = "build", build_type = %config.build_type(), jobs = config.jobs(), "building");
  build(config, &checkout).await?;

  info!(phase = "stage", "installing into staging tree");
  let staging = Staging::new(scratch.join("pkg"))?;
  ToolCommand::new("make")
    .arg("install")
    .arg(format!("DESTDIR={}", staging.root().display()))
    .current_dir(&checkout)
    .run()
    .await?;
  stage_metadata(config, &staging, &version, arch)?;
  let installed_size_kib = staging.installed_size_kib()?;

  info!(phase = "assemble", "building package");
  let file_name = package::deb_file_name(config.package_name(), &version, arch.as_debian());
  let expected = output_dir.join(&file_name);
  package::assemble(&staging, &expected).await?;

  let artifact = package::locate_artifact(&expected, output_dir, config.package_name())?;
  hand_back(&artifact);

  Ok(PipelineResult {
    artifact,
    package: config.package_name().to_string(),
    version,
    architecture: arch.as_debian().to_string(),
    installed_size_kib,
    alternatives: config.alternatives(),
    kept_scratch: None,
  })
}

async fn build(config: &BuildConfig, checkout: &Path) -> Result<(), ToolError> {
  ToolCommand::new("make")
    .arg(format!("CMAKE_BUILD_TYPE={}", config.build_type()))
    .arg(format!("CMAKE_INSTALL_PREFIX={}", config.prefix().display()))
    .arg(format!("-j{}", config.jobs()))
    .current_dir(checkout)
    .run()
    .await
}

/// Write everything under `DEBIAN/` once the install tree is in place.
pub fn stage_metadata(config: &BuildConfig, staging: &Staging, version: &str, arch: Arch) -> Result<(), PipelineError> {
  let pages = staging.compress_manpages(config.prefix())?;
  info!(pages, "compressed man pages");

  if config.alternatives() {
    let set = AlternativeSet::for_prefix(config.prefix());
    staging.write_maintainer_scripts(&set)?;
    info!(binary = %set.target().display(), "embedded alternatives scripts");
  }

  let control = ControlFile::new(config, version, arch.as_debian(), staging.installed_size_kib()?);
  staging.write_control(&control)?;
  Ok(())
}

fn prepare_output_dir(dir: &Path) -> Result<PathBuf, PipelineError> {
  std::fs::create_dir_all(dir).map_err(|source| PipelineError::Io {
    path: dir.to_path_buf(),
    source,
  })?;
  dunce::canonicalize(dir).map_err(|source| PipelineError::Io {
    path: dir.to_path_buf(),
    source,
  })
}

/// Give the artifact to the user behind `sudo`, if any.
fn hand_back(artifact: &Path) {
  if !platform::is_elevated() {
    return;
  }
  let Some((uid, gid)) = platform::invoking_user() else {
    return;
  };
  if let Err(e) = platform::chown(artifact, uid, gid) {
    warn!(path = %artifact.display(), error = %e, "failed to change package ownership");
  }
}
