//! Build configuration.
//!
//! Raw user input arrives as [`BuildOptions`]; [`BuildConfig::new`] validates
//! it once, before any side effect, and the resulting value is passed by
//! reference to every pipeline phase.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::consts::{APP_NAME, DEFAULT_PACKAGE_NAME, DEFAULT_PREFIX, DEFAULT_REPO_URL, NIGHTLY_REF, STABLE_REF};

/// Characters allowed in an install prefix.
static PREFIX_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^/[A-Za-z0-9._+/-]*$").expect("prefix regex is valid"));

/// Debian policy 5.6.1: lowercase alphanumerics and `+ - .`, at least two characters,
/// starting with an alphanumeric.
static PACKAGE_NAME_REGEX: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9+.-]+$").expect("package name regex is valid"));

/// Debian policy 5.6.12: `[epoch:]upstream_version[-debian_revision]`.
static VERSION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^([0-9]+:)?[0-9][A-Za-z0-9.+~]*(-[A-Za-z0-9.+~]+)?$").expect("version regex is valid")
});

/// Errors raised while validating user input.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("invalid prefix {0:?}: must be an absolute path made of [A-Za-z0-9._+/-] without '..'")]
  InvalidPrefix(String),

  #[error("invalid build type {0:?}: expected one of Release, Debug, RelWithDebInfo, MinSizeRel")]
  InvalidBuildType(String),

  #[error("invalid package name {0:?}: must match [a-z0-9][a-z0-9+.-]+")]
  InvalidPackageName(String),

  #[error("invalid version {0:?}: not a Debian version string")]
  InvalidVersion(String),

  #[error("invalid job count: must be at least 1")]
  InvalidJobs,
}

/// CMake build type passed to the editor's build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BuildType {
  #[default]
  Release,
  Debug,
  RelWithDebInfo,
  MinSizeRel,
}

impl BuildType {
  pub fn as_str(&self) -> &'static str {
    match self {
      BuildType::Release => "Release",
      BuildType::Debug => "Debug",
      BuildType::RelWithDebInfo => "RelWithDebInfo",
      BuildType::MinSizeRel => "MinSizeRel",
    }
  }
}

impl fmt::Display for BuildType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for BuildType {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "Release" => Ok(BuildType::Release),
      "Debug" => Ok(BuildType::Debug),
      "RelWithDebInfo" => Ok(BuildType::RelWithDebInfo),
      "MinSizeRel" => Ok(BuildType::MinSizeRel),
      other => Err(ConfigError::InvalidBuildType(other.to_string())),
    }
  }
}

/// Unvalidated build options, as parsed from the command line.
#[derive(Debug, Clone)]
pub struct BuildOptions {
  pub prefix: PathBuf,
  pub build_type: BuildType,
  pub package_name: String,
  /// Remove the scratch directory when the run ends.
  pub cleanup: bool,
  /// Build the `stable` tag rather than `master`.
  pub stable: bool,
  /// Embed the maintainer scripts registering the editor alternatives.
  pub alternatives: bool,
  pub repo_url: String,
  /// Persistent checkout to reuse instead of a scratch clone.
  pub source_dir: Option<PathBuf>,
  pub output_dir: PathBuf,
  /// Parallel build jobs; `None` uses the available parallelism.
  pub jobs: Option<usize>,
}

impl Default for BuildOptions {
  fn default() -> Self {
    Self {
      prefix: PathBuf::from(DEFAULT_PREFIX),
      build_type: BuildType::default(),
      package_name: DEFAULT_PACKAGE_NAME.to_string(),
      cleanup: true,
      stable: true,
      alternatives: true,
      repo_url: DEFAULT_REPO_URL.to_string(),
      source_dir: None,
      output_dir: PathBuf::from("."),
      jobs: None,
    }
  }
}

/// Validated, immutable configuration for one packaging run.
#[derive(Debug, Clone)]
pub struct BuildConfig {
  prefix: PathBuf,
  build_type: BuildType,
  package_name: String,
  cleanup: bool,
  stable: bool,
  alternatives: bool,
  repo_url: String,
  source_dir: Option<PathBuf>,
  output_dir: PathBuf,
  jobs: usize,
  maintainer: String,
}

impl BuildConfig {
  /// Validate `options` and freeze them into a configuration.
  ///
  /// # Errors
  ///
  /// Returns the first validation failure; nothing has been touched on disk yet.
  pub fn new(options: BuildOptions) -> Result<Self, ConfigError> {
    let prefix = validate_prefix(&options.prefix)?;
    validate_package_name(&options.package_name)?;

    let jobs = match options.jobs {
      Some(0) => return Err(ConfigError::InvalidJobs),
      Some(n) => n,
      None => std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
    };

    Ok(Self {
      prefix,
      build_type: options.build_type,
      package_name: options.package_name,
      cleanup: options.cleanup,
      stable: options.stable,
      alternatives: options.alternatives,
      repo_url: options.repo_url,
      source_dir: options.source_dir,
      output_dir: options.output_dir,
      jobs,
      maintainer: maintainer_from_env(),
    })
  }

  pub fn prefix(&self) -> &Path {
    &self.prefix
  }

  pub fn build_type(&self) -> BuildType {
    self.build_type
  }

  pub fn package_name(&self) -> &str {
    &self.package_name
  }

  pub fn cleanup(&self) -> bool {
    self.cleanup
  }

  pub fn stable(&self) -> bool {
    self.stable
  }

  pub fn alternatives(&self) -> bool {
    self.alternatives
  }

  pub fn repo_url(&self) -> &str {
    &self.repo_url
  }

  pub fn source_dir(&self) -> Option<&Path> {
    self.source_dir.as_deref()
  }

  pub fn output_dir(&self) -> &Path {
    &self.output_dir
  }

  pub fn jobs(&self) -> usize {
    self.jobs
  }

  pub fn maintainer(&self) -> &str {
    &self.maintainer
  }

  /// The git ref the run checks out.
  pub fn git_ref(&self) -> &'static str {
    if self.stable { STABLE_REF } else { NIGHTLY_REF }
  }
}

/// Check an install prefix and strip trailing slashes (except for `/` itself).
pub fn validate_prefix(prefix: &Path) -> Result<PathBuf, ConfigError> {
  let raw = prefix.to_string_lossy();
  let invalid = || ConfigError::InvalidPrefix(raw.to_string());

  if !PREFIX_REGEX.is_match(&raw) || prefix.components().any(|c| c == Component::ParentDir) {
    return Err(invalid());
  }

  let trimmed = raw.trim_end_matches('/');
  Ok(if trimmed.is_empty() { PathBuf::from("/") } else { PathBuf::from(trimmed) })
}

pub fn validate_package_name(name: &str) -> Result<(), ConfigError> {
  if PACKAGE_NAME_REGEX.is_match(name) {
    Ok(())
  } else {
    Err(ConfigError::InvalidPackageName(name.to_string()))
  }
}

pub fn validate_version(version: &str) -> Result<(), ConfigError> {
  if VERSION_REGEX.is_match(version) {
    Ok(())
  } else {
    Err(ConfigError::InvalidVersion(version.to_string()))
  }
}

/// `Maintainer` field from `DEBFULLNAME` and `DEBEMAIL`, the variables
/// `dch` and friends read.
fn maintainer_from_env() -> String {
  let name = std::env::var("DEBFULLNAME").ok().filter(|s| !s.trim().is_empty());
  let email = std::env::var("DEBEMAIL").ok().filter(|s| !s.trim().is_empty());

  match (name, email) {
    (Some(name), Some(email)) => format!("{} <{}>", name.trim(), email.trim()),
    (None, Some(email)) => format!("{} <{}>", APP_NAME, email.trim()),
    (Some(name), None) => format!("{} <{}@localhost>", name.trim(), APP_NAME),
    (None, None) => format!("{APP_NAME} <{APP_NAME}@localhost>"),
  }
}
