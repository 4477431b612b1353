//! Source checkout: clone or fetch, checkout, and version derivation.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use crate::config::{ConfigError, validate_version};
use crate::tools::{ToolCommand, ToolError};

/// Clone `repo_url` into `checkout`, or fetch into an existing clone.
pub async fn sync(repo_url: &str, checkout: &Path) -> Result<(), ToolError> {
  if checkout.join(".git").is_dir() {
    info!(path = %checkout.display(), "updating existing checkout");
    ToolCommand::new("git")
      .args(["fetch", "--tags", "--force", "--prune", "origin"])
      .current_dir(checkout)
      .run()
      .await
  } else {
    info!(url = repo_url, path = %checkout.display(), "cloning");
    ToolCommand::new("git")
      .args(["clone", "--filter=blob:none", repo_url])
      .arg(checkout)
      .run()
      .await
  }
}

/// Check out `git_ref` as a detached head, discarding local changes.
pub async fn checkout(checkout: &Path, git_ref: &str) -> Result<(), ToolError> {
  ToolCommand::new("git")
    .args(["checkout", "--force", "--detach", git_ref])
    .current_dir(checkout)
    .run()
    .await
}

/// `git describe` of the checked-out commit against the release tags.
pub async fn describe(checkout: &Path) -> Result<String, ToolError> {
  ToolCommand::new("git")
    .args(["describe", "--tags", "--match", "v[0-9]*"])
    .current_dir(checkout)
    .output()
    .await
}

/// The version a checkout declares in its top-level `CMakeLists.txt`.
///
/// On the development branch this is the next release plus a pre-release
/// marker (`0.12.0` + `-dev`), which release tags alone cannot tell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectVersion {
  pub major: u32,
  pub minor: u32,
  pub patch: u32,
  /// As written, e.g. `-dev`; empty for a release.
  pub prerelease: String,
}

static CMAKE_VERSION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"(?m)^\s*set\(\s*NVIM_VERSION_(MAJOR|MINOR|PATCH|PRERELEASE)\s+"?([^"\s)]*)"?\s*\)"#)
    .expect("cmake version regex is valid")
});

impl ProjectVersion {
  /// Read the `NVIM_VERSION_*` settings; `None` unless major, minor and
  /// patch are all present.
  pub fn parse(cmake: &str) -> Option<Self> {
    let (mut major, mut minor, mut patch) = (None, None, None);
    let mut prerelease = String::new();

    for caps in CMAKE_VERSION_REGEX.captures_iter(cmake) {
      let value = &caps[2];
      match &caps[1] {
        "MAJOR" => major = value.parse().ok(),
        "MINOR" => minor = value.parse().ok(),
        "PATCH" => patch = value.parse().ok(),
        _ => prerelease = value.to_string(),
      }
    }

    Some(Self {
      major: major?,
      minor: minor?,
      patch: patch?,
      prerelease,
    })
  }

  /// The pre-release marker as a Debian version fragment, if any.
  fn marker(&self) -> Option<String> {
    let marker = self.prerelease.trim_start_matches('-').replace('-', ".");
    (!marker.is_empty()).then_some(marker)
  }
}

/// Read [`ProjectVersion`] from `checkout/CMakeLists.txt`.
pub fn project_version(checkout: &Path) -> Option<ProjectVersion> {
  let path = checkout.join("CMakeLists.txt");
  match std::fs::read_to_string(&path) {
    Ok(cmake) => ProjectVersion::parse(&cmake),
    Err(e) => {
      debug!(path = %path.display(), error = %e, "no project version");
      None
    }
  }
}

/// `<count>.g<hash>` from the tail of a `git describe` suffix.
fn commit_suffix(rest: &str) -> Option<String> {
  let mut parts = rest.rsplit('-');
  let hash = parts.next()?;
  let count = parts.next()?;
  (hash.starts_with('g') && !count.is_empty() && count.chars().all(|c| c.is_ascii_digit()))
    .then(|| format!("{count}.{hash}"))
}

/// Map a `git describe` string to a Debian version.
///
/// `v0.10.2` becomes `0.10.2`, and commits after it sort after the release
/// (`v0.10.2-15-gabc` becomes `0.10.2+15.gabc`). When the checkout declares a
/// pre-release `project` version, that version wins so a development snapshot
/// sorts between the last release and the next one: `v0.11.0-15-gabc` with
/// `0.12.0-dev` becomes `0.12.0~dev.15.gabc`. A pre-release tag
/// (`v0.11.0-dev-15-gabc`) also sorts below its release.
pub fn debian_version(describe: &str, project: Option<&ProjectVersion>) -> Result<String, ConfigError> {
  let trimmed = describe.trim();
  let bare = trimmed.strip_prefix('v').unwrap_or(trimmed);
  let (base, rest) = match bare.split_once('-') {
    Some((base, rest)) => (base, Some(rest)),
    None => (bare, None),
  };

  let version = match (project, project.and_then(ProjectVersion::marker)) {
    (Some(p), Some(marker)) => {
      let mut version = format!("{}.{}.{}~{marker}", p.major, p.minor, p.patch);
      if let Some(suffix) = rest.and_then(commit_suffix) {
        version.push('.');
        version.push_str(&suffix);
      }
      version
    }
    _ => match rest {
      None => base.to_string(),
      Some(rest) => {
        let prerelease = ["dev", "rc", "alpha", "beta"].iter().any(|p| rest.starts_with(p));
        let separator = if prerelease { '~' } else { '+' };
        format!("{base}{separator}{}", rest.replace('-', "."))
      }
    },
  };

  validate_version(&version)?;
  Ok(version)
}
