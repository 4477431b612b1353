use crate::consts::APP_NAME;
use std::path::PathBuf;

/// Returns the user's home directory, falling back to `/` when `HOME` is unset
pub fn home_dir() -> PathBuf {
  std::env::var("HOME").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("/"))
}

/// Returns the directory for cache files for the application
pub fn cache_dir() -> PathBuf {
  let cache_home = std::env::var("XDG_CACHE_HOME")
    .map(PathBuf::from)
    .unwrap_or_else(|_| home_dir().join(".cache"));
  cache_home.join(APP_NAME)
}

/// Parent directory for per-run scratch directories (clone + staging tree).
///
/// Lives under the cache directory so a large checkout does not land on a
/// tmpfs `/tmp`.
pub fn scratch_dir() -> PathBuf {
  cache_dir().join("work")
}
