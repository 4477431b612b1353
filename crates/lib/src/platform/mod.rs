pub mod arch;
pub mod paths;

use std::path::Path;

use tracing::debug;

/// Returns true when the process runs with an effective uid of 0
pub fn is_elevated() -> bool {
  rustix::process::geteuid().is_root()
}

/// The user that invoked `sudo`, as `(uid, gid)`.
///
/// Returns `None` unless both `SUDO_UID` and `SUDO_GID` are set and numeric.
pub fn invoking_user() -> Option<(u32, u32)> {
  let uid = std::env::var("SUDO_UID").ok()?.parse().ok()?;
  let gid = std::env::var("SUDO_GID").ok()?.parse().ok()?;
  Some((uid, gid))
}

/// Change the owner of `path` to `uid:gid`.
pub fn chown(path: &Path, uid: u32, gid: u32) -> std::io::Result<()> {
  debug!(path = %path.display(), uid, gid, "changing ownership");
  std::os::unix::fs::chown(path, Some(uid), Some(gid))
}
