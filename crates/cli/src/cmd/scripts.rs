//! Implementation of the `nvdeb scripts` command.

use std::path::Path;

use anyhow::{Context, Result};

use nvdeb_lib::alternatives::AlternativeSet;
use nvdeb_lib::config::validate_prefix;
use nvdeb_lib::package::write_maintainer_scripts;

use crate::output::{print_stat, print_success};

/// Write postinst, prerm and postrm for `prefix` into `out`.
pub fn cmd_scripts(prefix: &Path, out: &Path) -> Result<()> {
  let prefix = validate_prefix(prefix)?;
  let set = AlternativeSet::for_prefix(&prefix);

  let written = write_maintainer_scripts(out, &set)
    .with_context(|| format!("Failed to write scripts to {}", out.display()))?;

  print_success(&format!("Wrote {} maintainer scripts", written.len()));
  print_stat("Target", &set.target().display().to_string());
  for path in &written {
    print_stat("Script", &path.display().to_string());
  }
  Ok(())
}
