//! Implementation of the default `nvdeb` command.
//!
//! Clones or updates the editor source, builds it, and packages the install
//! tree as a `.deb` in the output directory.

use std::time::Instant;

use anyhow::{Context, Result};
use tracing::debug;

use nvdeb_lib::config::{BuildConfig, BuildOptions};
use nvdeb_lib::consts::ALTERNATIVE_NAMES;
use nvdeb_lib::pipeline;

use crate::output::{format_elapsed, format_installed_size, print_info, print_stat, print_success};

/// Execute the packaging run.
///
/// Options are validated before anything touches the filesystem or network.
pub fn cmd_build(options: BuildOptions) -> Result<()> {
  let config = BuildConfig::new(options).context("Invalid configuration")?;
  debug!(?config, "resolved configuration");

  print_info(&format!(
    "Building {} ({}) from {} at {}",
    config.package_name(),
    config.build_type(),
    config.repo_url(),
    config.git_ref()
  ));

  let start = Instant::now();
  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let result = rt.block_on(pipeline::run(&config)).context("Packaging failed")?;

  println!();
  print_success(&format!(
    "Built {} {} ({})",
    result.package, result.version, result.architecture
  ));
  print_stat("Package", &result.artifact.display().to_string());
  print_stat("Installed size", &format_installed_size(result.installed_size_kib));
  if result.alternatives {
    print_stat("Alternatives", &ALTERNATIVE_NAMES.join(", "));
  } else {
    print_stat("Alternatives", "disabled");
  }
  if let Some(kept) = &result.kept_scratch {
    print_stat("Scratch kept", &kept.display().to_string());
  }
  print_stat("Elapsed", &format_elapsed(start.elapsed()));

  println!();
  println!("Install with: sudo apt install {}", result.artifact.display());

  Ok(())
}
