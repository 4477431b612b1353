//! CLI output formatting utilities.
//!
//! Colored status lines on stdout, warnings and errors on stderr, and the
//! size and time formats of the build summary.

use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
  pub const ARROW: &str = "→";
  pub const ADD: &str = "+";
  pub const REMOVE: &str = "-";
  pub const SKIP: &str = "~";
}

/// Installed size as dpkg reports it, from KiB.
pub fn format_installed_size(kib: u64) -> String {
  const MIB: u64 = 1024;
  const GIB: u64 = MIB * 1024;

  match kib {
    k if k >= GIB => format!("{:.1} GiB", k as f64 / GIB as f64),
    k if k >= MIB => format!("{:.1} MiB", k as f64 / MIB as f64),
    k => format!("{k} KiB"),
  }
}

/// Wall-clock time of a build, which runs for minutes rather than milliseconds.
pub fn format_elapsed(elapsed: Duration) -> String {
  let secs = elapsed.as_secs();
  let (hours, mins, secs) = (secs / 3600, secs / 60 % 60, secs % 60);

  if hours > 0 {
    format!("{hours}h {mins:02}m")
  } else if mins > 0 {
    format!("{mins}m {secs:02}s")
  } else {
    format!("{secs}s")
  }
}

pub fn print_success(message: &str) {
  println!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_warning(message: &str) {
  eprintln!(
    "{} {}",
    symbols::WARNING.if_supports_color(Stream::Stderr, |s| s.yellow()),
    message.if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

pub fn print_info(message: &str) {
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

pub fn print_stat(label: &str, value: &str) {
  println!(
    "  {}: {}",
    label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}
