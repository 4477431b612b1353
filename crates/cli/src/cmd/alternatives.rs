//! Implementation of the `nvdeb alternatives` command.
//!
//! Drives the host's `update-alternatives` directly, outside of dpkg. Useful
//! after a manual `make install` or to repair a system whose alternatives
//! drifted.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

use nvdeb_lib::alternatives::{self, AlternativeSet, AlternativesReport, Outcome, SystemAlternatives};
use nvdeb_lib::config::validate_prefix;
use nvdeb_lib::platform;

use crate::output::{OutputFormat, print_json, print_stat, print_success, print_warning, symbols};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AlternativesAction {
  /// Register every name at the package priority
  Install,
  /// Withdraw the editor as a candidate
  Remove,
  /// Withdraw the editor and reset groups that pointed at it (failures only warn)
  Purge,
}

pub fn cmd_alternatives(action: AlternativesAction, prefix: &Path, format: OutputFormat, program: PathBuf) -> Result<()> {
  let prefix = validate_prefix(prefix)?;
  let set = AlternativeSet::for_prefix(&prefix);

  if !platform::is_elevated() && !format.is_json() {
    print_warning("Not running as root; update-alternatives will likely refuse changes");
  }

  let mut db = SystemAlternatives::new(program);
  let report = match action {
    AlternativesAction::Install => alternatives::install(&mut db, &set),
    AlternativesAction::Remove => alternatives::remove(&mut db, &set),
    AlternativesAction::Purge => alternatives::purge(&mut db, &set),
  };

  if format.is_json() {
    print_json(&report)?;
  } else {
    print_report(&report, &set);
  }

  if report.is_success() {
    return Ok(());
  }
  let summary = format!("{} of {} alternatives failed", report.failed(), report.bindings.len());
  // Purge is cleanup: like the postrm it mirrors, it reports and moves on.
  if matches!(action, AlternativesAction::Purge) {
    print_warning(&summary);
    return Ok(());
  }
  bail!(summary)
}

fn print_report(report: &AlternativesReport, set: &AlternativeSet) {
  for binding in &report.bindings {
    let (symbol, detail) = match &binding.outcome {
      Outcome::Registered { previous, manpage } => {
        let mut detail = format!("{} {}", symbols::ARROW, set.target().display());
        if *manpage {
          detail.push_str(" (with man page)");
        }
        if let Some(previous) = previous.as_ref().filter(|p| p.as_path() != set.target()) {
          detail.push_str(&format!(", was {}", previous.display()));
        }
        (symbols::ADD.if_supports_color(Stream::Stdout, |s| s.green()).to_string(), detail)
      }
      Outcome::Removed { reset_to_auto } => {
        let detail = if *reset_to_auto { "removed, reset to auto" } else { "removed" };
        (
          symbols::REMOVE.if_supports_color(Stream::Stdout, |s| s.red()).to_string(),
          detail.to_string(),
        )
      }
      Outcome::Unchanged { current } => {
        let detail = match current {
          Some(current) => format!("unchanged, {} {}", symbols::ARROW, current.display()),
          None => "not registered".to_string(),
        };
        (symbols::SKIP.if_supports_color(Stream::Stdout, |s| s.dimmed()).to_string(), detail)
      }
      Outcome::Skipped { reason } => (
        symbols::SKIP.if_supports_color(Stream::Stdout, |s| s.yellow()).to_string(),
        format!("skipped: {reason}"),
      ),
      Outcome::Failed { error } => (
        symbols::ERROR.if_supports_color(Stream::Stdout, |s| s.red()).to_string(),
        format!("failed: {error}"),
      ),
    };
    println!("  {} {:<9} {}", symbol, binding.name, detail);
  }

  println!();
  print_success("Done");
  print_stat("Registered", &report.registered().to_string());
  print_stat("Removed", &report.removed().to_string());
  print_stat("Skipped", &report.skipped().to_string());
  print_stat("Failed", &report.failed().to_string());
}
