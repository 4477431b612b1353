//! `DEBIAN/control` record.

use crate::config::BuildConfig;
use crate::consts::{PACKAGE_DEPENDS, PACKAGE_DESCRIPTION, PACKAGE_HOMEPAGE, PACKAGE_SECTION, PACKAGE_SUMMARY};

/// Binary package metadata, rendered as a deb822 stanza.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlFile {
  pub package: String,
  pub version: String,
  pub architecture: String,
  pub maintainer: String,
  pub installed_size_kib: u64,
  pub depends: Vec<String>,
  pub section: String,
  pub priority: String,
  pub homepage: String,
  pub summary: String,
  pub description: String,
}

impl ControlFile {
  pub fn new(config: &BuildConfig, version: &str, architecture: &str, installed_size_kib: u64) -> Self {
    Self {
      package: config.package_name().to_string(),
      version: version.to_string(),
      architecture: architecture.to_string(),
      maintainer: config.maintainer().to_string(),
      installed_size_kib,
      depends: PACKAGE_DEPENDS.iter().map(|d| d.to_string()).collect(),
      section: PACKAGE_SECTION.to_string(),
      priority: "optional".to_string(),
      homepage: PACKAGE_HOMEPAGE.to_string(),
      summary: PACKAGE_SUMMARY.to_string(),
      description: PACKAGE_DESCRIPTION.to_string(),
    }
  }

  pub fn render(&self) -> String {
    let mut out = String::new();
    let mut field = |name: &str, value: &str| {
      out.push_str(name);
      out.push_str(": ");
      out.push_str(value);
      out.push('\n');
    };

    field("Package", &self.package);
    field("Version", &self.version);
    field("Section", &self.section);
    field("Priority", &self.priority);
    field("Architecture", &self.architecture);
    field("Maintainer", &self.maintainer);
    field("Installed-Size", &self.installed_size_kib.to_string());
    if !self.depends.is_empty() {
      field("Depends", &self.depends.join(", "));
    }
    field("Homepage", &self.homepage);
    field("Description", &self.summary);

    // Extended description: one leading space per line, " ." for blank lines.
    for line in self.description.lines() {
      if line.trim().is_empty() {
        out.push_str(" .\n");
      } else {
        out.push(' ');
        out.push_str(line);
        out.push('\n');
      }
    }
    out
  }
}
