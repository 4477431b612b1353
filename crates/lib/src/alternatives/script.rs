//! Maintainer script rendering.
//!
//! Each script is a fixed set of shell functions followed by one call per
//! binding. Values only ever reach the shell as single-quoted words passed to
//! those functions, so a path containing `$`, `*`, `(` or any other character
//! the shell or a pattern matcher would interpret stays literal.

use std::path::Path;

use super::{AlternativeBinding, AlternativeSet};
use crate::consts::APP_NAME;

/// The three maintainer scripts the package carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaintainerScript {
  /// Runs after unpacking; registers the alternatives.
  Postinst,
  /// Runs before removal; drops entries that currently resolve to the editor.
  Prerm,
  /// Runs after removal; on purge, drops leftovers and resets groups to auto.
  Postrm,
}

impl MaintainerScript {
  pub const ALL: [MaintainerScript; 3] = [MaintainerScript::Postinst, MaintainerScript::Prerm, MaintainerScript::Postrm];

  /// File name under `DEBIAN/`.
  pub fn file_name(&self) -> &'static str {
    match self {
      MaintainerScript::Postinst => "postinst",
      MaintainerScript::Prerm => "prerm",
      MaintainerScript::Postrm => "postrm",
    }
  }

  pub fn render(&self, set: &AlternativeSet) -> String {
    match self {
      MaintainerScript::Postinst => render_install_procedure(set),
      MaintainerScript::Prerm => render_remove_procedure(set),
      MaintainerScript::Postrm => render_purge_procedure(set),
    }
  }
}

/// Quote `value` as a single shell word.
pub fn shell_quote(value: &str) -> String {
  format!("'{}'", value.replace('\'', r"'\''"))
}

fn quote_path(path: &Path) -> String {
  shell_quote(&path.to_string_lossy())
}

/// Line-oriented script buffer.
struct ScriptBuilder {
  buf: String,
}

impl ScriptBuilder {
  fn new(kind: MaintainerScript, set: &AlternativeSet) -> Self {
    let mut builder = Self { buf: String::new() };
    builder.line("#!/bin/sh");
    builder.line(&format!(
      "# {} generated by {APP_NAME}: editor alternatives for {}",
      kind.file_name(),
      set.target().display()
    ));
    builder.line("set -e");
    builder.blank();
    builder.line(&format!("target={}", quote_path(set.target())));
    builder.blank();
    builder.block(HELPERS);
    builder
  }

  fn line(&mut self, line: &str) {
    self.buf.push_str(line);
    self.buf.push('\n');
  }

  fn blank(&mut self) {
    self.buf.push('\n');
  }

  fn block(&mut self, block: &str) {
    self.buf.push_str(block);
    if !block.ends_with('\n') {
      self.buf.push('\n');
    }
    self.blank();
  }

  fn finish(mut self) -> String {
    self.line("exit 0");
    self.buf
  }
}

const HELPERS: &str = r#"warn() {
  echo "nvdeb: warning: $*" >&2
}

current_value() {
  update-alternatives --query "$1" 2>/dev/null | sed -n 's/^Value: //p'
}"#;

const REGISTER_FN: &str = r#"register() {
  name="$1"
  link="$2"
  priority="$3"
  slave_name="$4"
  slave_link="$5"
  if [ ! -e "$target" ]; then
    warn "$target does not exist, skipping $name"
    return 0
  fi
  current="$(current_value "$name")"
  if [ -n "$current" ] && [ "$current" != "$target" ]; then
    echo "nvdeb: $name currently resolves to $current"
  fi
  set -- "$link" "$name" "$target" "$priority"
  if [ -n "$slave_name" ] && [ -e "$manpage" ]; then
    set -- "$@" --slave "$slave_link" "$slave_name" "$manpage"
  fi
  update-alternatives --install "$@" || warn "failed to register $name"
}

summary() {
  value="$(current_value "$1")"
  printf '  %-9s -> %s\n' "$1" "${value:-(none)}"
}"#;

const UNREGISTER_FN: &str = r#"unregister() {
  name="$1"
  if [ "$(current_value "$name")" = "$target" ]; then
    update-alternatives --remove "$name" "$target" || warn "failed to remove $name"
  fi
}"#;

const PURGE_FN: &str = r#"purge_alternative() {
  name="$1"
  current="$(current_value "$name")"
  if update-alternatives --list "$name" 2>/dev/null | grep -qxF "$target"; then
    update-alternatives --remove "$name" "$target" >/dev/null 2>&1 || true
  fi
  if [ "$current" = "$target" ]; then
    update-alternatives --auto "$name" >/dev/null 2>&1 || true
  fi
}"#;

fn register_call(binding: &AlternativeBinding) -> String {
  let (slave_name, slave_link) = match &binding.slave {
    Some(slave) => (shell_quote(&slave.name), quote_path(&slave.link)),
    None => ("''".to_string(), "''".to_string()),
  };
  format!(
    "register {} {} {} {} {}",
    shell_quote(&binding.name),
    quote_path(&binding.link),
    binding.priority,
    slave_name,
    slave_link
  )
}

/// Render the postinst script.
///
/// Registers every binding whose target exists, with the man page slave when
/// the man page exists, then prints where each name resolves. Re-running it
/// overwrites the same entries.
pub fn render_install_procedure(set: &AlternativeSet) -> String {
  let mut script = ScriptBuilder::new(MaintainerScript::Postinst, set);
  let manpage = set.manpage().map(quote_path).unwrap_or_else(|| "''".to_string());
  script.line(&format!("manpage={manpage}"));
  script.blank();
  script.block(REGISTER_FN);

  for binding in set.bindings() {
    script.line(&register_call(binding));
  }
  script.blank();

  script.line(&format!("echo \"{APP_NAME}: editor alternatives:\""));
  for binding in set.bindings() {
    script.line(&format!("summary {}", shell_quote(&binding.name)));
  }
  script.blank();
  script.finish()
}

/// Render the prerm script.
///
/// On `remove` or `purge`, drops each entry that currently resolves to the
/// target. Groups resolving elsewhere, or missing, are left alone.
pub fn render_remove_procedure(set: &AlternativeSet) -> String {
  let mut script = ScriptBuilder::new(MaintainerScript::Prerm, set);
  script.block(UNREGISTER_FN);

  script.line("case \"$1\" in");
  script.line("  remove|purge)");
  for binding in set.bindings() {
    script.line(&format!("    unregister {}", shell_quote(&binding.name)));
  }
  script.line("    ;;");
  script.line("esac");
  script.blank();
  script.finish()
}

/// Render the postrm script.
///
/// On `purge`, drops any entry still naming the target and puts groups that
/// resolved to it back into automatic mode. Every failure is swallowed.
pub fn render_purge_procedure(set: &AlternativeSet) -> String {
  let mut script = ScriptBuilder::new(MaintainerScript::Postrm, set);
  script.block(PURGE_FN);

  script.line("case \"$1\" in");
  script.line("  purge)");
  for binding in set.bindings() {
    script.line(&format!("    purge_alternative {}", shell_quote(&binding.name)));
  }
  script.line("    ;;");
  script.line("esac");
  script.blank();
  script.finish()
}
