//! In-process registrar.
//!
//! Applies the same per-binding decisions as the rendered maintainer scripts,
//! against any [`Alternatives`] backend. A failing binding never stops the
//! others; its outcome is recorded in the returned [`AlternativesReport`].

use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::{Alternatives, AlternativeSet};

/// What happened to one binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
  /// The target was (re-)registered. `previous` is what the name resolved to before.
  Registered { previous: Option<PathBuf>, manpage: bool },
  /// The target's entry was dropped.
  Removed { reset_to_auto: bool },
  /// Nothing to do: the group is missing or resolves to another provider.
  Unchanged { current: Option<PathBuf> },
  /// The binding was not attempted.
  Skipped { reason: String },
  /// The backend reported an error for this binding.
  Failed { error: String },
}

/// Outcome of one named binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BindingOutcome {
  pub name: String,
  #[serde(flatten)]
  pub outcome: Outcome,
}

/// Per-binding results of an install, remove or purge run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AlternativesReport {
  pub bindings: Vec<BindingOutcome>,
}

impl AlternativesReport {
  fn record(&mut self, name: &str, outcome: Outcome) {
    self.bindings.push(BindingOutcome {
      name: name.to_string(),
      outcome,
    });
  }

  pub fn get(&self, name: &str) -> Option<&Outcome> {
    self.bindings.iter().find(|b| b.name == name).map(|b| &b.outcome)
  }

  pub fn registered(&self) -> usize {
    self.count(|o| matches!(o, Outcome::Registered { .. }))
  }

  pub fn removed(&self) -> usize {
    self.count(|o| matches!(o, Outcome::Removed { .. }))
  }

  pub fn skipped(&self) -> usize {
    self.count(|o| matches!(o, Outcome::Skipped { .. }))
  }

  pub fn failed(&self) -> usize {
    self.count(|o| matches!(o, Outcome::Failed { .. }))
  }

  /// True when no binding failed. Skips do not count as failures.
  pub fn is_success(&self) -> bool {
    self.failed() == 0
  }

  fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
    self.bindings.iter().filter(|b| pred(&b.outcome)).count()
  }
}

/// Register every binding whose target exists.
pub fn install(db: &mut dyn Alternatives, set: &AlternativeSet) -> AlternativesReport {
  let mut report = AlternativesReport::default();

  for binding in set.bindings() {
    let name = binding.name.as_str();

    if !binding.target.exists() {
      warn!(alternative = name, binary = %binding.target.display(), "target does not exist, skipping");
      report.record(
        name,
        Outcome::Skipped {
          reason: format!("{} does not exist", binding.target.display()),
        },
      );
      continue;
    }

    let previous = match db.query(name) {
      Ok(group) => group.and_then(|g| g.value),
      Err(e) => {
        debug!(alternative = name, error = %e, "query failed, assuming unregistered");
        None
      }
    };
    if let Some(current) = previous.as_deref().filter(|v| *v != binding.target) {
      info!(alternative = name, current = %current.display(), "currently resolves to another provider");
    }

    let slave = binding.slave.as_ref().filter(|s| s.target.exists());
    let outcome = match db.install(binding, slave) {
      Ok(()) => Outcome::Registered {
        previous,
        manpage: slave.is_some(),
      },
      Err(e) => {
        warn!(alternative = name, error = %e, "failed to register");
        Outcome::Failed { error: e.to_string() }
      }
    };
    report.record(name, outcome);
  }

  report
}

/// Drop each entry that currently resolves to the target.
///
/// Groups resolving to another provider keep their resolution.
pub fn remove(db: &mut dyn Alternatives, set: &AlternativeSet) -> AlternativesReport {
  let mut report = AlternativesReport::default();
  let target = set.target();

  for binding in set.bindings() {
    let name = binding.name.as_str();

    let group = match db.query(name) {
      Ok(group) => group,
      Err(e) => {
        warn!(alternative = name, error = %e, "failed to query");
        report.record(name, Outcome::Failed { error: e.to_string() });
        continue;
      }
    };

    let outcome = match group {
      Some(group) if group.points_at(target) => match db.remove(name, target) {
        Ok(()) => Outcome::Removed { reset_to_auto: false },
        Err(e) => {
          warn!(alternative = name, error = %e, "failed to remove");
          Outcome::Failed { error: e.to_string() }
        }
      },
      Some(group) => Outcome::Unchanged { current: group.value },
      None => Outcome::Unchanged { current: None },
    };
    report.record(name, outcome);
  }

  report
}

/// Drop every remaining entry for the target and reset the groups that
/// resolved to it to automatic mode.
///
/// Best effort: errors are recorded per name and never stop the run.
pub fn purge(db: &mut dyn Alternatives, set: &AlternativeSet) -> AlternativesReport {
  let mut report = AlternativesReport::default();
  let target = set.target();

  for binding in set.bindings() {
    let name = binding.name.as_str();

    let group = match db.query(name) {
      Ok(Some(group)) => group,
      Ok(None) => {
        report.record(name, Outcome::Unchanged { current: None });
        continue;
      }
      Err(e) => {
        debug!(alternative = name, error = %e, "query failed during purge");
        report.record(name, Outcome::Failed { error: e.to_string() });
        continue;
      }
    };

    if !group.contains(target) {
      report.record(name, Outcome::Unchanged { current: group.value });
      continue;
    }

    let was_current = group.points_at(target);
    if let Err(e) = db.remove(name, target) {
      debug!(alternative = name, error = %e, "remove failed during purge");
      report.record(name, Outcome::Failed { error: e.to_string() });
      continue;
    }

    // The group vanishes with its last provider; nothing left to reset.
    let still_exists = matches!(db.query(name), Ok(Some(_)));
    let reset_to_auto = was_current && still_exists && db.set_auto(name).is_ok();
    report.record(name, Outcome::Removed { reset_to_auto });
  }

  report
}
