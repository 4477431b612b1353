//! In-memory alternatives database.
//!
//! Models the parts of `update-alternatives` the registrar relies on:
//! automatic selection by highest priority, manual choices, and groups that
//! disappear with their last provider.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::{AlternativeBinding, AlternativeGroup, Alternatives, AlternativesError, Candidate, Mode, SlaveLink};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Provider {
  priority: i32,
  slaves: Vec<SlaveLink>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Group {
  manual: Option<PathBuf>,
  providers: BTreeMap<PathBuf, Provider>,
}

impl Group {
  fn value(&self) -> Option<&Path> {
    if let Some(choice) = self.manual.as_deref().filter(|c| self.providers.contains_key(*c)) {
      return Some(choice);
    }
    // Ties go to the lexically first path.
    self
      .providers
      .iter()
      .rev()
      .max_by_key(|(_, p)| p.priority)
      .map(|(path, _)| path.as_path())
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryAlternatives {
  groups: BTreeMap<String, Group>,
}

impl MemoryAlternatives {
  /// Names of every existing group, sorted.
  pub fn group_names(&self) -> Vec<&str> {
    self.groups.keys().map(String::as_str).collect()
  }

  /// Slave links registered alongside `target` in `name`.
  pub fn slaves(&self, name: &str, target: &Path) -> &[SlaveLink] {
    self
      .groups
      .get(name)
      .and_then(|g| g.providers.get(target))
      .map(|p| p.slaves.as_slice())
      .unwrap_or_default()
  }

  /// Pin `name` to `target`, like `update-alternatives --set`.
  pub fn set_manual(&mut self, name: &str, target: &Path) -> Result<(), AlternativesError> {
    let group = self
      .groups
      .get_mut(name)
      .filter(|g| g.providers.contains_key(target))
      .ok_or_else(|| AlternativesError::NoSuchGroup(name.to_string()))?;
    group.manual = Some(target.to_path_buf());
    Ok(())
  }
}

impl Alternatives for MemoryAlternatives {
  fn query(&self, name: &str) -> Result<Option<AlternativeGroup>, AlternativesError> {
    Ok(self.groups.get(name).map(|group| AlternativeGroup {
      name: name.to_string(),
      mode: if group.manual.is_some() { Mode::Manual } else { Mode::Auto },
      value: group.value().map(Path::to_path_buf),
      candidates: group
        .providers
        .iter()
        .map(|(path, p)| Candidate {
          path: path.clone(),
          priority: p.priority,
        })
        .collect(),
    }))
  }

  fn install(&mut self, binding: &AlternativeBinding, slave: Option<&SlaveLink>) -> Result<(), AlternativesError> {
    let group = self.groups.entry(binding.name.clone()).or_insert_with(|| Group {
      manual: None,
      providers: BTreeMap::new(),
    });
    group.providers.insert(
      binding.target.clone(),
      Provider {
        priority: binding.priority,
        slaves: slave.cloned().into_iter().collect(),
      },
    );
    Ok(())
  }

  fn remove(&mut self, name: &str, target: &Path) -> Result<(), AlternativesError> {
    let Some(group) = self.groups.get_mut(name) else {
      return Ok(());
    };
    group.providers.remove(target);
    if group.manual.as_deref() == Some(target) {
      group.manual = None;
    }
    if group.providers.is_empty() {
      self.groups.remove(name);
    }
    Ok(())
  }

  fn set_auto(&mut self, name: &str) -> Result<(), AlternativesError> {
    let group = self
      .groups
      .get_mut(name)
      .ok_or_else(|| AlternativesError::NoSuchGroup(name.to_string()))?;
    group.manual = None;
    Ok(())
  }
}
