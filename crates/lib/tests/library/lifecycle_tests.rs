//! Install, remove and purge across a package's life, on the in-memory
//! alternatives database.

use std::fs;
use std::path::{Path, PathBuf};

use nvdeb_lib::alternatives::{
  self, AlternativeBinding, AlternativeSet, Alternatives, MemoryAlternatives, Mode, Outcome,
};
use tempfile::TempDir;

const VIM_BASIC: &str = "/usr/bin/vim.basic";

fn installed_editor() -> (TempDir, AlternativeSet) {
  let temp = TempDir::new().unwrap();
  let prefix = temp.path().join("usr/local");
  fs::create_dir_all(prefix.join("bin")).unwrap();
  fs::create_dir_all(prefix.join("share/man/man1")).unwrap();
  fs::write(prefix.join("bin/nvim"), "nvim").unwrap();
  fs::write(prefix.join("share/man/man1/nvim.1.gz"), "gz").unwrap();
  let set = AlternativeSet::for_prefix(&prefix);
  (temp, set)
}

/// A database where classic vim already provides `vim` and `vi` at priority 50.
fn db_with_vim() -> MemoryAlternatives {
  let mut db = MemoryAlternatives::default();
  for name in ["vi", "vim"] {
    let binding = AlternativeBinding {
      name: name.to_string(),
      link: Path::new("/usr/bin").join(name),
      target: PathBuf::from(VIM_BASIC),
      priority: 50,
      slave: None,
    };
    db.install(&binding, None).unwrap();
  }
  db
}

fn value(db: &MemoryAlternatives, name: &str) -> Option<PathBuf> {
  db.query(name).unwrap().and_then(|g| g.value)
}

#[test]
fn higher_priority_wins_and_removal_falls_back() {
  let (_temp, set) = installed_editor();
  let mut db = db_with_vim();

  let report = alternatives::install(&mut db, &set);
  assert_eq!(report.registered(), 9);
  assert_eq!(
    report.get("vim"),
    Some(&Outcome::Registered {
      previous: Some(PathBuf::from(VIM_BASIC)),
      manpage: true,
    })
  );
  assert_eq!(value(&db, "vim").as_deref(), Some(set.target()));

  let report = alternatives::remove(&mut db, &set);
  assert_eq!(report.removed(), 9);
  assert_eq!(value(&db, "vim"), Some(PathBuf::from(VIM_BASIC)));
  assert!(db.query("vimdiff").unwrap().is_none());

  let report = alternatives::purge(&mut db, &set);
  assert!(report.is_success());
  assert_eq!(report.removed(), 0);
  assert_eq!(value(&db, "vi"), Some(PathBuf::from(VIM_BASIC)));
}

#[test]
fn manual_choice_survives_the_whole_lifecycle() {
  let (_temp, set) = installed_editor();
  let mut db = db_with_vim();
  db.set_manual("vi", Path::new(VIM_BASIC)).unwrap();

  alternatives::install(&mut db, &set);
  let group = db.query("vi").unwrap().unwrap();
  assert_eq!(group.mode, Mode::Manual);
  assert_eq!(group.value, Some(PathBuf::from(VIM_BASIC)));
  assert!(group.contains(set.target()));

  let report = alternatives::remove(&mut db, &set);
  assert_eq!(
    report.get("vi"),
    Some(&Outcome::Unchanged {
      current: Some(PathBuf::from(VIM_BASIC))
    })
  );

  let report = alternatives::purge(&mut db, &set);
  assert_eq!(report.get("vi"), Some(&Outcome::Removed { reset_to_auto: false }));
  let group = db.query("vi").unwrap().unwrap();
  assert_eq!(group.mode, Mode::Manual);
  assert!(!group.contains(set.target()));
}

#[test]
fn reinstall_after_purge_restores_everything() {
  let (_temp, set) = installed_editor();
  let mut db = MemoryAlternatives::default();

  alternatives::install(&mut db, &set);
  let registered = db.clone();
  alternatives::purge(&mut db, &set);
  assert!(db.group_names().is_empty());

  alternatives::install(&mut db, &set);
  assert_eq!(db, registered);
}
