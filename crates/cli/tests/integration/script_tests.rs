//! Maintainer scripts executed under /bin/sh.

use predicates::prelude::*;

use super::common::{Stub, TestEnv};

const NAMES: [&str; 9] = ["vi", "vim", "vim.tiny", "editor", "ex", "view", "rview", "rvim", "vimdiff"];

#[test]
fn postinst_registers_every_name_with_manpage_slave() {
  let env = TestEnv::new();
  env.install_editor(true);
  env.write_stub(&Stub::default());
  let debian = env.write_scripts();

  env
    .run_script(&debian.join("postinst"), &["configure"])
    .assert()
    .success()
    .stdout(predicate::str::contains("nvdeb: editor alternatives:"));

  let installs = env.calls("--install");
  assert_eq!(installs.len(), 9);
  let target = env.target().display().to_string();
  let manpage = env.manpage().display().to_string();
  for (call, name) in installs.iter().zip(NAMES) {
    assert_eq!(
      *call,
      format!("--install /usr/bin/{name} {name} {target} 60 --slave /usr/share/man/man1/{name}.1.gz {name}.1.gz {manpage}")
    );
  }
}

#[test]
fn postinst_without_manpage_omits_slave() {
  let env = TestEnv::new();
  env.install_editor(false);
  env.write_stub(&Stub::default());
  let debian = env.write_scripts();

  env.run_script(&debian.join("postinst"), &["configure"]).assert().success();

  let installs = env.calls("--install");
  assert_eq!(installs.len(), 9);
  assert!(installs.iter().all(|call| !call.contains("--slave")));
  assert!(installs[0].ends_with(" 60"));
}

#[test]
fn postinst_skips_when_binary_is_missing() {
  let env = TestEnv::new();
  env.write_stub(&Stub::default());
  let debian = env.write_scripts();

  env
    .run_script(&debian.join("postinst"), &["configure"])
    .assert()
    .success()
    .stderr(predicate::str::contains("does not exist, skipping vi"));

  assert!(env.calls("--install").is_empty());
}

#[test]
fn postinst_is_idempotent() {
  let env = TestEnv::new();
  env.install_editor(true);
  env.write_stub(&Stub::default());
  let debian = env.write_scripts();

  env.run_script(&debian.join("postinst"), &["configure"]).assert().success();
  let first = env.calls("--install");
  env.run_script(&debian.join("postinst"), &["configure"]).assert().success();
  let all = env.calls("--install");

  assert_eq!(all.len(), 18);
  assert_eq!(all[..9], first[..]);
  assert_eq!(all[9..], first[..]);
}

#[test]
fn postinst_survives_failing_registration() {
  let env = TestEnv::new();
  env.install_editor(true);
  env.write_stub(&Stub {
    install_code: 2,
    ..Stub::default()
  });
  let debian = env.write_scripts();

  env
    .run_script(&debian.join("postinst"), &["configure"])
    .assert()
    .success()
    .stderr(predicate::str::contains("failed to register vim"));

  assert_eq!(env.calls("--install").len(), 9);
}

#[test]
fn postinst_reports_foreign_provider() {
  let env = TestEnv::new();
  env.install_editor(false);
  env.write_stub(&Stub {
    value: Some("/usr/bin/vim.basic".into()),
    ..Stub::default()
  });
  let debian = env.write_scripts();

  env
    .run_script(&debian.join("postinst"), &["configure"])
    .assert()
    .success()
    .stdout(predicate::str::contains("vi currently resolves to /usr/bin/vim.basic"));
}

#[test]
fn prerm_removes_entries_pointing_at_target() {
  let env = TestEnv::new();
  env.write_stub(&Stub {
    value: Some(env.target()),
    ..Stub::default()
  });
  let debian = env.write_scripts();

  env.run_script(&debian.join("prerm"), &["remove"]).assert().success();

  let removes = env.calls("--remove");
  assert_eq!(removes.len(), 9);
  assert_eq!(removes[0], format!("--remove vi {}", env.target().display()));
}

#[test]
fn prerm_leaves_foreign_choice_alone() {
  let env = TestEnv::new();
  env.write_stub(&Stub {
    value: Some("/usr/bin/vim.basic".into()),
    ..Stub::default()
  });
  let debian = env.write_scripts();

  env.run_script(&debian.join("prerm"), &["remove"]).assert().success();

  assert!(env.calls("--remove").is_empty());
}

#[test]
fn prerm_ignores_upgrade() {
  let env = TestEnv::new();
  env.write_stub(&Stub {
    value: Some(env.target()),
    ..Stub::default()
  });
  let debian = env.write_scripts();

  env.run_script(&debian.join("prerm"), &["upgrade", "0.10.3"]).assert().success();

  assert!(env.log().is_empty());
}

#[test]
fn postrm_purge_removes_and_resets_to_auto() {
  let env = TestEnv::new();
  env.write_stub(&Stub {
    value: Some(env.target()),
    ..Stub::default()
  });
  let debian = env.write_scripts();

  env.run_script(&debian.join("postrm"), &["purge"]).assert().success();

  assert_eq!(env.calls("--remove").len(), 9);
  let autos = env.calls("--auto");
  assert_eq!(autos.len(), 9);
  assert_eq!(autos[8], "--auto vimdiff");
}

#[test]
fn postrm_purge_succeeds_with_nothing_registered() {
  let env = TestEnv::new();
  env.write_stub(&Stub::default());
  let debian = env.write_scripts();

  env.run_script(&debian.join("postrm"), &["purge"]).assert().success();

  assert!(env.calls("--remove").is_empty());
  assert!(env.calls("--auto").is_empty());
}

#[test]
fn postrm_remove_does_nothing() {
  let env = TestEnv::new();
  env.write_stub(&Stub {
    value: Some(env.target()),
    ..Stub::default()
  });
  let debian = env.write_scripts();

  env.run_script(&debian.join("postrm"), &["remove"]).assert().success();

  assert!(env.log().is_empty());
}
