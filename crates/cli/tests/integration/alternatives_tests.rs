//! `nvdeb alternatives` driving a stub update-alternatives.

use predicates::prelude::*;
use serde_json::Value;

use super::common::{Stub, TestEnv};

fn report(stdout: &[u8]) -> Vec<Value> {
  let json: Value = serde_json::from_slice(stdout).unwrap();
  json["bindings"].as_array().unwrap().clone()
}

#[test]
fn install_registers_every_name() {
  let env = TestEnv::new();
  env.install_editor(true);
  let stub = env.write_stub(&Stub::default());

  let output = env
    .nvdeb_cmd()
    .args(["alternatives", "install", "--format", "json", "--prefix"])
    .arg(env.prefix())
    .arg("--program")
    .arg(&stub)
    .output()
    .unwrap();

  assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
  let bindings = report(&output.stdout);
  assert_eq!(bindings.len(), 9);
  assert_eq!(bindings[0]["name"], "vi");
  assert!(bindings.iter().all(|b| b["outcome"] == "registered"));
  assert!(bindings.iter().all(|b| b["manpage"] == true));
  assert_eq!(env.calls("--install").len(), 9);
}

#[test]
fn install_skips_missing_binary() {
  let env = TestEnv::new();
  let stub = env.write_stub(&Stub::default());

  env
    .nvdeb_cmd()
    .args(["alternatives", "install", "--prefix"])
    .arg(env.prefix())
    .arg("--program")
    .arg(&stub)
    .assert()
    .success()
    .stdout(predicate::str::contains("skipped"));

  assert!(env.calls("--install").is_empty());
}

#[test]
fn failed_registrations_exit_non_zero() {
  let env = TestEnv::new();
  env.install_editor(false);
  let stub = env.write_stub(&Stub {
    install_code: 2,
    ..Stub::default()
  });

  env
    .nvdeb_cmd()
    .args(["alternatives", "install", "--prefix"])
    .arg(env.prefix())
    .arg("--program")
    .arg(&stub)
    .assert()
    .failure()
    .stderr(predicate::str::contains("9 of 9 alternatives failed"));
}

#[test]
fn purge_resets_groups_pointing_at_target() {
  let env = TestEnv::new();
  let stub = env.write_stub(&Stub {
    value: Some(env.target()),
    ..Stub::default()
  });

  let output = env
    .nvdeb_cmd()
    .args(["alternatives", "purge", "--format", "json", "--prefix"])
    .arg(env.prefix())
    .arg("--program")
    .arg(&stub)
    .output()
    .unwrap();

  assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
  let bindings = report(&output.stdout);
  assert!(bindings.iter().all(|b| b["outcome"] == "removed"));
  assert!(bindings.iter().all(|b| b["reset_to_auto"] == true));
  assert_eq!(env.calls("--auto").len(), 9);
}

#[test]
fn remove_of_missing_groups_succeeds_under_a_translated_locale() {
  let env = TestEnv::new();
  let stub = env.write_stub(&Stub::default());

  let output = env
    .nvdeb_cmd()
    .args(["alternatives", "remove", "--format", "json", "--prefix"])
    .arg(env.prefix())
    .arg("--program")
    .arg(&stub)
    .env("LANGUAGE", "de")
    .env("LC_ALL", "de_DE.UTF-8")
    .output()
    .unwrap();

  assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
  let bindings = report(&output.stdout);
  assert_eq!(bindings.len(), 9);
  assert!(bindings.iter().all(|b| b["outcome"] == "unchanged"));
  assert!(env.calls("--remove").is_empty());
}

#[test]
fn purge_reports_failures_but_succeeds() {
  let env = TestEnv::new();
  let stub = env.write_stub(&Stub {
    value: Some(env.target()),
    remove_code: 2,
    ..Stub::default()
  });

  env
    .nvdeb_cmd()
    .args(["alternatives", "purge", "--prefix"])
    .arg(env.prefix())
    .arg("--program")
    .arg(&stub)
    .assert()
    .success()
    .stdout(predicate::str::contains("failed:"))
    .stderr(predicate::str::contains("9 of 9 alternatives failed"));

  assert_eq!(env.calls("--remove").len(), 9);
}

#[test]
fn remove_failures_exit_non_zero() {
  let env = TestEnv::new();
  let stub = env.write_stub(&Stub {
    value: Some(env.target()),
    remove_code: 2,
    ..Stub::default()
  });

  env
    .nvdeb_cmd()
    .args(["alternatives", "remove", "--prefix"])
    .arg(env.prefix())
    .arg("--program")
    .arg(&stub)
    .assert()
    .failure()
    .stderr(predicate::str::contains("9 of 9 alternatives failed"));
}
