//! Staging a fake install tree the way the pipeline does after `make install`.

use std::fs;
use std::path::Path;

use nvdeb_lib::alternatives::{AlternativeSet, MaintainerScript};
use nvdeb_lib::config::{BuildConfig, BuildOptions};
use nvdeb_lib::package::{Staging, deb_file_name};
use nvdeb_lib::pipeline::stage_metadata;
use nvdeb_lib::platform::arch::Arch;
use tempfile::TempDir;

fn staged(prefix: &str) -> (TempDir, Staging) {
  let temp = TempDir::new().unwrap();
  let staging = Staging::new(temp.path().join("pkg")).unwrap();
  let prefix = Path::new(prefix);
  let bin = staging.staged(&prefix.join("bin"));
  let man1 = staging.staged(&prefix.join("share/man/man1"));
  fs::create_dir_all(&bin).unwrap();
  fs::create_dir_all(&man1).unwrap();
  fs::write(bin.join("nvim"), vec![0u8; 4096]).unwrap();
  fs::write(man1.join("nvim.1"), ".TH NVIM 1\n".repeat(100)).unwrap();
  (temp, staging)
}

#[test]
fn custom_prefix_flows_into_scripts_and_control() {
  let (_temp, staging) = staged("/opt/neovim");
  let config = BuildConfig::new(BuildOptions {
    prefix: "/opt/neovim/".into(),
    package_name: "neovim-nightly".to_string(),
    stable: false,
    ..BuildOptions::default()
  })
  .unwrap();

  stage_metadata(&config, &staging, "0.11.0~dev.1200.g1a2b3c4", Arch::Aarch64).unwrap();

  let debian = staging.control_dir();
  let set = AlternativeSet::for_prefix(Path::new("/opt/neovim"));
  for kind in MaintainerScript::ALL {
    let written = fs::read_to_string(debian.join(kind.file_name())).unwrap();
    assert_eq!(written, kind.render(&set));
  }

  let postinst = fs::read_to_string(debian.join("postinst")).unwrap();
  assert!(postinst.contains("target='/opt/neovim/bin/nvim'"));
  assert!(postinst.contains("manpage='/opt/neovim/share/man/man1/nvim.1.gz'"));
  assert_eq!(postinst.lines().filter(|l| l.starts_with("register '")).count(), 9);

  let control = fs::read_to_string(debian.join("control")).unwrap();
  assert!(control.contains("Package: neovim-nightly\n"));
  assert!(control.contains("Version: 0.11.0~dev.1200.g1a2b3c4\n"));
  assert!(control.contains("Architecture: arm64\n"));

  assert_eq!(
    deb_file_name(config.package_name(), "0.11.0~dev.1200.g1a2b3c4", Arch::Aarch64.as_debian()),
    "neovim-nightly_0.11.0~dev.1200.g1a2b3c4_arm64.deb"
  );
}

#[test]
fn installed_size_matches_control() {
  let (_temp, staging) = staged("/usr/local");
  let config = BuildConfig::new(BuildOptions::default()).unwrap();

  stage_metadata(&config, &staging, "0.10.2", Arch::X86_64).unwrap();

  let size = staging.installed_size_kib().unwrap();
  let control = fs::read_to_string(staging.control_dir().join("control")).unwrap();
  assert!(control.contains(&format!("Installed-Size: {size}\n")));
  assert!(size >= 4);
}
