//! Staging tree: the future package contents plus `DEBIAN/`.

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use flate2::{Compression, GzBuilder};
use tracing::debug;
use walkdir::WalkDir;

use super::{ControlFile, PackageError, write_maintainer_scripts, write_with_mode};
use crate::alternatives::AlternativeSet;

const CONTROL_DIR: &str = "DEBIAN";

/// A directory laid out like the target filesystem.
#[derive(Debug)]
pub struct Staging {
  root: PathBuf,
}

impl Staging {
  /// Create `root` and its `DEBIAN/` directory, both mode 0755 as
  /// `dpkg-deb` requires.
  pub fn new(root: impl Into<PathBuf>) -> Result<Self, PackageError> {
    let root = root.into();
    let control = root.join(CONTROL_DIR);
    fs::create_dir_all(&control).map_err(|source| PackageError::CreateDir {
      path: control.clone(),
      source,
    })?;
    for dir in [&root, &control] {
      fs::set_permissions(dir, fs::Permissions::from_mode(0o755)).map_err(|source| PackageError::CreateDir {
        path: dir.clone(),
        source,
      })?;
    }
    Ok(Self { root })
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn control_dir(&self) -> PathBuf {
    self.root.join(CONTROL_DIR)
  }

  /// Where an absolute install path lands inside the staging tree.
  pub fn staged(&self, path: &Path) -> PathBuf {
    self.root.join(path.strip_prefix("/").unwrap_or(path))
  }

  /// Gzip every uncompressed `*.1` page in `<prefix>/share/man/man1`.
  ///
  /// Output is reproducible (`gzip -9n`): no embedded name or timestamp.
  /// Returns the number of pages compressed.
  pub fn compress_manpages(&self, prefix: &Path) -> Result<usize, PackageError> {
    let man1 = self.staged(&prefix.join("share").join("man").join("man1"));
    if !man1.is_dir() {
      return Ok(0);
    }

    let read_err = |path: &Path| {
      let path = path.to_path_buf();
      move |source| PackageError::Read { path, source }
    };

    let mut count = 0;
    for entry in fs::read_dir(&man1).map_err(read_err(&man1))? {
      let page = entry.map_err(read_err(&man1))?.path();
      if page.extension().is_none_or(|ext| ext != "1") || !page.is_file() {
        continue;
      }

      let compressed = page.with_extension("1.gz");
      let write_err = |source| PackageError::WriteFile {
        path: compressed.clone(),
        source,
      };

      let mut input = BufReader::new(File::open(&page).map_err(read_err(&page))?);
      let output = File::create(&compressed).map_err(write_err)?;
      let mut encoder = GzBuilder::new().write(output, Compression::best());
      io::copy(&mut input, &mut encoder).map_err(write_err)?;
      encoder.finish().map_err(write_err)?;
      fs::remove_file(&page).map_err(write_err)?;
      fs::set_permissions(&compressed, fs::Permissions::from_mode(0o644)).map_err(write_err)?;

      debug!(page = %compressed.display(), "compressed man page");
      count += 1;
    }
    Ok(count)
  }

  /// Size of the package contents in KiB, rounded up, excluding `DEBIAN/`.
  pub fn installed_size_kib(&self) -> Result<u64, PackageError> {
    let control = self.control_dir();
    let mut bytes = 0u64;
    for entry in WalkDir::new(&self.root).into_iter().filter_entry(|e| e.path() != control) {
      let entry = entry?;
      if entry.file_type().is_file() {
        bytes += entry.metadata()?.len();
      }
    }
    Ok(bytes.div_ceil(1024))
  }

  pub fn write_control(&self, control: &ControlFile) -> Result<PathBuf, PackageError> {
    let path = self.control_dir().join("control");
    write_with_mode(&path, &control.render(), 0o644)?;
    Ok(path)
  }

  pub fn write_maintainer_scripts(&self, set: &AlternativeSet) -> Result<Vec<PathBuf>, PackageError> {
    write_maintainer_scripts(&self.control_dir(), set)
  }
}
