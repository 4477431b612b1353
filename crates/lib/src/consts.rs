/// Application name, used for cache directories and log prefixes.
pub const APP_NAME: &str = "nvdeb";

/// Upstream repository cloned when no `--repo` is given.
pub const DEFAULT_REPO_URL: &str = "https://github.com/neovim/neovim.git";

/// Default Debian package name.
pub const DEFAULT_PACKAGE_NAME: &str = "neovim";

/// Default install prefix baked into the build.
pub const DEFAULT_PREFIX: &str = "/usr/local";

/// Name of the editor binary under `<prefix>/bin`.
pub const BINARY_NAME: &str = "nvim";

/// Man page of the editor under `<prefix>/share/man/man1`, uncompressed.
pub const MANPAGE_NAME: &str = "nvim.1";

/// Git ref built by default.
pub const STABLE_REF: &str = "stable";

/// Git ref built with `--no-stable`.
pub const NIGHTLY_REF: &str = "origin/master";

/// Priority of every alternative the package registers.
pub const ALTERNATIVE_PRIORITY: i32 = 60;

/// Legacy command names the editor provides as alternatives.
pub const ALTERNATIVE_NAMES: [&str; 9] = ["vi", "vim", "vim.tiny", "editor", "ex", "view", "rview", "rvim", "vimdiff"];

/// Directory the primary alternative links live in.
pub const ALTERNATIVE_LINK_DIR: &str = "/usr/bin";

/// Directory the man page slave links live in.
pub const MANPAGE_LINK_DIR: &str = "/usr/share/man/man1";

/// Runtime dependencies written to the control record.
pub const PACKAGE_DEPENDS: &[&str] = &["libc6", "libgcc-s1"];

pub const PACKAGE_HOMEPAGE: &str = "https://neovim.io";
pub const PACKAGE_SECTION: &str = "editors";
pub const PACKAGE_SUMMARY: &str = "heavily refactored vim fork";
pub const PACKAGE_DESCRIPTION: &str = "Neovim is a fork of Vim focused on extensibility and usability.\n\
This package was built from source and registers itself as an alternative\n\
for vi, vim, editor and related commands.";
