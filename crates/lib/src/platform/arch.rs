use std::fmt;

/// CPU architectures with a Debian port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
  X86_64,
  X86,
  Aarch64,
  Arm,
  Riscv64,
  Powerpc64le,
  S390x,
}

impl Arch {
  /// Detect the architecture this binary was compiled for
  pub fn current() -> Option<Self> {
    Self::from_rust(std::env::consts::ARCH, cfg!(target_endian = "little"))
  }

  fn from_rust(arch: &str, little_endian: bool) -> Option<Self> {
    match arch {
      "x86_64" => Some(Self::X86_64),
      "x86" => Some(Self::X86),
      "aarch64" => Some(Self::Aarch64),
      "arm" => Some(Self::Arm),
      "riscv64" => Some(Self::Riscv64),
      "powerpc64" if little_endian => Some(Self::Powerpc64le),
      "s390x" => Some(Self::S390x),
      _ => None,
    }
  }

  /// Returns the Debian architecture name (`dpkg --print-architecture`)
  pub fn as_debian(&self) -> &'static str {
    match self {
      Self::X86_64 => "amd64",
      Self::X86 => "i386",
      Self::Aarch64 => "arm64",
      Self::Arm => "armhf",
      Self::Riscv64 => "riscv64",
      Self::Powerpc64le => "ppc64el",
      Self::S390x => "s390x",
    }
  }
}

impl fmt::Display for Arch {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_debian())
  }
}
