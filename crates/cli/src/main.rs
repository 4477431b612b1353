mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use nvdeb_lib::config::{BuildOptions, BuildType};
use nvdeb_lib::consts::{DEFAULT_PACKAGE_NAME, DEFAULT_PREFIX, DEFAULT_REPO_URL};
use nvdeb_lib::pipeline::PipelineError;

use cmd::AlternativesAction;
use output::{OutputFormat, print_error};

/// nvdeb - Build Neovim from source and package it as a .deb
#[derive(Parser)]
#[command(name = "nvdeb")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(flatten)]
  build: BuildArgs,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Args)]
struct BuildArgs {
  /// Install prefix baked into the build
  #[arg(short, long, default_value = DEFAULT_PREFIX)]
  prefix: PathBuf,

  /// CMake build type: Release, Debug, RelWithDebInfo or MinSizeRel
  #[arg(short = 't', long = "type", default_value = "Release")]
  build_type: BuildType,

  /// Debian package name
  #[arg(short, long, default_value = DEFAULT_PACKAGE_NAME)]
  name: String,

  /// Keep the scratch directory after the run
  #[arg(long)]
  no_cleanup: bool,

  /// Build the development branch instead of the stable tag
  #[arg(long)]
  no_stable: bool,

  /// Do not embed the editor alternatives scripts
  #[arg(long)]
  no_alternatives: bool,

  /// Git repository to build from
  #[arg(long, default_value = DEFAULT_REPO_URL)]
  repo: String,

  /// Reuse a persistent checkout instead of a scratch clone
  #[arg(long)]
  source_dir: Option<PathBuf>,

  /// Directory the .deb is written to
  #[arg(short, long, default_value = ".")]
  output: PathBuf,

  /// Parallel build jobs (default: available CPUs)
  #[arg(short, long)]
  jobs: Option<usize>,
}

impl From<BuildArgs> for BuildOptions {
  fn from(args: BuildArgs) -> Self {
    BuildOptions {
      prefix: args.prefix,
      build_type: args.build_type,
      package_name: args.name,
      cleanup: !args.no_cleanup,
      stable: !args.no_stable,
      alternatives: !args.no_alternatives,
      repo_url: args.repo,
      source_dir: args.source_dir,
      output_dir: args.output,
      jobs: args.jobs,
    }
  }
}

#[derive(Subcommand)]
enum Commands {
  /// Write the maintainer scripts for a prefix without building
  Scripts {
    /// Install prefix the scripts point at
    #[arg(short, long, default_value = DEFAULT_PREFIX)]
    prefix: PathBuf,

    /// Directory to write postinst, prerm and postrm into
    #[arg(long, default_value = "debian")]
    out: PathBuf,
  },

  /// Apply the editor alternatives directly on this machine
  Alternatives {
    /// What to do with the alternatives
    #[arg(value_enum)]
    action: AlternativesAction,

    /// Install prefix holding the editor binary
    #[arg(short, long, default_value = DEFAULT_PREFIX)]
    prefix: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    format: OutputFormat,

    /// update-alternatives program to drive
    #[arg(long, default_value = "update-alternatives", hide = true)]
    program: PathBuf,
  },
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "info" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let result = match cli.command {
    None => cmd::cmd_build(cli.build.into()),
    Some(Commands::Scripts { prefix, out }) => cmd::cmd_scripts(&prefix, &out),
    Some(Commands::Alternatives {
      action,
      prefix,
      format,
      program,
    }) => cmd::cmd_alternatives(action, &prefix, format, program),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      print_error(&format!("{e:#}"));
      // 128 + SIGINT, as a shell reports a process killed by Ctrl-C.
      if matches!(e.downcast_ref::<PipelineError>(), Some(PipelineError::Interrupted)) {
        ExitCode::from(130)
      } else {
        ExitCode::FAILURE
      }
    }
  }
}
