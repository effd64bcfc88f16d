//! Command line entry point for rewriting a bundler manifest after a build.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::Parser;

use manifest_cdn_rewriter::{ManifestOptions, TracingSink, logging, rewrite, try_rewrite};

/// Prefix every path in a build manifest with a deployment public path.
#[derive(Debug, Parser)]
#[command(name = "manifest-cdn-rewriter", version, about)]
struct Cli {
  /// Directory the bundler wrote its output to.
  #[arg(long, value_name = "DIR")]
  out_dir: Option<PathBuf>,

  /// Manifest path relative to the output directory.
  #[arg(long, value_name = "PATH")]
  file_name: Option<String>,

  /// Prefix applied to every rewritten path, e.g. a CDN origin.
  #[arg(long, value_name = "PREFIX", env = "MANIFEST_PUBLIC_PATH")]
  public_path: Option<String>,

  /// JSON config file with `fileName` and `publicPath`.
  #[arg(long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Exit with a failure status when the rewrite fails.
  #[arg(long)]
  strict: bool,

  /// Log debug output.
  #[arg(short, long)]
  verbose: bool,
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  if let Err(err) = logging::init(cli.verbose) {
    eprintln!("{err:#}");
  }

  match run(&cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      tracing::error!("{err:#}");
      ExitCode::FAILURE
    }
  }
}

fn run(cli: &Cli) -> Result<()> {
  let cwd = std::env::current_dir().context("failed to read current directory")?;
  let options = resolve_options(cli, &cwd)?;
  let output_dir = cli.out_dir.as_deref();

  if cli.strict {
    let summary = try_rewrite(output_dir, &options)?;
    tracing::info!(
      path = %summary.manifest_path.display(),
      entries = summary.entries,
      stylesheets = summary.stylesheets,
      "rewrote manifest"
    );
  } else {
    rewrite(output_dir, &options, &TracingSink);
  }
  Ok(())
}

/// Merge the config file (explicit or discovered in `cwd`) with command line flags.
fn resolve_options(cli: &Cli, cwd: &Path) -> Result<ManifestOptions> {
  let from_file = match &cli.config {
    Some(path) => Some(ManifestOptions::from_path(path)?),
    None => ManifestOptions::discover(cwd)?,
  };

  let file_name = cli
    .file_name
    .clone()
    .or_else(|| from_file.as_ref().map(|options| options.file_name.clone()));
  let Some(file_name) = file_name else {
    bail!("no manifest file name given; pass --file-name or set fileName in a config file");
  };

  let public_path = cli
    .public_path
    .clone()
    .or_else(|| from_file.and_then(|options| options.public_path));

  Ok(ManifestOptions {
    file_name,
    public_path,
  })
}
