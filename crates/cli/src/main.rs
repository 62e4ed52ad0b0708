mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::output::print_error;

/// quilt - compose addon trees for a modular build
#[derive(Parser)]
#[command(name = "quilt")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging (RUST_LOG takes precedence)
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// List addons in composition order
  Addons {
    /// Project directory containing package.json
    #[arg(short, long, default_value = ".")]
    project: PathBuf,

    /// Print as JSON
    #[arg(long)]
    json: bool,
  },

  /// Print the composed build plan as JSON
  Compose {
    /// Project directory containing package.json
    #[arg(short, long, default_value = ".")]
    project: PathBuf,

    /// Compose a single category (app, styles, templates, addon, vendor, test-support, public)
    #[arg(short, long)]
    category: Option<String>,
  },

  /// Print the merged addon configuration as JSON
  Config {
    /// Project directory containing package.json
    #[arg(short, long, default_value = ".")]
    project: PathBuf,

    /// Environment name passed to addon config modules (default: project option)
    #[arg(short, long)]
    environment: Option<String>,
  },

  /// Show version and environment information
  Info,
}

fn init_tracing(verbose: bool) {
  let default_level = if verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let result = match cli.command {
    Commands::Addons { project, json } => cmd::cmd_addons(&project, json),
    Commands::Compose { project, category } => cmd::cmd_compose(&project, category.as_deref()),
    Commands::Config { project, environment } => cmd::cmd_config(&project, environment.as_deref()),
    Commands::Info => {
      cmd::cmd_info();
      Ok(())
    }
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      print_error(&format!("{:#}", err));
      ExitCode::FAILURE
    }
  }
}
