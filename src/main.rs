mod archive;
mod checks;
mod commands;
mod core;
mod release;
mod ui;

use clap::{ArgAction, Args, Parser, Subcommand};
use commands::assemble::AssembleOptions;
use core::config::{Overrides, parse_override};
use core::context::ModuleContext;
use core::error::{ModError, print_error};
use release::ModrinthPublisher;
use std::path::PathBuf;

/// Package, gate and publish Minecraft mod releases
#[derive(Parser)]
#[command(name = "modrelease")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  #[command(flatten)]
  global: GlobalArgs,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
  /// Module directory (holds gradle.properties and build/)
  #[arg(long, global = true, default_value = ".")]
  project_dir: PathBuf,

  /// Repository root (default: enclosing git work tree)
  #[arg(long, global = true)]
  repo_root: Option<PathBuf>,

  /// Override a property, e.g. -P mod_version=2.1.1
  #[arg(short = 'P', value_name = "KEY=VALUE", global = true, value_parser = parse_override)]
  property: Vec<(String, String)>,

  /// More log output (-v info, -vv debug)
  #[arg(short, long, global = true, action = ArgAction::Count)]
  verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
  /// Merge intermediate jars into the release jar
  Assemble {
    /// Input jar (repeatable; default: build/libs/<base>-<version>-fat.jar)
    #[arg(long = "input", value_name = "JAR")]
    inputs: Vec<PathBuf>,
    /// Directory to write the release jar to (default: build/libs)
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Extra glob of entries to leave out (repeatable)
    #[arg(long = "exclude", value_name = "GLOB")]
    excludes: Vec<String>,
    /// Output the assembly report as JSON
    #[arg(long)]
    json: bool,
  },

  /// Run the release preconditions
  Check {
    /// Output check results as JSON
    #[arg(long)]
    json: bool,
  },

  /// Compose the release manifest for HEAD
  Manifest {
    /// Commit to reference instead of HEAD
    #[arg(long)]
    commit: Option<String>,
    /// Output the manifest as JSON
    #[arg(long)]
    json: bool,
  },

  /// Check, assemble and publish a release
  Release {
    /// Input jar (repeatable; default: build/libs/<base>-<version>-fat.jar)
    #[arg(long = "input", value_name = "JAR")]
    inputs: Vec<PathBuf>,
    /// Directory to write the release jar to (default: build/libs)
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Run every stage except the upload
    #[arg(long)]
    dry_run: bool,
  },
}

/// Get clap styling
fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn init_logging(verbose: u8) {
  let default_level = match verbose {
    0 => "warn",
    1 => "info",
    _ => "debug",
  };
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
    .format_timestamp(None)
    .init();
}

fn main() {
  let cli = Cli::parse();
  init_logging(cli.global.verbose);

  // Configuration is validated once, before any command runs
  let overrides = Overrides::from_env();
  let ctx = match ModuleContext::build(
    &cli.global.project_dir,
    cli.global.repo_root.as_deref(),
    &cli.global.property,
    overrides,
  ) {
    Ok(ctx) => ctx,
    Err(e) => handle_error(e),
  };

  let result = match cli.command {
    Commands::Assemble {
      inputs,
      output_dir,
      excludes,
      json,
    } => commands::run_assemble(
      &ctx,
      AssembleOptions {
        inputs,
        output_dir,
        excludes,
      },
      json,
    ),
    Commands::Check { json } => commands::run_check(&ctx, json),
    Commands::Manifest { commit, json } => commands::run_manifest(&ctx, commit, json),
    Commands::Release {
      inputs,
      output_dir,
      dry_run,
    } => {
      let publisher = ModrinthPublisher::from_env(ctx.overrides.upload_debug);
      commands::run_release(
        &ctx,
        AssembleOptions {
          inputs,
          output_dir,
          excludes: Vec::new(),
        },
        dry_run,
        &publisher,
      )
    }
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: ModError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
