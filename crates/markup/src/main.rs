//! Markup CLI.
//!
//! Provides commands for:
//! - `render`: Render a file or stdin to HTML
//! - `types`: List the available markup types
//! - `check`: Validate `markup.toml` and every field it declares

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CheckArgs, RenderArgs, TypesArgs};
use output::Output;

/// Markup - render raw text through pluggable markup renderers.
#[derive(Parser)]
#[command(name = "markup", version, about)]
struct Cli {
    /// Enable verbose output (registry and render logs).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a file (or stdin) and write the result to stdout.
    Render(RenderArgs),
    /// List available markup types in selection order.
    Types(TypesArgs),
    /// Validate the configuration file.
    Check(CheckArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level (DEBUG for our crates), otherwise use RUST_LOG
    let filter = if cli.verbose {
        EnvFilter::new("info,markup_registry=debug,markup_config=debug,markup_field=debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => args.execute(),
        Commands::Types(args) => args.execute(),
        Commands::Check(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
