//! optreg CLI: generates option registries from a serialized compilation.
//!
//! Provides `optreg generate` to render and write registry sources,
//! `optreg check` to run the generator and report diagnostics without
//! writing, and `optreg inspect` to dump the extracted collection models.

#![warn(missing_docs)]

mod check;
mod generate;
mod inspect;
mod logging;
mod pipeline;

use std::io::IsTerminal;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// optreg: compile-time option registries.
#[derive(Parser, Debug)]
#[command(name = "optreg", version, about = "Option registry generator")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a custom `optreg.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate registry sources and write the changed ones.
    Generate(GenerateArgs),
    /// Run the generator and report diagnostics without writing.
    Check(CheckArgs),
    /// Print the extracted collection models as JSON.
    Inspect(InspectArgs),
}

/// Arguments for the `optreg generate` subcommand.
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Target platform moniker, e.g. `net8.0`.
    #[arg(short, long)]
    pub target: Option<String>,

    /// Output directory (default: `output.dir` from `optreg.toml`).
    #[arg(short, long)]
    pub out: Option<String>,

    /// Output format for diagnostics.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for the `optreg check` subcommand.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Target platform moniker, e.g. `net8.0`.
    #[arg(short, long)]
    pub target: Option<String>,

    /// Output format for diagnostics.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for the `optreg inspect` subcommand.
#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Target platform moniker, e.g. `net8.0`.
    #[arg(short, long)]
    pub target: Option<String>,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Diagnostic output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => std::io::stderr().is_terminal(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
    };
    logging::init_logging(&global);

    let result = match cli.command {
        Command::Generate(ref args) => generate::run(args, &global),
        Command::Check(ref args) => check::run(args, &global),
        Command::Inspect(ref args) => inspect::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
