mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::compare::CompareArgs;
use commands::property::{LabelsArgs, PropertyArgs};
use commands::returns::IrrArgs;

/// Rental property hold-period projections
#[derive(Parser)]
#[command(
    name = "deal-eval",
    version,
    about = "Rental property hold-period projections",
    long_about = "A CLI for projecting levered rental property investments with decimal \
                  precision. Builds the year-by-year schedule, ROI, cap rate, cash-on-cash, \
                  IRR and equity multiple, and compares two properties under shared financing."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Emit debug logs on stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Project a single property over its hold period
    Evaluate(PropertyArgs),
    /// Compare two properties under the same financing terms
    Compare(CompareArgs),
    /// Print a single property's metrics keyed by display label
    Labels(LabelsArgs),
    /// IRR (and optional NPV) of an arbitrary cash-flow series
    Irr(IrrArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = if verbose {
        EnvFilter::new(default_level)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Evaluate(args) => commands::property::run_evaluate(args),
        Commands::Compare(args) => commands::compare::run_compare(args),
        Commands::Labels(args) => commands::property::run_labels(args),
        Commands::Irr(args) => commands::returns::run_irr(args),
        Commands::Version => {
            println!("deal-eval {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
