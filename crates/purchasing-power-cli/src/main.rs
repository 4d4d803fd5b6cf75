mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use purchasing_power_core::RateTables;

use commands::analyze::AnalyzeArgs;
use commands::batch::BatchArgs;
use commands::compare::CompareArgs;
use commands::mortgage::MortgageArgs;
use commands::rates::RatesArgs;
use commands::tax::TaxArgs;

/// Persona-adjusted cost of living and true purchasing power
#[derive(Parser)]
#[command(
    name = "tpp",
    version,
    about = "Persona-adjusted true purchasing power for US cities",
    long_about = "Estimates what an income is really worth in a city once income tax, \
                  property tax and a persona-specific cost-of-living index are applied. \
                  Supports single-city analysis, batch ranking, city-to-city comparison, \
                  and the tax and mortgage building blocks on their own."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Rate tables file (JSON or YAML) replacing the built-in tables
    #[arg(long, global = true)]
    rates: Option<String>,

    /// Log pipeline stages to stderr (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Purchasing power for one city and persona
    Analyze(AnalyzeArgs),
    /// Rank a list of cities by purchasing power index
    Batch(BatchArgs),
    /// Compare two cities and solve for the equivalent income
    Compare(CompareArgs),
    /// Federal and state income tax for a gross income
    Tax(TaxArgs),
    /// Amortized mortgage payment and totals
    Mortgage(MortgageArgs),
    /// Print or validate rate tables
    Rates(RatesArgs),
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
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_rates(path: Option<&str>) -> Result<RateTables, Box<dyn std::error::Error>> {
    match path {
        Some(p) => input::file::read_rate_tables(p),
        None => Ok(RateTables::default()),
    }
}

fn run(
    command: Commands,
    rates_path: Option<&str>,
) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let rates = load_rates(rates_path)?;
    match command {
        Commands::Analyze(args) => commands::analyze::run_analyze(args, &rates),
        Commands::Batch(args) => commands::batch::run_batch(args, &rates),
        Commands::Compare(args) => commands::compare::run_compare(args, &rates),
        Commands::Tax(args) => commands::tax::run_tax(args, &rates),
        Commands::Mortgage(args) => commands::mortgage::run_mortgage(args, &rates),
        Commands::Rates(args) => commands::rates::run_rates(args, &rates),
        Commands::Version => Err("version is handled before dispatch".into()),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Commands::Version = cli.command {
        println!("tpp {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    match run(cli.command, cli.rates.as_deref()) {
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
