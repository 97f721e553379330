mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use loan_calc_core::rates::{LoanCategory, RateTable, UnknownCategoryPolicy};

use commands::quote::QuoteArgs;
use commands::schedule::ScheduleArgs;

/// Loan payment quotes and amortization schedules
#[derive(Parser)]
#[command(
    name = "loancalc",
    version,
    about = "Loan payment quotes and amortization schedules",
    long_about = "Quote fixed-rate consumer loans with decimal precision. Computes the \
                  monthly installment, total repayment, total interest, fees and the \
                  period-by-period amortization schedule for personal, housing and \
                  vehicle loans."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Rate table file (JSON, or YAML with a .yaml/.yml extension)
    #[arg(long, global = true)]
    rates: Option<String>,

    /// Quote unknown categories at this category's rate instead of failing
    #[arg(long, global = true)]
    fallback_category: Option<LoanCategory>,

    /// Log computation details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Quote a loan: installment, totals, fees and payment plan
    Quote(QuoteArgs),
    /// Amortization schedule for an explicit rate or category
    Schedule(ScheduleArgs),
    /// Print the effective rate table
    Rates,
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
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_rate_table(cli: &Cli) -> Result<RateTable, Box<dyn std::error::Error>> {
    let table = match cli.rates {
        Some(ref path) => input::file::read_rate_table(path)?,
        None => RateTable::default(),
    };

    match cli.fallback_category {
        Some(category) => Ok(table.with_policy(UnknownCategoryPolicy::Fallback { category })?),
        None => Ok(table),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let rates = match load_rate_table(&cli) {
        Ok(table) => table,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Quote(args) => commands::quote::run_quote(args, &rates),
        Commands::Schedule(args) => commands::schedule::run_schedule(args, &rates),
        Commands::Rates => commands::rates::run_rates(&rates),
        Commands::Version => {
            println!("loancalc {}", env!("CARGO_PKG_VERSION"));
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
