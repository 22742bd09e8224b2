mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::prelude::*;

use commands::loans::{BookArgs, StandingArgs, StatementArgs};
use commands::terms::{PenaltyArgs, ScheduleArgs, TermsArgs};

/// Loan terms, late penalties and loan statements for peer-to-peer lending
#[derive(Parser)]
#[command(
    name = "mlend",
    version,
    about = "Loan terms, late penalties and loan statements for peer-to-peer lending",
    long_about = "A CLI for micro-lending calculations with decimal precision. Computes \
                  simple weekly interest, daily installments, late penalties after a \
                  grace period, loan statements and borrower standing."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Rate schedule file (YAML or JSON)
    #[arg(long, global = true)]
    rates: Option<String>,

    /// Named rate schedule: standard, reduced-weekly
    #[arg(long, global = true)]
    preset: Option<String>,

    /// Log debug detail to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Interest, total due and daily installment for a loan
    Terms(TermsArgs),
    /// Late penalty on an overdue amount
    Penalty(PenaltyArgs),
    /// Day-by-day installment plan
    Schedule(ScheduleArgs),
    /// Statement of what a loan owes on a given date
    Statement(StatementArgs),
    /// Classify a borrower from their loan history
    Standing(StandingArgs),
    /// Replay loan commands against an in-memory loan book
    Book(BookArgs),
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
    let filter = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Commands::Version = cli.command {
        println!("mlend {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> =
        input::rates::load_rates(cli.rates.as_deref(), cli.preset.as_deref()).and_then(|rates| {
            match cli.command {
                Commands::Terms(args) => commands::terms::run_terms(args, &rates),
                Commands::Penalty(args) => commands::terms::run_penalty(args, &rates),
                Commands::Schedule(args) => commands::terms::run_schedule(args, &rates),
                Commands::Statement(args) => commands::loans::run_statement(args, &rates),
                Commands::Standing(args) => commands::loans::run_standing(args),
                Commands::Book(args) => commands::loans::run_book(args, &rates),
                Commands::Version => Ok(serde_json::json!({ "version": env!("CARGO_PKG_VERSION") })),
            }
        });

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
