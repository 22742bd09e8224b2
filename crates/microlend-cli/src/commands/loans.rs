use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tracing::info;

use microlend_core::loans::statement::{LoanRecord, StatementInput};
use microlend_core::loans::{
    borrower_standing, statement_from_input, InMemoryLoanRepository, LoanCommand, LoanRepository,
    LoanStatus, StandingInput,
};
use microlend_core::{daycount, RateSchedule};

use crate::input;

/// Arguments for a loan statement
#[derive(Args)]
pub struct StatementArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Repayment period in days (defaults to the schedule's tenor)
    #[arg(long, alias = "tenor")]
    pub tenor_days: Option<u32>,

    /// Disbursement date (YYYY-MM-DD)
    #[arg(long, value_parser = daycount::parse_date)]
    pub disbursed_on: Option<NaiveDate>,

    /// Amount repaid so far
    #[arg(long, default_value = "0")]
    pub amount_paid: Decimal,

    /// Statement date (YYYY-MM-DD)
    #[arg(long, value_parser = daycount::parse_date)]
    pub as_of: Option<NaiveDate>,
}

/// Arguments for borrower standing
#[derive(Args)]
pub struct StandingArgs {
    /// Path to JSON input file with `borrower` and `loans`
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for replaying loan commands against an in-memory book
#[derive(Args)]
pub struct BookArgs {
    /// Path to JSON file holding an array of loan commands
    #[arg(long)]
    pub input: Option<String>,

    /// Refresh all open loans to this date after replaying (YYYY-MM-DD)
    #[arg(long, value_parser = daycount::parse_date)]
    pub as_of: Option<NaiveDate>,
}

pub fn run_statement(args: StatementArgs, rates: &RateSchedule) -> Result<Value, Box<dyn std::error::Error>> {
    let statement_input: StatementInput = match input::stdin::read_request(args.input.as_deref())? {
        Some(data) => serde_json::from_value(input::rates::apply_default_rates(data, rates)?)?,
        None => StatementInput {
            loan: LoanRecord {
                id: 0,
                borrower: String::new(),
                principal: args
                    .principal
                    .ok_or("--principal is required (or provide --input)")?,
                tenor_days: args.tenor_days,
                weekly_rate: None,
                disbursed_on: args
                    .disbursed_on
                    .ok_or("--disbursed-on is required (or provide --input)")?,
                amount_paid: args.amount_paid,
                penalty_charged: Decimal::ZERO,
                penalty_accrued_through: None,
                status: LoanStatus::Active,
            },
            as_of: args.as_of.ok_or("--as-of is required (or provide --input)")?,
            rates: rates.clone(),
        },
    };
    let result = statement_from_input(&statement_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_standing(args: StandingArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let standing_input: StandingInput = match input::stdin::read_request(args.input.as_deref())? {
        Some(data) => serde_json::from_value(data)?,
        None => return Err("--input <file.json> or stdin required for borrower standing".into()),
    };
    let standing = borrower_standing(&standing_input.loans, &standing_input.borrower);
    Ok(json!({ "result": standing }))
}

pub fn run_book(args: BookArgs, rates: &RateSchedule) -> Result<Value, Box<dyn std::error::Error>> {
    let commands: Vec<LoanCommand> = match input::stdin::read_request(args.input.as_deref())? {
        Some(data) => serde_json::from_value(data)?,
        None => return Err("--input <commands.json> or stdin required for book replay".into()),
    };

    let mut repo = InMemoryLoanRepository::new(rates.clone())?;
    let count = commands.len();
    for (i, command) in commands.into_iter().enumerate() {
        repo.apply(command)
            .map_err(|e| format!("command {} of {}: {}", i + 1, count, e))?;
    }
    if let Some(as_of) = args.as_of {
        repo.refresh_all(as_of)?;
    }
    info!(commands = count, loans = repo.list().len(), "book replayed");

    let loans = repo.list();
    let mut borrowers: Vec<&str> = loans.iter().map(|l| l.borrower.as_str()).collect();
    borrowers.sort_unstable();
    borrowers.dedup();
    let summaries: Vec<_> = borrowers
        .iter()
        .map(|b| repo.ledger().summary_for_borrower(b))
        .collect();

    Ok(json!({
        "result": {
            "loans": loans,
            "borrowers": summaries,
        },
        "ledger": repo.ledger().entries(),
    }))
}
