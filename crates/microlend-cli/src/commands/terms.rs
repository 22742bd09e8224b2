use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use microlend_core::terms::calculator::{self, LoanTermsInput, PenaltyInput};
use microlend_core::terms::schedule::{self, ScheduleInput};
use microlend_core::{daycount, RateSchedule};

use crate::input;

/// Arguments for loan terms calculation
#[derive(Args)]
pub struct TermsArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Repayment period in days (defaults to the schedule's tenor)
    #[arg(long, alias = "tenor")]
    pub tenor_days: Option<u32>,

    /// Days past the due date, to include the late penalty
    #[arg(long)]
    pub days_overdue: Option<u32>,
}

/// Arguments for late penalty assessment
#[derive(Args)]
pub struct PenaltyArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount the penalty is charged against
    #[arg(long)]
    pub amount_due: Option<Decimal>,

    /// Days past the due date
    #[arg(long)]
    pub days_overdue: Option<u32>,
}

/// Arguments for the daily installment plan
#[derive(Args)]
pub struct ScheduleArgs {
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
}

pub fn run_terms(args: TermsArgs, rates: &RateSchedule) -> Result<Value, Box<dyn std::error::Error>> {
    let terms_input: LoanTermsInput = match input::stdin::read_request(args.input.as_deref())? {
        Some(data) => serde_json::from_value(input::rates::apply_default_rates(data, rates)?)?,
        None => LoanTermsInput {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            tenor_days: args.tenor_days,
            days_overdue: args.days_overdue,
            rates: rates.clone(),
        },
    };
    let result = calculator::calculate_loan_terms(&terms_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_penalty(args: PenaltyArgs, rates: &RateSchedule) -> Result<Value, Box<dyn std::error::Error>> {
    let penalty_input: PenaltyInput = match input::stdin::read_request(args.input.as_deref())? {
        Some(data) => serde_json::from_value(input::rates::apply_default_rates(data, rates)?)?,
        None => PenaltyInput {
            amount_due: args
                .amount_due
                .ok_or("--amount-due is required (or provide --input)")?,
            days_overdue: args
                .days_overdue
                .ok_or("--days-overdue is required (or provide --input)")?,
            rates: rates.clone(),
        },
    };
    let result = calculator::assess_penalty(&penalty_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_schedule(args: ScheduleArgs, rates: &RateSchedule) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule_input: ScheduleInput = match input::stdin::read_request(args.input.as_deref())? {
        Some(data) => serde_json::from_value(input::rates::apply_default_rates(data, rates)?)?,
        None => ScheduleInput {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            tenor_days: args.tenor_days,
            disbursed_on: args
                .disbursed_on
                .ok_or("--disbursed-on is required (or provide --input)")?,
            rates: rates.clone(),
        },
    };
    let result = schedule::build_installment_schedule(&schedule_input)?;
    Ok(serde_json::to_value(result)?)
}
