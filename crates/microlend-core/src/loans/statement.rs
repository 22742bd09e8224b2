//! Point-in-time view of a loan: what is owed today and what state it is in.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::{PenaltyBasis, RateSchedule};
use crate::daycount;
use crate::error::LendingError;
use crate::terms::calculator::{chargeable_days, compute_penalty, compute_terms};
use crate::types::{with_metadata, ComputationOutput, Days, LoanId, Money, Rate};
use crate::LendingResult;

use super::model::{Loan, LoanStatus};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Loan figures re-derived as of a given date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanAssessment {
    pub days_overdue: Days,
    pub chargeable_days: Days,
    /// Cumulative penalty as of the date; never below what was already charged.
    pub penalty: Money,
    /// Total due plus penalty, less payments.
    pub outstanding: Money,
    pub status: LoanStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanStatement {
    pub loan_id: LoanId,
    pub borrower: String,
    pub as_of: NaiveDate,
    pub due_date: NaiveDate,
    pub principal: Money,
    pub interest: Money,
    pub total_due: Money,
    pub amount_paid: Money,
    pub days_overdue: Days,
    pub chargeable_days: Days,
    pub penalty: Money,
    pub current_due: Money,
    pub status: LoanStatus,
}

/// A loan record as supplied by an external caller, without derived fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanRecord {
    #[serde(default)]
    pub id: LoanId,
    #[serde(default)]
    pub borrower: String,
    pub principal: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenor_days: Option<Days>,
    /// Overrides the schedule's weekly rate for this loan.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly_rate: Option<Rate>,
    pub disbursed_on: NaiveDate,
    #[serde(default)]
    pub amount_paid: Money,
    #[serde(default)]
    pub penalty_charged: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub penalty_accrued_through: Option<NaiveDate>,
    #[serde(default)]
    pub status: LoanStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementInput {
    pub loan: LoanRecord,
    pub as_of: NaiveDate,
    #[serde(default)]
    pub rates: RateSchedule,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Re-derive days overdue, penalty, outstanding balance and status of `loan`
/// as of `as_of`. Terminal loans keep their status and charged penalty.
///
/// Penalties accrue day by day on the current basis amount: only chargeable
/// days after `penalty_accrued_through` are added to what was already charged.
/// A loan with no accrual date is priced over all chargeable days, with the
/// charged penalty as a floor.
pub fn assess(loan: &Loan, rates: &RateSchedule, as_of: NaiveDate) -> LendingResult<LoanAssessment> {
    let days_overdue = daycount::days_overdue(loan.due_date, as_of);
    let chargeable = chargeable_days(days_overdue, rates.grace_period_days);

    if loan.status.is_terminal() {
        return Ok(LoanAssessment {
            days_overdue,
            chargeable_days: chargeable,
            penalty: loan.penalty_charged,
            outstanding: loan.outstanding(),
            status: loan.status,
        });
    }

    let basis = match rates.penalty_basis {
        PenaltyBasis::Outstanding => loan.unpaid_total(),
        PenaltyBasis::TotalDue => loan.total_due,
    };
    let already_charged_days = loan.penalty_accrued_through.map_or(0, |through| {
        chargeable_days(
            daycount::days_overdue(loan.due_date, through),
            rates.grace_period_days,
        )
    });
    let accrued = compute_penalty(
        basis,
        chargeable.saturating_sub(already_charged_days),
        rates.daily_penalty_rate,
        0,
    )?;
    let penalty = match loan.penalty_accrued_through {
        Some(_) => loan
            .penalty_charged
            .checked_add(accrued)
            .ok_or_else(|| LendingError::overflow("penalty_charged"))?,
        None => accrued.max(loan.penalty_charged),
    };
    let outstanding = (loan.total_due + penalty - loan.amount_paid).max(Decimal::ZERO);

    let status = if outstanding.is_zero() {
        LoanStatus::Repaid
    } else if days_overdue > rates.default_after_days {
        LoanStatus::Defaulted
    } else if days_overdue > 0 {
        LoanStatus::Overdue
    } else {
        LoanStatus::Active
    };

    Ok(LoanAssessment {
        days_overdue,
        chargeable_days: chargeable,
        penalty,
        outstanding,
        status,
    })
}

/// Statement for a loan held in a repository.
pub fn build_statement(
    loan: &Loan,
    rates: &RateSchedule,
    as_of: NaiveDate,
) -> LendingResult<ComputationOutput<LoanStatement>> {
    let start = Instant::now();
    rates.validate()?;

    let assessment = assess(loan, rates, as_of)?;

    let mut warnings = Vec::new();
    if as_of < loan.disbursed_on {
        warnings.push(format!(
            "Statement date {as_of} precedes disbursement on {}.",
            loan.disbursed_on
        ));
    }
    if assessment.status == LoanStatus::Defaulted && !loan.status.is_terminal() {
        warnings.push(format!(
            "Loan is {} days overdue and will be written off on refresh.",
            assessment.days_overdue
        ));
    }

    let statement = LoanStatement {
        loan_id: loan.id,
        borrower: loan.borrower.clone(),
        as_of,
        due_date: loan.due_date,
        principal: loan.principal,
        interest: loan.interest,
        total_due: loan.total_due,
        amount_paid: loan.amount_paid,
        days_overdue: assessment.days_overdue,
        chargeable_days: assessment.chargeable_days,
        penalty: assessment.penalty,
        current_due: assessment.outstanding,
        status: assessment.status,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "daily_penalty_rate": rates.daily_penalty_rate,
        "grace_period_days": rates.grace_period_days,
        "default_after_days": rates.default_after_days,
        "penalty_basis": rates.penalty_basis,
    });
    Ok(with_metadata(
        "Loan statement with linear late penalty",
        &assumptions,
        warnings,
        elapsed,
        statement,
    ))
}

/// Statement for an externally supplied loan record.
pub fn statement_from_input(
    input: &StatementInput,
) -> LendingResult<ComputationOutput<LoanStatement>> {
    let record = &input.loan;
    let terms = compute_terms(
        record.principal,
        record.tenor_days.unwrap_or(input.rates.default_tenor_days),
        record.weekly_rate.unwrap_or(input.rates.weekly_interest_rate),
    )?;

    let mut loan = Loan::originate(
        record.id,
        record.borrower.clone(),
        None,
        &terms,
        record.disbursed_on,
    )?;
    loan.amount_paid = record.amount_paid;
    loan.penalty_charged = record.penalty_charged;
    loan.penalty_accrued_through = record.penalty_accrued_through;
    loan.status = record.status;

    build_statement(&loan, &input.rates, input.as_of)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
