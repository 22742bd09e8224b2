//! Loan terms and late-penalty calculator.
//!
//! Interest is simple (non-compounding): a flat weekly rate scaled linearly by
//! `tenor_days / 7`. Penalties accrue linearly on the amount supplied, once per
//! day strictly beyond the grace period. Both functions are pure and validate
//! their inputs up front, so a zero tenor is rejected before any division.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::{RateSchedule, DAYS_PER_WEEK};
use crate::error::LendingError;
use crate::types::{with_metadata, ComputationOutput, Days, Money, Rate};
use crate::LendingResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Weekly rates outside this band have not been seen in production books.
const OBSERVED_WEEKLY_RATE_LOW: Rate = dec!(0.10);
const OBSERVED_WEEKLY_RATE_HIGH: Rate = dec!(0.15);

// ---------------------------------------------------------------------------
// Core arithmetic
// ---------------------------------------------------------------------------

/// Derived figures for one principal / tenor / rate combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    pub tenor_days: Days,
    pub weekly_rate: Rate,
    pub interest: Money,
    pub total: Money,
    pub daily_installment: Money,
}

/// Interest, total payable and per-day installment for a loan.
pub fn compute_terms(
    principal: Money,
    tenor_days: Days,
    weekly_rate: Rate,
) -> LendingResult<LoanTerms> {
    if principal <= Decimal::ZERO {
        return Err(LendingError::invalid(
            "principal",
            "Principal must be positive",
        ));
    }
    if tenor_days == 0 {
        return Err(LendingError::invalid(
            "tenor_days",
            "Tenor must be at least one day",
        ));
    }
    if weekly_rate < Decimal::ZERO {
        return Err(LendingError::invalid(
            "weekly_rate",
            "Weekly interest rate cannot be negative",
        ));
    }

    let tenor = Decimal::from(tenor_days);
    let interest = principal
        .checked_mul(weekly_rate)
        .and_then(|v| v.checked_mul(tenor))
        .and_then(|v| v.checked_div(Decimal::from(DAYS_PER_WEEK)))
        .ok_or_else(|| LendingError::overflow("principal"))?;
    let total = principal
        .checked_add(interest)
        .ok_or_else(|| LendingError::overflow("principal"))?;
    let daily_installment = total
        .checked_div(tenor)
        .ok_or_else(|| LendingError::overflow("principal"))?;

    Ok(LoanTerms {
        principal,
        tenor_days,
        weekly_rate,
        interest,
        total,
        daily_installment,
    })
}

/// Days that attract a penalty: those strictly beyond the grace period.
pub fn chargeable_days(days_overdue: Days, grace_days: Days) -> Days {
    days_overdue.saturating_sub(grace_days)
}

/// Late penalty on `amount_due` after `days_overdue` days.
pub fn compute_penalty(
    amount_due: Money,
    days_overdue: Days,
    daily_penalty_rate: Rate,
    grace_days: Days,
) -> LendingResult<Money> {
    if amount_due < Decimal::ZERO {
        return Err(LendingError::invalid(
            "amount_due",
            "Amount due cannot be negative",
        ));
    }
    if daily_penalty_rate < Decimal::ZERO {
        return Err(LendingError::invalid(
            "daily_penalty_rate",
            "Daily penalty rate cannot be negative",
        ));
    }

    let days = chargeable_days(days_overdue, grace_days);
    if days == 0 {
        return Ok(Decimal::ZERO);
    }
    amount_due
        .checked_mul(daily_penalty_rate)
        .and_then(|v| v.checked_mul(Decimal::from(days)))
        .ok_or_else(|| LendingError::overflow("amount_due"))
}

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanTermsInput {
    pub principal: Money,
    /// Defaults to the schedule's tenor when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenor_days: Option<Days>,
    /// When present, the penalty on the total due is reported as well.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_overdue: Option<Days>,
    #[serde(default)]
    pub rates: RateSchedule,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanTermsOutput {
    pub principal: Money,
    pub tenor_days: Days,
    pub interest: Money,
    pub total: Money,
    pub daily_installment: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub penalty_amount: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_due_with_penalty: Option<Money>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PenaltyInput {
    pub amount_due: Money,
    pub days_overdue: Days,
    #[serde(default)]
    pub rates: RateSchedule,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PenaltyOutput {
    pub penalty_amount: Money,
    pub chargeable_days: Days,
    pub within_grace: bool,
    pub amount_with_penalty: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute loan terms (and optionally the current penalty) under a rate schedule.
pub fn calculate_loan_terms(
    input: &LoanTermsInput,
) -> LendingResult<ComputationOutput<LoanTermsOutput>> {
    let start = Instant::now();
    input.rates.validate()?;

    let tenor_days = input.tenor_days.unwrap_or(input.rates.default_tenor_days);
    let terms = compute_terms(input.principal, tenor_days, input.rates.weekly_interest_rate)?;

    let mut warnings = rate_warnings(&input.rates);
    if tenor_days % DAYS_PER_WEEK != 0 {
        warnings.push(format!(
            "Tenor of {tenor_days} days is not a whole number of weeks; interest is pro-rated."
        ));
    }

    let penalty_amount = match input.days_overdue {
        Some(days) => Some(compute_penalty(
            terms.total,
            days,
            input.rates.daily_penalty_rate,
            input.rates.grace_period_days,
        )?),
        None => None,
    };

    let amount_due_with_penalty = match penalty_amount {
        Some(p) => Some(
            terms
                .total
                .checked_add(p)
                .ok_or_else(|| LendingError::overflow("principal"))?,
        ),
        None => None,
    };

    let output = LoanTermsOutput {
        principal: terms.principal,
        tenor_days,
        interest: terms.interest,
        total: terms.total,
        daily_installment: terms.daily_installment,
        penalty_amount,
        amount_due_with_penalty,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Simple weekly interest pro-rated by tenor",
        &input.rates,
        warnings,
        elapsed,
        output,
    ))
}

/// Assess the late penalty on an amount that is `days_overdue` days late.
pub fn assess_penalty(input: &PenaltyInput) -> LendingResult<ComputationOutput<PenaltyOutput>> {
    let start = Instant::now();
    input.rates.validate()?;

    let penalty_amount = compute_penalty(
        input.amount_due,
        input.days_overdue,
        input.rates.daily_penalty_rate,
        input.rates.grace_period_days,
    )?;
    let days = chargeable_days(input.days_overdue, input.rates.grace_period_days);

    let mut warnings = Vec::new();
    if input.days_overdue > input.rates.default_after_days {
        warnings.push(format!(
            "{} days overdue exceeds the {}-day default threshold.",
            input.days_overdue, input.rates.default_after_days
        ));
    }

    let amount_with_penalty = input
        .amount_due
        .checked_add(penalty_amount)
        .ok_or_else(|| LendingError::overflow("amount_due"))?;

    let output = PenaltyOutput {
        penalty_amount,
        chargeable_days: days,
        within_grace: days == 0,
        amount_with_penalty,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "daily_penalty_rate": input.rates.daily_penalty_rate,
        "grace_period_days": input.rates.grace_period_days,
    });
    Ok(with_metadata(
        "Linear daily penalty beyond grace period",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

pub(crate) fn rate_warnings(rates: &RateSchedule) -> Vec<String> {
    let rate = rates.weekly_interest_rate;
    if rate < OBSERVED_WEEKLY_RATE_LOW || rate > OBSERVED_WEEKLY_RATE_HIGH {
        vec![format!(
            "Weekly interest rate {rate} is outside the usual 10%-15% band."
        )]
    } else {
        Vec::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
