use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::config::RateSchedule;
use crate::daycount;
use crate::error::LendingError;
use crate::types::{with_metadata, ComputationOutput, Days, Money};
use crate::LendingResult;

use super::calculator::{compute_terms, rate_warnings};

/// Installments are collected in whole cents.
const INSTALLMENT_DP: u32 = 2;

/// Longest plan the schedule will lay out day by day (ten years).
pub const MAX_SCHEDULE_DAYS: Days = 3_660;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleInput {
    pub principal: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenor_days: Option<Days>,
    pub disbursed_on: NaiveDate,
    #[serde(default)]
    pub rates: RateSchedule,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    pub day: Days,
    pub date: NaiveDate,
    pub installment: Money,
    pub cumulative_paid: Money,
    pub remaining: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutput {
    pub total: Money,
    pub interest: Money,
    pub due_date: NaiveDate,
    pub installments: Vec<Installment>,
}

/// Round a money amount to whole cents, half away from zero.
pub fn round_money(amount: Money) -> Money {
    amount.round_dp_with_strategy(INSTALLMENT_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Day-by-day repayment plan. Every installment is rounded to cents and never
/// more than what is left; the last one takes the rounding residual so the
/// plan sums exactly to the total due.
pub fn build_installment_schedule(
    input: &ScheduleInput,
) -> LendingResult<ComputationOutput<ScheduleOutput>> {
    let start = Instant::now();
    input.rates.validate()?;

    let tenor_days = input.tenor_days.unwrap_or(input.rates.default_tenor_days);
    if tenor_days > MAX_SCHEDULE_DAYS {
        return Err(LendingError::invalid(
            "tenor_days",
            format!("Schedules are limited to {MAX_SCHEDULE_DAYS} days"),
        ));
    }
    let terms = compute_terms(input.principal, tenor_days, input.rates.weekly_interest_rate)?;
    let due_date = daycount::due_date(input.disbursed_on, tenor_days)?;

    let regular = round_money(terms.daily_installment);
    let mut installments = Vec::with_capacity(tenor_days as usize);
    let mut cumulative = Decimal::ZERO;

    for day in 1..=tenor_days {
        let left = terms.total - cumulative;
        let installment = if day == tenor_days {
            left
        } else {
            regular.min(left)
        };
        cumulative += installment;
        installments.push(Installment {
            day,
            date: daycount::due_date(input.disbursed_on, day)?,
            installment,
            cumulative_paid: cumulative,
            remaining: terms.total - cumulative,
        });
    }

    let mut warnings = rate_warnings(&input.rates);
    if let Some(last) = installments.last() {
        if last.installment != regular {
            warnings.push(format!(
                "Final installment adjusted to {} to absorb rounding.",
                last.installment
            ));
        }
    }

    let output = ScheduleOutput {
        total: terms.total,
        interest: terms.interest,
        due_date,
        installments,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "weekly_interest_rate": input.rates.weekly_interest_rate,
        "tenor_days": tenor_days,
        "rounding": "cents, half away from zero",
    });
    Ok(with_metadata(
        "Equal daily installments",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}
