use chrono::{Days as ChronoDays, NaiveDate};

use crate::error::LendingError;
use crate::types::Days;
use crate::LendingResult;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Due date of a loan disbursed on `disbursed_on` with a tenor of `tenor_days`.
pub fn due_date(disbursed_on: NaiveDate, tenor_days: Days) -> LendingResult<NaiveDate> {
    disbursed_on
        .checked_add_days(ChronoDays::new(u64::from(tenor_days)))
        .ok_or_else(|| {
            LendingError::DateError(format!(
                "{disbursed_on} + {tenor_days} days is out of range"
            ))
        })
}

/// Whole days elapsed past the due date, zero on or before it.
pub fn days_overdue(due_date: NaiveDate, as_of: NaiveDate) -> Days {
    let days = (as_of - due_date).num_days();
    if days <= 0 {
        0
    } else {
        Days::try_from(days).unwrap_or(Days::MAX)
    }
}

/// Parse an ISO `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> LendingResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|e| LendingError::DateError(format!("'{value}': {e}")))
}
