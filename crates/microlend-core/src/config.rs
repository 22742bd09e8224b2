//! Rate schedules: the constants every loan calculation is parameterised by.
//!
//! Two presets reflect the rates seen in the field. `standard()` (15% weekly,
//! 5% daily penalty after a 7-day grace period) is the default; the reduced
//! 10% weekly schedule is kept as a named alternative rather than silently
//! merged. Any other schedule can be deserialised from JSON or YAML.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LendingError;
use crate::types::{Days, Rate};
use crate::LendingResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Interest is quoted per 7-day period.
pub const DAYS_PER_WEEK: Days = 7;

pub const STANDARD_WEEKLY_RATE: Rate = dec!(0.15);
pub const REDUCED_WEEKLY_RATE: Rate = dec!(0.10);
pub const STANDARD_DAILY_PENALTY_RATE: Rate = dec!(0.05);
pub const STANDARD_GRACE_PERIOD_DAYS: Days = 7;
pub const STANDARD_TENOR_DAYS: Days = 7;
pub const STANDARD_DEFAULT_AFTER_DAYS: Days = 30;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Which amount the daily late penalty is charged against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyBasis {
    /// The unpaid part of the total due.
    #[default]
    Outstanding,
    /// The full total due, regardless of partial repayments.
    TotalDue,
}

/// Rate constants applied to a loan book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateSchedule {
    /// Flat interest per 7-day period, pro-rated linearly for other tenors.
    pub weekly_interest_rate: Rate,
    /// Penalty per day overdue beyond the grace period.
    pub daily_penalty_rate: Rate,
    /// Days after the due date before any penalty accrues.
    pub grace_period_days: Days,
    /// Tenor used when a request does not name one.
    pub default_tenor_days: Days,
    /// Days overdue after which a loan is treated as defaulted.
    pub default_after_days: Days,
    pub penalty_basis: PenaltyBasis,
}

impl Default for RateSchedule {
    fn default() -> Self {
        Self::standard()
    }
}

impl RateSchedule {
    /// 15% weekly, 5% daily penalty after 7 days of grace.
    pub fn standard() -> Self {
        Self {
            weekly_interest_rate: STANDARD_WEEKLY_RATE,
            daily_penalty_rate: STANDARD_DAILY_PENALTY_RATE,
            grace_period_days: STANDARD_GRACE_PERIOD_DAYS,
            default_tenor_days: STANDARD_TENOR_DAYS,
            default_after_days: STANDARD_DEFAULT_AFTER_DAYS,
            penalty_basis: PenaltyBasis::Outstanding,
        }
    }

    /// Same as `standard()` but with a 10% weekly rate.
    pub fn reduced_weekly() -> Self {
        Self {
            weekly_interest_rate: REDUCED_WEEKLY_RATE,
            ..Self::standard()
        }
    }

    /// Look up a preset by name (`standard`, `reduced-weekly`).
    pub fn preset(name: &str) -> LendingResult<Self> {
        match name.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "standard" => Ok(Self::standard()),
            "reduced-weekly" | "reduced" => Ok(Self::reduced_weekly()),
            other => Err(LendingError::invalid(
                "preset",
                format!("unknown rate schedule '{other}'"),
            )),
        }
    }

    pub fn validate(&self) -> LendingResult<()> {
        if self.weekly_interest_rate < Decimal::ZERO {
            return Err(LendingError::invalid(
                "weekly_interest_rate",
                "Weekly interest rate cannot be negative",
            ));
        }
        if self.daily_penalty_rate < Decimal::ZERO || self.daily_penalty_rate > Decimal::ONE {
            return Err(LendingError::invalid(
                "daily_penalty_rate",
                "Daily penalty rate must be between 0 and 1",
            ));
        }
        if self.default_tenor_days == 0 {
            return Err(LendingError::invalid(
                "default_tenor_days",
                "Default tenor must be at least one day",
            ));
        }
        if self.default_after_days <= self.grace_period_days {
            return Err(LendingError::invalid(
                "default_after_days",
                "Default threshold must be later than the grace period",
            ));
        }
        Ok(())
    }
}
