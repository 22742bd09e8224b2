use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::daycount;
use crate::terms::calculator::LoanTerms;
use crate::types::{Days, LoanId, Money, Rate};
use crate::LendingResult;

/// Lifecycle of a loan. `Repaid` and `Defaulted` are terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    #[default]
    Active,
    Overdue,
    Repaid,
    Defaulted,
}

impl LoanStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, LoanStatus::Repaid | LoanStatus::Defaulted)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LoanStatus::Active => "active",
            LoanStatus::Overdue => "overdue",
            LoanStatus::Repaid => "repaid",
            LoanStatus::Defaulted => "defaulted",
        }
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A loan as held by a repository. Repositories only ever hand out clones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub borrower: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lender: Option<String>,
    pub principal: Money,
    pub tenor_days: Days,
    pub weekly_rate: Rate,
    pub interest: Money,
    /// Principal plus interest, excluding penalties.
    pub total_due: Money,
    pub disbursed_on: NaiveDate,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub amount_paid: Money,
    /// Cumulative penalty charged so far.
    #[serde(default)]
    pub penalty_charged: Money,
    /// Last date penalties were charged up to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub penalty_accrued_through: Option<NaiveDate>,
    #[serde(default)]
    pub status: LoanStatus,
    /// Lender's 1-5 star rating of the borrower, given after repayment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_on: Option<NaiveDate>,
}

impl Loan {
    /// A freshly disbursed, active loan.
    pub fn originate(
        id: LoanId,
        borrower: impl Into<String>,
        lender: Option<String>,
        terms: &LoanTerms,
        disbursed_on: NaiveDate,
    ) -> LendingResult<Self> {
        Ok(Self {
            id,
            borrower: borrower.into(),
            lender,
            principal: terms.principal,
            tenor_days: terms.tenor_days,
            weekly_rate: terms.weekly_rate,
            interest: terms.interest,
            total_due: terms.total,
            disbursed_on,
            due_date: daycount::due_date(disbursed_on, terms.tenor_days)?,
            amount_paid: Decimal::ZERO,
            penalty_charged: Decimal::ZERO,
            penalty_accrued_through: None,
            status: LoanStatus::Active,
            rating: None,
            closed_on: None,
        })
    }

    /// Unpaid part of the total due, ignoring penalties.
    pub fn unpaid_total(&self) -> Money {
        (self.total_due - self.amount_paid).max(Decimal::ZERO)
    }

    /// Everything still owed, penalties included.
    pub fn outstanding(&self) -> Money {
        (self.total_due + self.penalty_charged - self.amount_paid).max(Decimal::ZERO)
    }
}
