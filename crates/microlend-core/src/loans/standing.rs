use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::model::{Loan, LoanStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Standing {
    Good,
    /// At least one loan is past due.
    Watch,
    /// At least one loan has defaulted. Blacklisted borrowers cannot borrow.
    Blacklisted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorrowerStanding {
    pub borrower: String,
    pub standing: Standing,
    pub total_loans: usize,
    pub active_loans: usize,
    pub overdue_loans: usize,
    pub repaid_loans: usize,
    pub defaulted_loans: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandingInput {
    pub borrower: String,
    pub loans: Vec<Loan>,
}

/// Classify a borrower from the loans they hold. Loans of other borrowers
/// in `loans` are ignored.
pub fn borrower_standing(loans: &[Loan], borrower: &str) -> BorrowerStanding {
    let mine: Vec<&Loan> = loans.iter().filter(|l| l.borrower == borrower).collect();
    let count = |status: LoanStatus| mine.iter().filter(|l| l.status == status).count();

    let defaulted_loans = count(LoanStatus::Defaulted);
    let overdue_loans = count(LoanStatus::Overdue);

    let standing = if defaulted_loans > 0 {
        Standing::Blacklisted
    } else if overdue_loans > 0 {
        Standing::Watch
    } else {
        Standing::Good
    };

    let ratings: Vec<Decimal> = mine
        .iter()
        .filter_map(|l| l.rating.map(Decimal::from))
        .collect();
    let average_rating = if ratings.is_empty() {
        None
    } else {
        Some(ratings.iter().sum::<Decimal>() / Decimal::from(ratings.len()))
    };

    BorrowerStanding {
        borrower: borrower.to_string(),
        standing,
        total_loans: mine.len(),
        active_loans: count(LoanStatus::Active),
        overdue_loans,
        repaid_loans: count(LoanStatus::Repaid),
        defaulted_loans,
        average_rating,
    }
}
