//! Loan repository: the only place loan state changes.
//!
//! Readers get owned snapshots; writers submit a `LoanCommand`. Every money
//! movement a command causes is appended to the repository's ledger.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::config::RateSchedule;
use crate::error::LendingError;
use crate::ledger::{Ledger, LedgerEntryKind};
use crate::terms::calculator::compute_terms;
use crate::types::{Days, LoanId, Money};
use crate::LendingResult;

use super::model::{Loan, LoanStatus};
use super::standing::{borrower_standing, Standing};
use super::statement::assess;

const MIN_RATING: u8 = 1;
const MAX_RATING: u8 = 5;

/// Ledger postings a command makes, held back until the command succeeds.
type Postings = Vec<(NaiveDate, LedgerEntryKind, Money)>;

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum LoanCommand {
    /// Disburse a new loan at the repository's rates.
    Originate {
        borrower: String,
        #[serde(default)]
        lender: Option<String>,
        principal: Money,
        #[serde(default)]
        tenor_days: Option<Days>,
        disbursed_on: NaiveDate,
    },
    RecordRepayment {
        id: LoanId,
        amount: Money,
        paid_on: NaiveDate,
    },
    /// Bring status and penalties up to date.
    Refresh { id: LoanId, as_of: NaiveDate },
    WriteOff { id: LoanId, on: NaiveDate },
    /// Lender rates the borrower after repayment.
    Rate { id: LoanId, stars: u8 },
}

impl LoanCommand {
    fn action(&self) -> &'static str {
        match self {
            LoanCommand::Originate { .. } => "originate",
            LoanCommand::RecordRepayment { .. } => "record a repayment",
            LoanCommand::Refresh { .. } => "refresh",
            LoanCommand::WriteOff { .. } => "write off",
            LoanCommand::Rate { .. } => "rate",
        }
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

pub trait LoanRepository {
    fn rates(&self) -> &RateSchedule;

    fn get(&self, id: LoanId) -> Option<Loan>;

    fn list(&self) -> Vec<Loan>;

    fn ledger(&self) -> &Ledger;

    fn apply(&mut self, command: LoanCommand) -> LendingResult<Loan>;

    fn loans_for_borrower(&self, borrower: &str) -> Vec<Loan> {
        self.list()
            .into_iter()
            .filter(|l| l.borrower == borrower)
            .collect()
    }

    /// Refresh every open loan; terminal loans are left untouched.
    fn refresh_all(&mut self, as_of: NaiveDate) -> LendingResult<Vec<Loan>> {
        let open: Vec<LoanId> = self
            .list()
            .into_iter()
            .filter(|l| !l.status.is_terminal())
            .map(|l| l.id)
            .collect();
        open.into_iter()
            .map(|id| self.apply(LoanCommand::Refresh { id, as_of }))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// In-memory implementation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct InMemoryLoanRepository {
    rates: RateSchedule,
    loans: BTreeMap<LoanId, Loan>,
    ledger: Ledger,
    next_id: LoanId,
}

impl InMemoryLoanRepository {
    pub fn new(rates: RateSchedule) -> LendingResult<Self> {
        rates.validate()?;
        Ok(Self {
            rates,
            loans: BTreeMap::new(),
            ledger: Ledger::new(),
            next_id: 1,
        })
    }

    fn open_loan(&self, id: LoanId, command: &LoanCommand) -> LendingResult<Loan> {
        let loan = self.loans.get(&id).ok_or(LendingError::LoanNotFound(id))?;
        if loan.status.is_terminal() {
            return Err(LendingError::InvalidTransition {
                id,
                from: loan.status.to_string(),
                action: command.action().into(),
            });
        }
        Ok(loan.clone())
    }

    fn originate(
        &mut self,
        borrower: String,
        lender: Option<String>,
        principal: Money,
        tenor_days: Option<Days>,
        disbursed_on: NaiveDate,
    ) -> LendingResult<Loan> {
        if borrower.trim().is_empty() {
            return Err(LendingError::invalid("borrower", "Borrower is required"));
        }
        let loans: Vec<Loan> = self.loans.values().cloned().collect();
        if borrower_standing(&loans, &borrower).standing == Standing::Blacklisted {
            warn!(%borrower, "origination refused for blacklisted borrower");
            return Err(LendingError::invalid(
                "borrower",
                format!("'{borrower}' has a defaulted loan and is blacklisted"),
            ));
        }

        let tenor = tenor_days.unwrap_or(self.rates.default_tenor_days);
        let terms = compute_terms(principal, tenor, self.rates.weekly_interest_rate)?;
        let id = self.next_id.max(1);
        let loan = Loan::originate(id, borrower, lender, &terms, disbursed_on)?;

        self.ledger.append(
            id,
            &loan.borrower,
            disbursed_on,
            LedgerEntryKind::Disbursement,
            loan.principal,
        )?;
        self.ledger.append(
            id,
            &loan.borrower,
            disbursed_on,
            LedgerEntryKind::Interest,
            loan.interest,
        )?;

        info!(
            loan_id = id,
            borrower = %loan.borrower,
            principal = %loan.principal,
            total_due = %loan.total_due,
            due_date = %loan.due_date,
            "loan originated"
        );
        self.next_id = id + 1;
        self.loans.insert(id, loan.clone());
        Ok(loan)
    }

    /// Accrue penalties and move status forward as of `as_of` on a working
    /// copy. Ledger postings are staged in `postings`; nothing is stored.
    fn accrue(&self, mut loan: Loan, as_of: NaiveDate, postings: &mut Postings) -> LendingResult<Loan> {
        let assessment = assess(&loan, &self.rates, as_of)?;

        let new_penalty = assessment.penalty - loan.penalty_charged;
        if new_penalty > Decimal::ZERO {
            postings.push((as_of, LedgerEntryKind::Penalty, new_penalty));
            loan.penalty_charged = assessment.penalty;
            debug!(loan_id = loan.id, penalty = %new_penalty, "penalty accrued");
        }
        if assessment.chargeable_days > 0 {
            let through = loan.penalty_accrued_through.map_or(as_of, |t| t.max(as_of));
            loan.penalty_accrued_through = Some(through);
        }

        if assessment.status != loan.status {
            if assessment.status == LoanStatus::Defaulted {
                Self::write_off_remainder(&mut loan, as_of, postings);
            }
            loan.status = assessment.status;
        }
        Ok(loan)
    }

    fn write_off_remainder(loan: &mut Loan, on: NaiveDate, postings: &mut Postings) {
        postings.push((on, LedgerEntryKind::WriteOff, loan.outstanding()));
        loan.status = LoanStatus::Defaulted;
        loan.closed_on = Some(on);
    }

    /// Store `loan` and append its staged postings to the ledger.
    fn commit(&mut self, loan: Loan, postings: Postings) -> LendingResult<Loan> {
        for (date, kind, amount) in postings {
            self.ledger.append(loan.id, &loan.borrower, date, kind, amount)?;
        }

        let before = self.loans.get(&loan.id).map(|l| l.status);
        if before != Some(loan.status) {
            info!(
                loan_id = loan.id,
                from = %before.unwrap_or_default(),
                to = %loan.status,
                "loan status changed"
            );
            if loan.status == LoanStatus::Defaulted {
                warn!(
                    loan_id = loan.id,
                    borrower = %loan.borrower,
                    written_off = %self.ledger.total_for_loan(loan.id, LedgerEntryKind::WriteOff),
                    "loan defaulted"
                );
            }
        }

        self.loans.insert(loan.id, loan.clone());
        Ok(loan)
    }

    fn record_repayment(
        &mut self,
        loan: Loan,
        amount: Money,
        paid_on: NaiveDate,
    ) -> LendingResult<Loan> {
        if amount <= Decimal::ZERO {
            return Err(LendingError::invalid(
                "amount",
                "Repayment must be positive",
            ));
        }

        let mut postings = Postings::new();
        let mut loan = self.accrue(loan, paid_on, &mut postings)?;
        if loan.status.is_terminal() {
            return Err(LendingError::InvalidTransition {
                id: loan.id,
                from: loan.status.to_string(),
                action: "record a repayment".into(),
            });
        }

        let outstanding = loan.outstanding();
        if amount > outstanding {
            return Err(LendingError::invalid(
                "amount",
                format!("Repayment of {amount} exceeds outstanding {outstanding}"),
            ));
        }

        postings.push((paid_on, LedgerEntryKind::Repayment, amount));
        loan.amount_paid += amount;
        debug!(loan_id = loan.id, amount = %amount, remaining = %loan.outstanding(), "repayment recorded");

        if loan.outstanding().is_zero() {
            loan.status = LoanStatus::Repaid;
            loan.closed_on = Some(paid_on);
        }

        self.commit(loan, postings)
    }

    fn rate(&mut self, id: LoanId, stars: u8) -> LendingResult<Loan> {
        if !(MIN_RATING..=MAX_RATING).contains(&stars) {
            return Err(LendingError::invalid(
                "stars",
                format!("Rating must be between {MIN_RATING} and {MAX_RATING}"),
            ));
        }
        let loan = self.loans.get_mut(&id).ok_or(LendingError::LoanNotFound(id))?;
        if loan.status != LoanStatus::Repaid {
            return Err(LendingError::InvalidTransition {
                id,
                from: loan.status.to_string(),
                action: "rate".into(),
            });
        }
        if let Some(given) = loan.rating {
            return Err(LendingError::invalid(
                "stars",
                format!("Loan {id} was already rated {given}"),
            ));
        }
        loan.rating = Some(stars);
        Ok(loan.clone())
    }
}

impl LoanRepository for InMemoryLoanRepository {
    fn rates(&self) -> &RateSchedule {
        &self.rates
    }

    fn get(&self, id: LoanId) -> Option<Loan> {
        self.loans.get(&id).cloned()
    }

    fn list(&self) -> Vec<Loan> {
        self.loans.values().cloned().collect()
    }

    fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    fn apply(&mut self, command: LoanCommand) -> LendingResult<Loan> {
        debug!(action = command.action(), "applying loan command");
        match command {
            LoanCommand::Originate {
                borrower,
                lender,
                principal,
                tenor_days,
                disbursed_on,
            } => self.originate(borrower, lender, principal, tenor_days, disbursed_on),
            LoanCommand::RecordRepayment { id, amount, paid_on } => {
                let loan = self.open_loan(id, &command)?;
                self.record_repayment(loan, amount, paid_on)
            }
            LoanCommand::Refresh { id, as_of } => {
                let loan = self.open_loan(id, &command)?;
                let mut postings = Postings::new();
                let loan = self.accrue(loan, as_of, &mut postings)?;
                self.commit(loan, postings)
            }
            LoanCommand::WriteOff { id, on } => {
                let loan = self.open_loan(id, &command)?;
                let mut postings = Postings::new();
                let mut loan = self.accrue(loan, on, &mut postings)?;
                if !loan.status.is_terminal() {
                    Self::write_off_remainder(&mut loan, on, &mut postings);
                }
                self.commit(loan, postings)
            }
            LoanCommand::Rate { id, stars } => self.rate(id, stars),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn repo_with_loan() -> (InMemoryLoanRepository, LoanId) {
        let mut repo = InMemoryLoanRepository::new(RateSchedule::standard()).unwrap();
        let loan = repo
            .apply(LoanCommand::Originate {
                borrower: "amina".into(),
                lender: Some("kwame".into()),
                principal: dec!(250),
                tenor_days: None,
                disbursed_on: date(1, 1),
            })
            .unwrap();
        (repo, loan.id)
    }

    #[test]
    fn test_originate_books_disbursement_and_interest() {
        let (repo, id) = repo_with_loan();
        assert_eq!(id, 1);
        let entries: Vec<_> = repo.ledger().entries_for_loan(id).collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, LedgerEntryKind::Disbursement);
        assert_eq!(entries[1].amount, dec!(37.5));
    }

    #[test]
    fn test_snapshots_are_detached() {
        let (repo, id) = repo_with_loan();
        let mut snapshot = repo.get(id).unwrap();
        snapshot.amount_paid = dec!(999);
        assert_eq!(repo.get(id).unwrap().amount_paid, Decimal::ZERO);
    }

    #[test]
    fn test_full_repayment_closes_loan() {
        let (mut repo, id) = repo_with_loan();
        repo.apply(LoanCommand::RecordRepayment { id, amount: dec!(100), paid_on: date(1, 3) })
            .unwrap();
        let loan = repo
            .apply(LoanCommand::RecordRepayment { id, amount: dec!(187.5), paid_on: date(1, 8) })
            .unwrap();
        assert_eq!(loan.status, LoanStatus::Repaid);
        assert_eq!(loan.closed_on, Some(date(1, 8)));
    }

    #[test]
    fn test_overpayment_rejected() {
        let (mut repo, id) = repo_with_loan();
        let err = repo
            .apply(LoanCommand::RecordRepayment { id, amount: dec!(300), paid_on: date(1, 3) })
            .unwrap_err();
        assert!(matches!(err, LendingError::InvalidInput { .. }));
    }

    #[test]
    fn test_refresh_is_idempotent_for_same_date() {
        let (mut repo, id) = repo_with_loan();
        // due 2024-01-08, 10 days late on 2024-01-18 => 3 chargeable days
        let first = repo.apply(LoanCommand::Refresh { id, as_of: date(1, 18) }).unwrap();
        assert_eq!(first.status, LoanStatus::Overdue);
        assert_eq!(first.penalty_charged, dec!(43.125));
        let entries = repo.ledger().len();

        let second = repo.apply(LoanCommand::Refresh { id, as_of: date(1, 18) }).unwrap();
        assert_eq!(second, first);
        assert_eq!(repo.ledger().len(), entries);
    }

    #[test]
    fn test_refresh_past_threshold_defaults() {
        let (mut repo, id) = repo_with_loan();
        let loan = repo.apply(LoanCommand::Refresh { id, as_of: date(3, 1) }).unwrap();
        assert_eq!(loan.status, LoanStatus::Defaulted);
        assert_eq!(
            repo.ledger().total_for_loan(id, LedgerEntryKind::WriteOff),
            loan.outstanding()
        );
    }

    #[test]
    fn test_terminal_loans_reject_commands() {
        let (mut repo, id) = repo_with_loan();
        repo.apply(LoanCommand::WriteOff { id, on: date(1, 5) }).unwrap();
        let err = repo
            .apply(LoanCommand::RecordRepayment { id, amount: dec!(10), paid_on: date(1, 6) })
            .unwrap_err();
        assert!(matches!(err, LendingError::InvalidTransition { .. }));
    }

    #[test]
    fn test_unknown_loan() {
        let mut repo = InMemoryLoanRepository::new(RateSchedule::standard()).unwrap();
        let err = repo.apply(LoanCommand::Refresh { id: 42, as_of: date(1, 1) }).unwrap_err();
        assert!(matches!(err, LendingError::LoanNotFound(42)));
    }

    #[test]
    fn test_blacklisted_borrower_cannot_borrow() {
        let (mut repo, id) = repo_with_loan();
        repo.apply(LoanCommand::WriteOff { id, on: date(1, 5) }).unwrap();
        let err = repo
            .apply(LoanCommand::Originate {
                borrower: "amina".into(),
                lender: None,
                principal: dec!(50),
                tenor_days: None,
                disbursed_on: date(2, 1),
            })
            .unwrap_err();
        assert!(matches!(err, LendingError::InvalidInput { ref field, .. } if field == "borrower"));
    }

    #[test]
    fn test_rating_requires_repaid_loan() {
        let (mut repo, id) = repo_with_loan();
        assert!(repo.apply(LoanCommand::Rate { id, stars: 5 }).is_err());
        repo.apply(LoanCommand::RecordRepayment { id, amount: dec!(287.5), paid_on: date(1, 2) })
            .unwrap();
        assert!(repo.apply(LoanCommand::Rate { id, stars: 0 }).is_err());
        let rated = repo.apply(LoanCommand::Rate { id, stars: 4 }).unwrap();
        assert_eq!(rated.rating, Some(4));
    }

    #[test]
    fn test_loan_cannot_be_rated_twice() {
        let (mut repo, id) = repo_with_loan();
        repo.apply(LoanCommand::RecordRepayment { id, amount: dec!(287.5), paid_on: date(1, 2) })
            .unwrap();
        repo.apply(LoanCommand::Rate { id, stars: 2 }).unwrap();
        let err = repo.apply(LoanCommand::Rate { id, stars: 5 }).unwrap_err();
        assert!(matches!(err, LendingError::InvalidInput { ref field, .. } if field == "stars"));
        assert_eq!(repo.get(id).unwrap().rating, Some(2));
    }

    #[test]
    fn test_rejected_repayment_changes_nothing() {
        let (mut repo, id) = repo_with_loan();
        let before = repo.get(id).unwrap();
        let entries = repo.ledger().len();

        // 20 days late: penalty would accrue, but the amount is too large
        let err = repo
            .apply(LoanCommand::RecordRepayment { id, amount: dec!(5000), paid_on: date(1, 28) })
            .unwrap_err();
        assert!(matches!(err, LendingError::InvalidInput { .. }));
        assert_eq!(repo.get(id).unwrap(), before);
        assert_eq!(repo.ledger().len(), entries);
    }

    #[test]
    fn test_repayment_after_default_threshold_is_rejected_without_writing_off() {
        let (mut repo, id) = repo_with_loan();
        let entries = repo.ledger().len();

        let err = repo
            .apply(LoanCommand::RecordRepayment { id, amount: dec!(10), paid_on: date(2, 15) })
            .unwrap_err();
        assert!(matches!(err, LendingError::InvalidTransition { ref from, .. } if from == "defaulted"));
        assert_eq!(repo.get(id).unwrap().status, LoanStatus::Active);
        assert_eq!(repo.ledger().len(), entries);
        assert_eq!(
            borrower_standing(&repo.list(), "amina").standing,
            Standing::Good
        );
    }
}
