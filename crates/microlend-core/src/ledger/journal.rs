use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LendingError;
use crate::types::{LoanId, Money};
use crate::LendingResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerEntryKind {
    /// Principal paid out to the borrower.
    Disbursement,
    /// Interest booked at origination.
    Interest,
    Repayment,
    /// Late penalty charged to the borrower.
    Penalty,
    /// Remaining balance abandoned on default.
    WriteOff,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub sequence: u64,
    pub loan_id: LoanId,
    pub borrower: String,
    pub date: NaiveDate,
    pub kind: LedgerEntryKind,
    /// Always non-negative; `kind` carries the direction.
    pub amount: Money,
}

/// Per-borrower totals derived from the ledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BorrowerLedgerSummary {
    pub borrower: String,
    pub total_borrowed: Money,
    pub total_interest: Money,
    pub total_repaid: Money,
    pub total_penalties: Money,
    pub written_off: Money,
    /// Borrowed + interest + penalties - repaid - written off.
    pub outstanding: Money,
    pub entry_count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    entries: Vec<LedgerEntry>,
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Sequences start at 1 and increase by one per entry.
    pub fn append(
        &mut self,
        loan_id: LoanId,
        borrower: &str,
        date: NaiveDate,
        kind: LedgerEntryKind,
        amount: Money,
    ) -> LendingResult<&LedgerEntry> {
        if amount < Decimal::ZERO {
            return Err(LendingError::invalid(
                "amount",
                format!("Ledger amounts cannot be negative ({kind:?} of {amount})"),
            ));
        }

        let sequence = self.entries.last().map_or(1, |e| e.sequence + 1);
        self.entries.push(LedgerEntry {
            sequence,
            loan_id,
            borrower: borrower.to_string(),
            date,
            kind,
            amount,
        });
        Ok(&self.entries[self.entries.len() - 1])
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries_for_loan(&self, loan_id: LoanId) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.iter().filter(move |e| e.loan_id == loan_id)
    }

    /// Sum of all entries of `kind` booked against one loan.
    pub fn total_for_loan(&self, loan_id: LoanId, kind: LedgerEntryKind) -> Money {
        self.entries_for_loan(loan_id)
            .filter(|e| e.kind == kind)
            .map(|e| e.amount)
            .sum()
    }

    pub fn summary_for_borrower(&self, borrower: &str) -> BorrowerLedgerSummary {
        let mut summary = BorrowerLedgerSummary {
            borrower: borrower.to_string(),
            ..Default::default()
        };

        for entry in self.entries.iter().filter(|e| e.borrower == borrower) {
            summary.entry_count += 1;
            match entry.kind {
                LedgerEntryKind::Disbursement => summary.total_borrowed += entry.amount,
                LedgerEntryKind::Interest => summary.total_interest += entry.amount,
                LedgerEntryKind::Repayment => summary.total_repaid += entry.amount,
                LedgerEntryKind::Penalty => summary.total_penalties += entry.amount,
                LedgerEntryKind::WriteOff => summary.written_off += entry.amount,
            }
        }

        summary.outstanding = summary.total_borrowed + summary.total_interest
            + summary.total_penalties
            - summary.total_repaid
            - summary.written_off;
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[test]
    fn test_sequences_are_monotonic() {
        let mut ledger = Ledger::new();
        let a = ledger
            .append(1, "amina", day(1), LedgerEntryKind::Disbursement, dec!(250))
            .unwrap()
            .sequence;
        let b = ledger
            .append(1, "amina", day(1), LedgerEntryKind::Interest, dec!(37.5))
            .unwrap()
            .sequence;
        assert_eq!((a, b), (1, 2));
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_negative_amount_rejected() {
        let mut ledger = Ledger::new();
        assert!(ledger
            .append(1, "amina", day(1), LedgerEntryKind::Repayment, dec!(-1))
            .is_err());
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_borrower_summary_balances() {
        let mut ledger = Ledger::new();
        ledger.append(1, "amina", day(1), LedgerEntryKind::Disbursement, dec!(250)).unwrap();
        ledger.append(1, "amina", day(1), LedgerEntryKind::Interest, dec!(37.5)).unwrap();
        ledger.append(1, "amina", day(5), LedgerEntryKind::Repayment, dec!(100)).unwrap();
        ledger.append(1, "amina", day(20), LedgerEntryKind::Penalty, dec!(9.375)).unwrap();
        ledger.append(2, "kofi", day(2), LedgerEntryKind::Disbursement, dec!(500)).unwrap();

        let summary = ledger.summary_for_borrower("amina");
        assert_eq!(
            summary,
            BorrowerLedgerSummary {
                borrower: "amina".into(),
                total_borrowed: dec!(250),
                total_interest: dec!(37.5),
                total_repaid: dec!(100),
                total_penalties: dec!(9.375),
                written_off: dec!(0),
                outstanding: dec!(196.875),
                entry_count: 4,
            }
        );
        assert_eq!(ledger.total_for_loan(1, LedgerEntryKind::Repayment), dec!(100));
        assert_eq!(ledger.entries_for_loan(2).count(), 1);
    }
}
