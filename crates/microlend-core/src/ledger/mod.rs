//! Append-only ledger of money movements on the loan book.

pub mod journal;

pub use journal::{BorrowerLedgerSummary, Ledger, LedgerEntry, LedgerEntryKind};
