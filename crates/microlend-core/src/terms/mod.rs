//! Loan terms: simple weekly interest, per-day installments and late penalties.

pub mod calculator;
pub mod schedule;
