//! Loan book: loan records, their lifecycle and point-in-time statements.

pub mod model;
pub mod repository;
pub mod standing;
pub mod statement;

pub use model::{Loan, LoanStatus};
pub use repository::{InMemoryLoanRepository, LoanCommand, LoanRepository};
pub use standing::{borrower_standing, BorrowerStanding, Standing, StandingInput};
pub use statement::{assess, build_statement, statement_from_input, LoanAssessment, LoanStatement};
