pub mod config;
pub mod daycount;
pub mod error;
pub mod types;

#[cfg(feature = "terms")]
pub mod terms;

#[cfg(feature = "ledger")]
pub mod ledger;

#[cfg(feature = "loans")]
pub mod loans;

pub use config::{PenaltyBasis, RateSchedule};
pub use error::LendingError;
pub use types::*;

/// Standard result type for all lending operations
pub type LendingResult<T> = Result<T, LendingError>;
