pub mod loans;
pub mod terms;
