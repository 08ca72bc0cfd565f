//! Loan data structures and CSV loading

mod data;
pub mod loader;

pub use data::{monthly_rate, round_currency, ConventionSelection, LoanTerms, RepaymentConvention};
pub(crate) use data::validate_terms;
pub use loader::{load_loans, load_loans_from_reader, LoanRecord};
