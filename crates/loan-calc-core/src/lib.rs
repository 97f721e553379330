pub mod amortization;
pub mod costs;
pub mod error;
pub mod format;
pub mod limits;
pub mod quote;
pub mod rates;
pub mod types;

pub use error::LoanCalcError;
pub use types::*;

/// Standard result type for all loan-calc operations
pub type LoanCalcResult<T> = Result<T, LoanCalcError>;
