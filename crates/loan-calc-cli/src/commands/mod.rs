pub mod quote;
pub mod rates;
pub mod schedule;
