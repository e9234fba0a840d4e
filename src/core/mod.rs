pub mod client;
pub mod etl;
pub mod pipeline;

pub use crate::domain::model::{FetchOutcome, FiscalYearSummary, Transaction, TransactionPage};
pub use crate::domain::ports::{Storage, TransactionSource};
pub use crate::utils::error::Result;
