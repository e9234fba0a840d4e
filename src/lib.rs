pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::{cli::LocalStorage, fiscal::FiscalCalendar, AppConfig, CliConfig};
pub use core::{client::SpendingClient, etl::EtlEngine, pipeline::SpendingPipeline};
pub use domain::model::{FetchOutcome, FiscalYearSummary, Transaction};
pub use utils::error::{PipelineError, Result};
