pub mod cli;
pub mod fiscal;

use crate::domain::model::Agency;
use crate::utils::error::Result;
use crate::utils::validation::{validate_path, validate_url, Validate};
use clap::Parser;
use fiscal::FiscalCalendar;
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_URL: &str = "https://api.usaspending.gov";

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "spendfetch")]
#[command(about = "Fetch CBP & ICE contract transactions from USAspending into per-fiscal-year CSVs")]
pub struct CliConfig {
    /// Fiscal years to fetch: "all", one or more years (e.g. 2025 2026),
    /// or nothing for the latest configured year only
    pub years: Vec<String>,

    #[arg(long, default_value = DEFAULT_API_URL)]
    pub api_url: String,

    #[arg(long, default_value = "./data")]
    pub output_dir: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_url("api_url", &self.api_url)?;
        validate_path("output_dir", &self.output_dir)?;
        Ok(())
    }
}

/// Immutable runtime configuration, assembled once at startup and handed to
/// the pipeline explicitly. Agency order is load-bearing: CSV rows and
/// summary columns follow it.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub agencies: Vec<Agency>,
    pub calendar: FiscalCalendar,
    pub output_dir: String,
}

impl AppConfig {
    pub fn new(output_dir: String) -> Self {
        Self {
            agencies: vec![
                Agency::new("CBP", "U.S. Customs and Border Protection"),
                Agency::new("ICE", "U.S. Immigration and Customs Enforcement"),
            ],
            calendar: FiscalCalendar::default(),
            output_dir,
        }
    }

    pub fn from_cli(cli: &CliConfig) -> Self {
        Self::new(cli.output_dir.clone())
    }
}
