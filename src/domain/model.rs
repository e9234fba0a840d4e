use serde::{Deserialize, Serialize};

use crate::utils::error::PipelineError;

/// One transaction row as returned by the spending search endpoint.
///
/// Field names mirror the remote schema. Every field is optional; the API
/// omits or nulls them freely. Rows are never merged or deduplicated; one
/// award shows up once per modification.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "Award ID", default)]
    pub award_id: Option<String>,

    #[serde(rename = "Recipient Name", default)]
    pub recipient_name: Option<String>,

    #[serde(rename = "Transaction Amount", default)]
    pub amount: Option<f64>,

    #[serde(rename = "Action Date", default)]
    pub action_date: Option<String>,

    #[serde(rename = "Mod", default)]
    pub modification: Option<String>,

    #[serde(rename = "product_or_service_description", default)]
    pub product_service_description: Option<String>,

    #[serde(rename = "naics_description", default)]
    pub naics_description: Option<String>,

    #[serde(rename = "Transaction Description", default)]
    pub description: Option<String>,
}

impl Transaction {
    /// Obligated amount with a missing/null amount treated as zero.
    pub fn obligation(&self) -> f64 {
        self.amount.unwrap_or(0.0)
    }
}

/// One page of search results plus the pagination flag from `page_metadata`.
#[derive(Debug, Clone, Default)]
pub struct TransactionPage {
    pub results: Vec<Transaction>,
    pub has_next: bool,
}

/// An awarding subtier agency: short code for output labels, full legal name
/// for the remote filter (exact match, no fuzzing).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agency {
    pub code: String,
    pub full_name: String,
}

impl Agency {
    pub fn new(code: &str, full_name: &str) -> Self {
        Self {
            code: code.to_string(),
            full_name: full_name.to_string(),
        }
    }
}

/// Result of one paginated fetch.
///
/// A mid-pagination failure keeps everything fetched so far but is
/// distinguishable from a clean run, so downstream consumers can tell
/// "40 transactions this year" from "fetch died after page 3".
#[derive(Debug)]
pub enum FetchOutcome {
    Complete(Vec<Transaction>),
    Truncated {
        records: Vec<Transaction>,
        cause: PipelineError,
    },
}

impl FetchOutcome {
    pub fn records(&self) -> &[Transaction] {
        match self {
            FetchOutcome::Complete(records) => records,
            FetchOutcome::Truncated { records, .. } => records,
        }
    }

    pub fn into_records(self) -> Vec<Transaction> {
        match self {
            FetchOutcome::Complete(records) => records,
            FetchOutcome::Truncated { records, .. } => records,
        }
    }

    pub fn is_truncated(&self) -> bool {
        matches!(self, FetchOutcome::Truncated { .. })
    }
}

/// Per-agency totals for one fiscal year, computed from the same in-memory
/// records written to CSV.
#[derive(Debug, Clone)]
pub struct AgencyTotals {
    pub agency: Agency,
    pub total_obligated: f64,
    pub transaction_count: usize,
    pub truncated: bool,
}

#[derive(Debug, Clone)]
pub struct FiscalYearSummary {
    pub year: u16,
    pub agencies: Vec<AgencyTotals>,
    pub csv_path: String,
}

impl FiscalYearSummary {
    pub fn total_obligated(&self) -> f64 {
        self.agencies.iter().map(|a| a.total_obligated).sum()
    }
}
