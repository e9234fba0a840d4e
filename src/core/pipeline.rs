use crate::config::AppConfig;
use crate::core::client::fetch_transactions;
use crate::domain::model::{
    Agency, AgencyTotals, FetchOutcome, FiscalYearSummary, Transaction,
};
use crate::domain::ports::{Storage, TransactionSource};
use crate::utils::error::{PipelineError, Result};

pub const CSV_HEADER: [&str; 9] = [
    "Agency",
    "Award ID",
    "Recipient Name",
    "Federal Action Obligation",
    "Action Date",
    "Modification",
    "Product/Service Description",
    "NAICS Description",
    "Transaction Description",
];

/// `CBP_ICE_FY26_Contract_Obligations_Itemized.csv` for the default agency
/// pair and FY2026.
pub fn csv_filename(agencies: &[Agency], year: u16) -> String {
    let codes: Vec<&str> = agencies.iter().map(|a| a.code.as_str()).collect();
    format!(
        "{}_FY{:02}_Contract_Obligations_Itemized.csv",
        codes.join("_"),
        year % 100
    )
}

fn render_csv(datasets: &[(Agency, FetchOutcome)]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for (agency, outcome) in datasets {
        for t in outcome.records() {
            let amount = t.obligation().to_string();
            writer.write_record([
                agency.code.as_str(),
                t.award_id.as_deref().unwrap_or(""),
                t.recipient_name.as_deref().unwrap_or(""),
                amount.as_str(),
                t.action_date.as_deref().unwrap_or(""),
                t.modification.as_deref().unwrap_or(""),
                t.product_service_description.as_deref().unwrap_or(""),
                t.naics_description.as_deref().unwrap_or(""),
                t.description.as_deref().unwrap_or(""),
            ])?;
        }
    }

    writer
        .into_inner()
        .map_err(|e| PipelineError::IoError(std::io::Error::other(e.to_string())))
}

/// One fiscal year end to end: fetch every configured agency in order, write
/// the combined CSV, report totals from the same in-memory records.
pub struct SpendingPipeline<S: Storage, T: TransactionSource> {
    source: T,
    storage: S,
    config: AppConfig,
}

impl<S: Storage, T: TransactionSource> SpendingPipeline<S, T> {
    pub fn new(source: T, storage: S, config: AppConfig) -> Self {
        Self {
            source,
            storage,
            config,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub async fn run_fiscal_year(&self, year: u16) -> Result<FiscalYearSummary> {
        let window =
            self.config
                .calendar
                .window(year)
                .ok_or_else(|| PipelineError::ConfigError {
                    message: format!("FY{} is not a configured fiscal year", year),
                })?;

        let mut datasets = Vec::with_capacity(self.config.agencies.len());
        for agency in &self.config.agencies {
            tracing::info!("Fetching {} contract transactions...", agency.code);
            let outcome = fetch_transactions(&self.source, agency, &window).await;
            if let FetchOutcome::Truncated { cause, .. } = &outcome {
                tracing::warn!(
                    "{} FY{} fetch incomplete, keeping {} records: {}",
                    agency.code,
                    year,
                    outcome.records().len(),
                    cause
                );
            }
            datasets.push((agency.clone(), outcome));
        }

        // All fetches complete before any byte hits disk.
        let filename = csv_filename(&self.config.agencies, year);
        let csv_data = render_csv(&datasets)?;
        tracing::info!("Writing {} ({} bytes)...", filename, csv_data.len());
        self.storage.write_file(&filename, &csv_data).await?;

        let agencies = datasets
            .iter()
            .map(|(agency, outcome)| AgencyTotals {
                agency: agency.clone(),
                total_obligated: outcome.records().iter().map(Transaction::obligation).sum(),
                transaction_count: outcome.records().len(),
                truncated: outcome.is_truncated(),
            })
            .collect();

        Ok(FiscalYearSummary {
            year,
            agencies,
            csv_path: format!("{}/{}", self.config.output_dir, filename),
        })
    }
}
