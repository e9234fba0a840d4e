use std::time::Duration;

use serde::Deserialize;

use crate::config::fiscal::FiscalWindow;
use crate::domain::model::{Agency, FetchOutcome, Transaction, TransactionPage};
use crate::domain::ports::TransactionSource;
use crate::utils::error::Result;

pub const SEARCH_PATH: &str = "/api/v2/search/spending_by_transaction/";
pub const PAGE_LIMIT: usize = 100;
pub const AWARD_TYPE_CODES: [&str; 4] = ["A", "B", "C", "D"];
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const FIELDS: [&str; 9] = [
    "Award ID",
    "Recipient Name",
    "Transaction Amount",
    "Action Date",
    "Awarding Sub Agency",
    "Transaction Description",
    "Mod",
    "product_or_service_description",
    "naics_description",
];

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Transaction>,
    #[serde(default)]
    page_metadata: PageMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct PageMetadata {
    #[serde(rename = "hasNext", default)]
    has_next: bool,
}

/// HTTP client for the USAspending transaction-search endpoint.
pub struct SpendingClient {
    client: reqwest::Client,
    base_url: String,
}

impl SpendingClient {
    pub fn new(base_url: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, base_url })
    }

    fn search_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), SEARCH_PATH)
    }
}

#[async_trait::async_trait]
impl TransactionSource for SpendingClient {
    async fn fetch_page(
        &self,
        agency_full_name: &str,
        window: &FiscalWindow,
        page: u32,
    ) -> Result<TransactionPage> {
        let payload = serde_json::json!({
            "filters": {
                "agencies": [{
                    "type": "awarding",
                    "tier": "subtier",
                    "name": agency_full_name,
                }],
                "time_period": [{
                    "start_date": window.start.to_string(),
                    "end_date": window.end.to_string(),
                }],
                "award_type_codes": AWARD_TYPE_CODES,
            },
            "fields": FIELDS,
            "page": page,
            "limit": PAGE_LIMIT,
            "sort": "Transaction Amount",
            "order": "desc",
        });

        tracing::debug!("POST {} (page {})", self.search_url(), page);
        let response = self.client.post(self.search_url()).json(&payload).send().await?;
        let body: SearchResponse = response.error_for_status()?.json().await?;

        Ok(TransactionPage {
            results: body.results,
            has_next: body.page_metadata.has_next,
        })
    }
}

/// Pulls every page for one agency and window.
///
/// Pages are 1-based and advance by one. The loop stops on the first page
/// with `hasNext == false`, the first empty page, or the first error. On
/// error, everything fetched from earlier pages is kept and the outcome is
/// marked truncated; no retry, no further requests.
pub async fn fetch_transactions<T: TransactionSource>(
    source: &T,
    agency: &Agency,
    window: &FiscalWindow,
) -> FetchOutcome {
    let mut all_results = Vec::new();
    let mut page: u32 = 1;

    loop {
        match source.fetch_page(&agency.full_name, window, page).await {
            Ok(page_data) => {
                let count = page_data.results.len();
                all_results.extend(page_data.results);
                tracing::info!(
                    "  Page {}: {} transactions (total: {})",
                    page,
                    count,
                    all_results.len()
                );

                if !page_data.has_next || count == 0 {
                    return FetchOutcome::Complete(all_results);
                }
                page += 1;
            }
            Err(e) => {
                tracing::error!("  Error on page {}: {}", page, e);
                return FetchOutcome::Truncated {
                    records: all_results,
                    cause: e,
                };
            }
        }
    }
}
