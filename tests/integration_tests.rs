use httpmock::prelude::*;
use serde_json::json;
use spendfetch::{AppConfig, EtlEngine, LocalStorage, SpendingClient, SpendingPipeline};
use tempfile::TempDir;

const SEARCH_PATH: &str = "/api/v2/search/spending_by_transaction/";
const CBP: &str = "U.S. Customs and Border Protection";
const ICE: &str = "U.S. Immigration and Customs Enforcement";

const EXPECTED_HEADER: &str = "Agency,Award ID,Recipient Name,Federal Action Obligation,\
Action Date,Modification,Product/Service Description,NAICS Description,Transaction Description";

fn page_matcher(agency: &str, page: u32) -> String {
    format!(
        r#"{{"page": {}, "filters": {{"agencies": [{{"name": "{}"}}]}}}}"#,
        page, agency
    )
}

fn result_row(award_id: &str, amount: serde_json::Value) -> serde_json::Value {
    json!({
        "Award ID": award_id,
        "Recipient Name": format!("{} CORP", award_id),
        "Transaction Amount": amount,
        "Action Date": "2026-01-15",
        "Mod": "0",
        "product_or_service_description": "GUARD SERVICES",
        "naics_description": "SECURITY SERVICES",
        "Transaction Description": "TASK ORDER"
    })
}

fn build_pipeline(
    server: &MockServer,
    output_dir: &str,
) -> SpendingPipeline<LocalStorage, SpendingClient> {
    let client = SpendingClient::new(server.base_url()).unwrap();
    let storage = LocalStorage::new(output_dir.to_string());
    SpendingPipeline::new(client, storage, AppConfig::new(output_dir.to_string()))
}

fn read_csv_rows(path: &std::path::Path) -> Vec<Vec<String>> {
    let data = std::fs::read(path).unwrap();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(data.as_slice());
    reader
        .records()
        .map(|r| r.unwrap().iter().map(|f| f.to_string()).collect())
        .collect()
}

#[tokio::test]
async fn test_end_to_end_fiscal_year_fetch() {
    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().to_str().unwrap().to_string();
    let server = MockServer::start();

    // CBP paginates: two rows, then one, then stop.
    let cbp_page1 = server.mock(|when, then| {
        when.method(POST)
            .path(SEARCH_PATH)
            .json_body_partial(page_matcher(CBP, 1));
        then.status(200).json_body(json!({
            "results": [
                result_row("CBP-A", json!(1500000.5)),
                result_row("CBP-B", json!(250000.0)),
            ],
            "page_metadata": {"hasNext": true}
        }));
    });
    let cbp_page2 = server.mock(|when, then| {
        when.method(POST)
            .path(SEARCH_PATH)
            .json_body_partial(page_matcher(CBP, 2));
        then.status(200).json_body(json!({
            "results": [result_row("CBP-C", json!(100.25))],
            "page_metadata": {"hasNext": false}
        }));
    });
    // ICE fits in one page; one row has a null amount.
    let ice_page1 = server.mock(|when, then| {
        when.method(POST)
            .path(SEARCH_PATH)
            .json_body_partial(page_matcher(ICE, 1));
        then.status(200).json_body(json!({
            "results": [
                result_row("ICE-A", json!(75000.0)),
                result_row("ICE-B", json!(null)),
            ],
            "page_metadata": {"hasNext": false}
        }));
    });

    let pipeline = build_pipeline(&server, &output_dir);
    let summary = pipeline.run_fiscal_year(2026).await.unwrap();

    cbp_page1.assert();
    cbp_page2.assert();
    ice_page1.assert();

    assert_eq!(summary.agencies[0].transaction_count, 3);
    assert_eq!(summary.agencies[0].total_obligated, 1750100.75);
    assert!(!summary.agencies[0].truncated);
    assert_eq!(summary.agencies[1].transaction_count, 2);
    assert_eq!(summary.agencies[1].total_obligated, 75000.0);

    let csv_path = temp_dir
        .path()
        .join("CBP_ICE_FY26_Contract_Obligations_Itemized.csv");
    assert!(csv_path.exists());

    // Exact header line, then CBP rows before ICE rows.
    let content = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(content.lines().next().unwrap(), EXPECTED_HEADER);

    let rows = read_csv_rows(&csv_path);
    assert_eq!(rows.len(), 1 + 3 + 2);
    let agency_column: Vec<&str> = rows[1..].iter().map(|r| r[0].as_str()).collect();
    assert_eq!(agency_column, vec!["CBP", "CBP", "CBP", "ICE", "ICE"]);

    // The obligation column sums to the printed totals, nulls counted as 0.
    let column_sum: f64 = rows[1..]
        .iter()
        .map(|row| row[3].parse::<f64>().unwrap())
        .sum();
    assert_eq!(
        column_sum,
        summary.agencies[0].total_obligated + summary.agencies[1].total_obligated
    );
    assert_eq!(rows[5][3], "0");
}

#[tokio::test]
async fn test_mid_fetch_failure_truncates_but_still_writes() {
    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().to_str().unwrap().to_string();
    let server = MockServer::start();

    let cbp_page1 = server.mock(|when, then| {
        when.method(POST)
            .path(SEARCH_PATH)
            .json_body_partial(page_matcher(CBP, 1));
        then.status(200).json_body(json!({
            "results": [result_row("CBP-A", json!(500.0))],
            "page_metadata": {"hasNext": true}
        }));
    });
    // Page 2 dies. No page 3 mock: a third request would 404 and fail the
    // hit assertions below.
    let cbp_page2 = server.mock(|when, then| {
        when.method(POST)
            .path(SEARCH_PATH)
            .json_body_partial(page_matcher(CBP, 2));
        then.status(500);
    });
    let ice_page1 = server.mock(|when, then| {
        when.method(POST)
            .path(SEARCH_PATH)
            .json_body_partial(page_matcher(ICE, 1));
        then.status(200).json_body(json!({
            "results": [result_row("ICE-A", json!(300.0))],
            "page_metadata": {"hasNext": false}
        }));
    });

    let pipeline = build_pipeline(&server, &output_dir);
    let summary = pipeline.run_fiscal_year(2026).await.unwrap();

    cbp_page1.assert_hits(1);
    cbp_page2.assert_hits(1);
    ice_page1.assert_hits(1);

    // CBP kept page 1 and is flagged; ICE is untouched by CBP's failure.
    assert!(summary.agencies[0].truncated);
    assert_eq!(summary.agencies[0].transaction_count, 1);
    assert!(!summary.agencies[1].truncated);
    assert_eq!(summary.agencies[1].transaction_count, 1);

    let rows = read_csv_rows(
        &temp_dir
            .path()
            .join("CBP_ICE_FY26_Contract_Obligations_Itemized.csv"),
    );
    assert_eq!(rows.len(), 3);
}

#[tokio::test]
async fn test_rerun_fully_overwrites_previous_csv() {
    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().to_str().unwrap().to_string();
    let server = MockServer::start();

    let mut first_mock = server.mock(|when, then| {
        when.method(POST).path(SEARCH_PATH);
        then.status(200).json_body(json!({
            "results": [
                result_row("OLD-1", json!(1.0)),
                result_row("OLD-2", json!(2.0)),
                result_row("OLD-3", json!(3.0)),
            ],
            "page_metadata": {"hasNext": false}
        }));
    });

    let pipeline = build_pipeline(&server, &output_dir);
    pipeline.run_fiscal_year(2026).await.unwrap();

    let csv_path = temp_dir
        .path()
        .join("CBP_ICE_FY26_Contract_Obligations_Itemized.csv");
    assert_eq!(read_csv_rows(&csv_path).len(), 1 + 3 + 3);

    // Same year again with a smaller dataset: no residue from the first run.
    first_mock.delete();
    server.mock(|when, then| {
        when.method(POST).path(SEARCH_PATH);
        then.status(200).json_body(json!({
            "results": [result_row("NEW-1", json!(9.0))],
            "page_metadata": {"hasNext": false}
        }));
    });

    pipeline.run_fiscal_year(2026).await.unwrap();

    let rows = read_csv_rows(&csv_path);
    assert_eq!(rows.len(), 1 + 1 + 1);
    let awards: Vec<&str> = rows[1..].iter().map(|r| r[1].as_str()).collect();
    assert_eq!(awards, vec!["NEW-1", "NEW-1"]);
}

#[tokio::test]
async fn test_engine_fetches_selected_years_only() {
    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().to_str().unwrap().to_string();
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(POST).path(SEARCH_PATH);
        then.status(200).json_body(json!({
            "results": [result_row("X-1", json!(10.0))],
            "page_metadata": {"hasNext": false}
        }));
    });

    let pipeline = build_pipeline(&server, &output_dir);
    let config = AppConfig::new(output_dir.clone());

    // "2099" is unrecognized; only FY2026 gets fetched, and nothing errors.
    let years = config
        .calendar
        .select_years(&["2026".to_string(), "2099".to_string()]);
    assert_eq!(years, vec![2026]);

    let engine = EtlEngine::new(pipeline);
    let summaries = engine.run(&years).await;

    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].year, 2026);
    assert!(temp_dir
        .path()
        .join("CBP_ICE_FY26_Contract_Obligations_Itemized.csv")
        .exists());
    assert!(!temp_dir
        .path()
        .join("CBP_ICE_FY99_Contract_Obligations_Itemized.csv")
        .exists());
}
