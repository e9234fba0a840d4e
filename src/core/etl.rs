use crate::core::pipeline::SpendingPipeline;
use crate::domain::model::FiscalYearSummary;
use crate::domain::ports::{Storage, TransactionSource};
use crate::utils::format::format_currency;

/// Drives the pipeline across the selected fiscal years, strictly in order.
/// One year failing (lookup, render, or write) is reported and the run moves
/// on to the next year.
pub struct EtlEngine<S: Storage, T: TransactionSource> {
    pipeline: SpendingPipeline<S, T>,
}

impl<S: Storage, T: TransactionSource> EtlEngine<S, T> {
    pub fn new(pipeline: SpendingPipeline<S, T>) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self, years: &[u16]) -> Vec<FiscalYearSummary> {
        let codes: Vec<&str> = self
            .pipeline
            .config()
            .agencies
            .iter()
            .map(|a| a.code.as_str())
            .collect();

        println!("{}", "=".repeat(60));
        println!("{} Dashboard Data Fetcher", codes.join(" & "));
        println!("{}", "=".repeat(60));

        let mut summaries = Vec::new();
        for &year in years {
            println!("\nProcessing FY{}...", year);
            match self.pipeline.run_fiscal_year(year).await {
                Ok(summary) => {
                    for totals in &summary.agencies {
                        println!(
                            "{}: {} ({} transactions{})",
                            totals.agency.code,
                            format_currency(totals.total_obligated),
                            totals.transaction_count,
                            if totals.truncated { ", incomplete" } else { "" }
                        );
                    }
                    println!("Total: {}", format_currency(summary.total_obligated()));
                    println!("Data saved to: {}", summary.csv_path);
                    summaries.push(summary);
                }
                Err(e) => {
                    tracing::error!("FY{} failed: {}", year, e);
                    eprintln!("FY{} failed: {}", year, e);
                }
            }
        }

        print_summary_table(&summaries);
        summaries
    }
}

fn print_summary_table(summaries: &[FiscalYearSummary]) {
    if summaries.is_empty() {
        return;
    }

    println!("\n{}", "=".repeat(60));
    println!("COMPLETE!");
    println!("{}", "=".repeat(60));

    print!("{:<8}", "FY");
    for totals in &summaries[0].agencies {
        print!(
            " {:>18} {:>10}",
            format!("{} Total", totals.agency.code),
            format!("{} Txns", totals.agency.code)
        );
    }
    println!();

    let mut any_truncated = false;
    for summary in summaries {
        print!("{:<8}", format!("FY{}", summary.year));
        for totals in &summary.agencies {
            let count = if totals.truncated {
                any_truncated = true;
                format!("{}*", totals.transaction_count)
            } else {
                totals.transaction_count.to_string()
            };
            print!(
                " {:>18} {:>10}",
                format_currency(totals.total_obligated),
                count
            );
        }
        println!();
    }

    if any_truncated {
        println!("* fetch stopped early on error; counts are a lower bound");
    }
}
