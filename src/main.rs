use clap::Parser;
use spendfetch::config::fiscal::{FIRST_KNOWN_FY, LAST_KNOWN_FY};
use spendfetch::utils::{logger, validation::Validate};
use spendfetch::{AppConfig, CliConfig, EtlEngine, LocalStorage, SpendingClient, SpendingPipeline};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting spendfetch");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = cli.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let config = AppConfig::from_cli(&cli);
    let years = config.calendar.select_years(&cli.years);
    if years.is_empty() {
        eprintln!("Usage: spendfetch [all | YEAR...]");
        eprintln!(
            "Known fiscal years: {}-{} (no arguments fetches FY{})",
            FIRST_KNOWN_FY,
            LAST_KNOWN_FY,
            config.calendar.latest()
        );
        return Ok(());
    }

    // One output directory for every year, created up front.
    std::fs::create_dir_all(&cli.output_dir)?;

    let client = SpendingClient::new(cli.api_url.clone())?;
    let storage = LocalStorage::new(cli.output_dir.clone());
    let pipeline = SpendingPipeline::new(client, storage, config);
    let engine = EtlEngine::new(pipeline);

    let summaries = engine.run(&years).await;
    tracing::info!("Fetched {} fiscal year(s)", summaries.len());

    Ok(())
}
