use std::process::ExitCode;
use std::time::Instant;

use tracing_subscriber::fmt::format::FmtSpan;

use coss::config::Config;
use coss::notify::Notifier;
use coss::scrape::CoScraper;
use coss::CossError;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("{error}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), CossError> {
    let start = Instant::now();
    let config = Config::load()?;
    tracing::info!(products = config.products.len(), "Starting stock check");

    let scraper = CoScraper::new(config.endpoints.clone())?;
    let results = scraper.check_all(&config.products).await;
    let batch: Vec<_> = config.products.iter().cloned().zip(results).collect();

    let notifier = Notifier::new(&config.telegram);
    notifier
        .send_digest(&config.endpoints.product_base, batch)
        .await?;

    tracing::info!(duration = ?start.elapsed(), "Stock check completed");
    Ok(())
}
