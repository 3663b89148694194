use f1_calendar::startup;
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting F1 calendar reconciliation");

    // Load configuration
    let config = startup::load_config()?;

    // Fetch, clean up and rename the season's events
    startup::run(config).await
}
