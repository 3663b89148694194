use crate::components::google_calendar::{GoogleCalendarClient, TokenManager};
use crate::components::{CalendarStore, Reconciler};
use crate::config::Config;
use crate::error::{Error, SyncResult};
use chrono::{Datelike, Local};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load the application config
pub fn load_config() -> miette::Result<Config> {
    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Load the config needed by the login flow alone
pub fn load_login_config() -> miette::Result<Config> {
    match Config::load_for_login() {
        Ok(config) => Ok(config),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Authorize, then reconcile the configured calendar once
pub async fn run(config: Config) -> miette::Result<()> {
    let credential = TokenManager::new(&config).obtain_credentials().await?;
    let client = GoogleCalendarClient::new(&credential);
    let reconciler = Reconciler::new(client, config.calendar_id.clone(), config.locations.clone())
        .with_passes(config.passes);

    reconcile(&reconciler, Local::now().year())
        .await
        .map_err(Into::into)
}

/// Single error boundary around a run.
///
/// Calendar API faults end the run with one printed message and still count
/// as a normal exit; any other error is returned to the caller.
pub async fn reconcile<S: CalendarStore>(reconciler: &Reconciler<S>, year: i32) -> SyncResult<()> {
    match reconciler.run(year).await {
        Ok(report) => {
            info!(
                fetched = report.fetched,
                deleted = report.deleted,
                updated = report.updated,
                "Reconciliation finished"
            );
            Ok(())
        }
        Err(e) if e.is_api_fault() => {
            error!("Reconciliation aborted: {}", e);
            println!("An error occurred: {}\n", e);
            Ok(())
        }
        Err(e) => Err(e),
    }
}
