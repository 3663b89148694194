use f1_calendar::components::google_calendar::TokenManager;
use f1_calendar::startup;

/// Runs the Google login flow on its own and stores the resulting token.
/// `FORMULA1` is not needed here.
#[tokio::main]
async fn main() -> miette::Result<()> {
    startup::init_logging()?;

    // Load configuration
    let config = startup::load_login_config()?;

    let token_manager = TokenManager::new(&config);
    token_manager.login().await?;

    println!(
        "Token successfully saved to {}!",
        config.token_file.display()
    );

    Ok(())
}
