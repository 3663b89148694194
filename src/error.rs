use miette::Diagnostic;
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(f1_calendar::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(f1_calendar::config))]
    Config(String),

    #[error("Authorization error: {0}")]
    #[diagnostic(
        code(f1_calendar::auth),
        help("delete the token file and run `get_calendar_token` to log in again")
    )]
    Auth(String),

    #[error("Google Calendar API error: {0}")]
    #[diagnostic(code(f1_calendar::google_calendar))]
    GoogleCalendar(String),

    #[error("Invalid event: {0}")]
    #[diagnostic(code(f1_calendar::invalid_event))]
    InvalidEvent(String),

    #[error("HTTP error: {0}")]
    #[diagnostic(code(f1_calendar::http))]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    #[diagnostic(code(f1_calendar::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(f1_calendar::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(f1_calendar::other))]
    Other(String),
}

impl Error {
    /// Whether the error was raised by the calendar store or its transport.
    ///
    /// These are the faults the top-level run boundary reports and swallows;
    /// anything else terminates the process with a failure status.
    pub fn is_api_fault(&self) -> bool {
        matches!(self, Error::GoogleCalendar(_) | Error::Http(_))
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type SyncResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create authorization errors
pub fn auth_error(message: &str) -> Error {
    Error::Auth(message.to_string())
}

/// Helper to create Google Calendar errors
pub fn google_calendar_error(message: &str) -> Error {
    Error::GoogleCalendar(message.to_string())
}

/// Helper to create invalid event errors
pub fn invalid_event_error(message: &str) -> Error {
    Error::InvalidEvent(message.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
