use crate::components::google_calendar::oauth::ClientSecrets;
use crate::components::reconciler::LocationTable;
use crate::error::{config_error, env_error, SyncResult};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable holding the target calendar id
pub const CALENDAR_ID_VAR: &str = "FORMULA1";
pub const DEFAULT_TOKEN_FILE: &str = "token.json";
pub const DEFAULT_CREDENTIALS_FILE: &str = "credentials.json";
pub const DEFAULT_REDIRECT_PORT: u16 = 8080;
pub const DEFAULT_CONFIG_DIR: &str = "config";

/// Main configuration structure for the reconciler
#[derive(Debug, Clone)]
pub struct Config {
    /// Google Calendar ID to reconcile
    pub calendar_id: String,
    /// OAuth client ID, overrides the credentials file
    pub google_client_id: Option<String>,
    /// OAuth client secret, overrides the credentials file
    pub google_client_secret: Option<String>,
    /// Google "installed app" client secrets JSON
    pub credentials_file: PathBuf,
    /// Persisted access/refresh token
    pub token_file: PathBuf,
    /// Local port the login flow listens on for the OAuth redirect
    pub redirect_port: u16,
    /// Which passes of the run are enabled
    pub passes: Passes,
    /// Location lookup used to rename events
    pub locations: LocationTable,
}

/// Pass toggles, read from `passes.toml` in the config directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Passes {
    pub delete_practice: bool,
    pub update_events: bool,
    pub list_events: bool,
}

impl Default for Passes {
    fn default() -> Self {
        Self {
            delete_practice: true,
            update_events: true,
            list_events: false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LocationsFile {
    #[serde(default, rename = "location")]
    entries: Vec<LocationEntry>,
}

#[derive(Debug, Deserialize)]
struct LocationEntry {
    key: String,
    name: String,
}

impl Config {
    /// Load configuration from `.env`, the environment and the config directory
    pub fn load() -> SyncResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration for the login flow, which has no use for a calendar id
    pub fn load_for_login() -> SyncResult<Self> {
        dotenv().ok();

        Self::login_from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> SyncResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let calendar_id = lookup(CALENDAR_ID_VAR)
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| env_error(CALENDAR_ID_VAR))?;

        Self::build(&lookup, calendar_id)
    }

    /// Like [`Config::from_lookup`], with the calendar id optional
    pub fn login_from_lookup<F>(lookup: F) -> SyncResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let calendar_id = lookup(CALENDAR_ID_VAR).unwrap_or_default();
        Self::build(&lookup, calendar_id)
    }

    fn build<F>(lookup: &F, calendar_id: String) -> SyncResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let google_client_id = lookup("GOOGLE_CLIENT_ID");
        let google_client_secret = lookup("GOOGLE_CLIENT_SECRET");

        let credentials_file = lookup("GOOGLE_CREDENTIALS_FILE")
            .unwrap_or_else(|| DEFAULT_CREDENTIALS_FILE.to_string())
            .into();
        let token_file = lookup("GOOGLE_TOKEN_FILE")
            .unwrap_or_else(|| DEFAULT_TOKEN_FILE.to_string())
            .into();

        let redirect_port = match lookup("OAUTH_REDIRECT_PORT") {
            Some(port) => port
                .parse::<u16>()
                .map_err(|_| config_error(&format!("Invalid OAUTH_REDIRECT_PORT: {}", port)))?,
            None => DEFAULT_REDIRECT_PORT,
        };

        let config_dir =
            PathBuf::from(lookup("F1_CONFIG_DIR").unwrap_or_else(|| DEFAULT_CONFIG_DIR.to_string()));
        let passes = load_passes(&config_dir)?;
        let locations = load_locations(&config_dir)?;

        Ok(Config {
            calendar_id,
            google_client_id,
            google_client_secret,
            credentials_file,
            token_file,
            redirect_port,
            passes,
            locations,
        })
    }

    /// OAuth client credentials, from the environment or the credentials file
    pub fn client_secrets(&self) -> SyncResult<ClientSecrets> {
        match (&self.google_client_id, &self.google_client_secret) {
            (Some(client_id), Some(client_secret)) => Ok(ClientSecrets {
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
            }),
            _ => ClientSecrets::from_file(&self.credentials_file),
        }
    }
}

fn load_passes(config_dir: &Path) -> SyncResult<Passes> {
    let path = config_dir.join("passes.toml");
    if !path.exists() {
        return Ok(Passes::default());
    }

    let content = fs::read_to_string(&path)?;
    toml::from_str::<Passes>(&content)
        .map_err(|e| config_error(&format!("{}: {}", path.display(), e)))
}

fn load_locations(config_dir: &Path) -> SyncResult<LocationTable> {
    let path = config_dir.join("locations.toml");
    if !path.exists() {
        return Ok(LocationTable::formula1());
    }

    let content = fs::read_to_string(&path)?;
    let file = toml::from_str::<LocationsFile>(&content)
        .map_err(|e| config_error(&format!("{}: {}", path.display(), e)))?;

    if file.entries.is_empty() {
        return Ok(LocationTable::formula1());
    }

    Ok(LocationTable::new(
        file.entries.into_iter().map(|entry| (entry.key, entry.name)),
    ))
}
