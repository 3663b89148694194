use super::oauth;
use crate::config::Config;
use crate::error::{auth_error, SyncResult};
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};

pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Tokens this close to expiry are refreshed before use
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Lifetime assumed when the token endpoint omits `expires_in`
const DEFAULT_EXPIRES_IN: i64 = 3600;

/// Access/refresh credential as persisted in the token file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Unix timestamp (seconds)
    pub expires_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// Response of Google's token endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    pub scope: Option<String>,
}

impl Credential {
    /// Build a credential from a token response.
    ///
    /// Refresh responses usually omit the refresh token, in which case the
    /// previous one is carried over.
    pub fn from_response(response: TokenResponse, previous_refresh: Option<String>, now: i64) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token.or(previous_refresh),
            expires_at: now + response.expires_in.unwrap_or(DEFAULT_EXPIRES_IN),
            scope: response.scope,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now().timestamp())
    }

    pub fn is_valid_at(&self, now: i64) -> bool {
        !self.access_token.is_empty() && self.expires_at - EXPIRY_MARGIN_SECS > now
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Loads, refreshes and persists the OAuth credential
#[derive(Clone)]
pub struct TokenManager {
    config: Config,
    token_file: PathBuf,
    token_url: String,
    client: Client,
}

impl TokenManager {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            token_file: config.token_file.clone(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            client: Client::new(),
        }
    }

    /// Use a different token endpoint
    pub fn with_token_url(mut self, token_url: &str) -> Self {
        self.token_url = token_url.to_string();
        self
    }

    /// Get a usable credential: the stored one, a refreshed one, or a fresh login
    pub async fn obtain_credentials(&self) -> SyncResult<Credential> {
        match self.load()? {
            Some(credential) if credential.is_valid() => {
                debug!("Using stored access token");
                Ok(credential)
            }
            Some(credential) if credential.can_refresh() => {
                info!("Access token expired, refreshing");
                let credential = self.refresh(&credential).await?;
                self.save(&credential)?;
                Ok(credential)
            }
            _ => {
                info!("No usable token found, starting interactive login");
                self.login().await
            }
        }
    }

    /// Run the interactive login flow and persist its result
    pub async fn login(&self) -> SyncResult<Credential> {
        let secrets = self.config.client_secrets()?;
        let credential = oauth::run_login_flow(
            &self.client,
            &self.token_url,
            &secrets,
            self.config.redirect_port,
        )
        .await?;
        self.save(&credential)?;
        Ok(credential)
    }

    /// Read the token file; a missing or unreadable file yields `None`
    pub fn load(&self) -> SyncResult<Option<Credential>> {
        if !self.token_file.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.token_file)?;
        match serde_json::from_str::<Credential>(&content) {
            Ok(credential) => Ok(Some(credential)),
            Err(e) => {
                warn!(
                    "Ignoring unreadable token file {}: {}",
                    self.token_file.display(),
                    e
                );
                Ok(None)
            }
        }
    }

    pub fn save(&self, credential: &Credential) -> SyncResult<()> {
        if let Some(parent) = self.token_file.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        fs::write(&self.token_file, serde_json::to_string_pretty(credential)?)?;
        debug!("Saved token to {}", self.token_file.display());
        Ok(())
    }

    /// Exchange the refresh token for a new access token
    pub async fn refresh(&self, credential: &Credential) -> SyncResult<Credential> {
        let refresh_token = credential
            .refresh_token
            .clone()
            .ok_or_else(|| auth_error("No refresh token in token data"))?;
        let secrets = self.config.client_secrets()?;

        let params = [
            ("client_id", secrets.client_id.as_str()),
            ("client_secret", secrets.client_secret.as_str()),
            ("refresh_token", refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| auth_error(&format!("Failed to refresh token: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(auth_error(&format!(
                "Failed to refresh token: HTTP {} - {}",
                status, error_body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| auth_error(&format!("Failed to parse token response: {}", e)))?;

        Ok(Credential::from_response(
            token,
            Some(refresh_token),
            Utc::now().timestamp(),
        ))
    }
}
