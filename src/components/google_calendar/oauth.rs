use super::token::{Credential, TokenResponse};
use crate::error::{auth_error, config_error, SyncResult};
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

/// OAuth client credentials of the registered desktop application
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
}

/// Layout of the client secrets JSON downloaded from the Google Cloud console
#[derive(Debug, Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

impl ClientSecrets {
    pub fn from_json(content: &str) -> SyncResult<Self> {
        let file: ClientSecretsFile = serde_json::from_str(content)?;
        file.installed
            .or(file.web)
            .ok_or_else(|| config_error("Client secrets JSON has neither 'installed' nor 'web' section"))
    }

    pub fn from_file(path: &Path) -> SyncResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            config_error(&format!(
                "Cannot read client secrets {}: {} (or set GOOGLE_CLIENT_ID and GOOGLE_CLIENT_SECRET)",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&content)
    }
}

pub fn redirect_uri(port: u16) -> String {
    format!("http://localhost:{}", port)
}

/// Consent page URL for offline access to the calendar scope
pub fn authorization_url(secrets: &ClientSecrets, port: u16, state: &str) -> SyncResult<Url> {
    Url::parse_with_params(
        GOOGLE_AUTH_URL,
        &[
            ("client_id", secrets.client_id.as_str()),
            ("redirect_uri", redirect_uri(port).as_str()),
            ("response_type", "code"),
            ("access_type", "offline"),
            ("prompt", "consent"),
            ("scope", CALENDAR_SCOPE),
            ("state", state),
        ],
    )
    .map_err(|e| auth_error(&format!("Failed to build authorization URL: {}", e)))
}

/// Extract the authorization code from the redirect request path.
///
/// Returns `Ok(None)` for requests that are not the OAuth redirect (a
/// browser asking for `/favicon.ico`, for instance).
pub fn parse_callback(request_url: &str, expected_state: &str) -> SyncResult<Option<String>> {
    let url = Url::parse("http://localhost")
        .and_then(|base| base.join(request_url))
        .map_err(|e| auth_error(&format!("Malformed callback URL: {}", e)))?;

    let mut code = None;
    let mut state = None;
    let mut error = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(error) = error {
        return Err(auth_error(&format!("Authorization was denied: {}", error)));
    }

    let Some(code) = code else {
        return Ok(None);
    };

    if state.as_deref() != Some(expected_state) {
        return Err(auth_error("State mismatch in authorization callback"));
    }

    Ok(Some(code))
}

/// Exchange an authorization code for tokens
pub async fn exchange_code(
    client: &Client,
    token_url: &str,
    secrets: &ClientSecrets,
    code: &str,
    port: u16,
) -> SyncResult<TokenResponse> {
    let redirect_uri = redirect_uri(port);
    let response = client
        .post(token_url)
        .form(&[
            ("client_id", secrets.client_id.as_str()),
            ("client_secret", secrets.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .await
        .map_err(|e| auth_error(&format!("Failed to get token: {}", e)))?;

    if !response.status().is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(auth_error(&format!("Failed to get token: {}", error_text)));
    }

    response
        .json::<TokenResponse>()
        .await
        .map_err(|e| auth_error(&format!("Failed to parse token response: {}", e)))
}

/// Open the consent page, wait for the redirect on `port` and exchange the code
pub async fn run_login_flow(
    client: &Client,
    token_url: &str,
    secrets: &ClientSecrets,
    port: u16,
) -> SyncResult<Credential> {
    let state = Uuid::new_v4().to_string();
    let auth_url = authorization_url(secrets, port, &state)?;

    // Bind before opening the browser so the redirect cannot arrive early
    let server = tiny_http::Server::http(format!("127.0.0.1:{}", port))
        .map_err(|e| auth_error(&format!("Cannot listen on port {}: {}", port, e)))?;

    println!("Opening browser for Google Calendar authorization...");
    if let Err(e) = webbrowser::open(auth_url.as_str()) {
        warn!("Failed to open browser: {}", e);
        println!("Open this URL to continue:\n{}", auth_url);
    }

    println!("Waiting for authorization callback...");
    let code = loop {
        let request = server.recv()?;
        match parse_callback(request.url(), &state) {
            Ok(Some(code)) => {
                request.respond(tiny_http::Response::from_string(
                    "Authorization successful! You can close this window.",
                ))?;
                break code;
            }
            Ok(None) => {
                debug!("Ignoring request to {}", request.url());
                request.respond(tiny_http::Response::empty(tiny_http::StatusCode(404)))?;
            }
            Err(e) => {
                request.respond(tiny_http::Response::from_string(
                    "Authorization failed. Check the terminal for details.",
                ))?;
                return Err(e);
            }
        }
    };

    let token = exchange_code(client, token_url, secrets, &code, port).await?;
    info!("Authorization completed");
    Ok(Credential::from_response(token, None, Utc::now().timestamp()))
}
