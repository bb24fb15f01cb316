//! Gmail provider configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::auth::error::AuthError;

const PLACEHOLDER_CLIENT_ID: &str = "YOUR_CLIENT_ID.apps.googleusercontent.com";
const PLACEHOLDER_CLIENT_SECRET: &str = "YOUR_CLIENT_SECRET";

/// OAuth2 provider settings for one Gmail install.
///
/// Carried through to the OAuth client unchanged; the fields mirror what the
/// Google console issues for a web application, plus the consent-flow knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GmailConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    /// `offline` requests a refresh token alongside the access token.
    pub access_type: String,
    pub prompt: String,
    pub scopes: Vec<String>,
    /// Opaque CSRF state forwarded on the consent URL.
    pub state: Option<String>,
}

impl Default for GmailConfig {
    fn default() -> Self {
        Self {
            client_id: PLACEHOLDER_CLIENT_ID.to_string(),
            client_secret: PLACEHOLDER_CLIENT_SECRET.to_string(),
            redirect_uri: "http://localhost:8080/oauth/callback".to_string(),
            access_type: "offline".to_string(),
            prompt: "select_account consent".to_string(),
            scopes: vec!["https://mail.google.com/".to_string()],
            state: None,
        }
    }
}

impl GmailConfig {
    /// Load from environment variables (`GMAIL_CLIENT_ID`,
    /// `GMAIL_CLIENT_SECRET`, `GMAIL_REDIRECT_URI`, ...), falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let mut config = Self::default();
        if let Ok(value) = std::env::var("GMAIL_CLIENT_ID") {
            config.client_id = value;
        }
        if let Ok(value) = std::env::var("GMAIL_CLIENT_SECRET") {
            config.client_secret = value;
        }
        if let Ok(value) = std::env::var("GMAIL_REDIRECT_URI") {
            config.redirect_uri = value;
        }
        if let Ok(value) = std::env::var("GMAIL_ACCESS_TYPE") {
            config.access_type = value;
        }
        if let Ok(value) = std::env::var("GMAIL_PROMPT") {
            config.prompt = value;
        }
        if let Ok(value) = std::env::var("GMAIL_SCOPES") {
            config.scopes = parse_scopes(&value);
        }
        if let Ok(value) = std::env::var("GMAIL_OAUTH_STATE") {
            config.state = Some(value);
        }
        config
    }

    /// Load from a TOML file. A missing file yields the defaults.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, AuthError> {
        let raw = match std::fs::read_to_string(path.as_ref()) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(AuthError::Io(err.to_string())),
        };
        Ok(toml::from_str(&raw)?)
    }

    /// Whether this is still the unconfigured placeholder install.
    pub fn is_placeholder(&self) -> bool {
        self.client_id == PLACEHOLDER_CLIENT_ID || self.client_secret == PLACEHOLDER_CLIENT_SECRET
    }
}

fn parse_scopes(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|scope| scope.trim().to_string())
        .filter(|scope| !scope.is_empty())
        .collect()
}
