use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::GmailConfig;

use super::client::{OAuthClient, Profile};
use super::error::AuthError;
use super::token::Token;

const DEFAULT_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const DEFAULT_PROFILE_URL: &str = "https://gmail.googleapis.com/gmail/v1/users/me/profile";

/// Tokens within this window of their deadline count as expired, so a
/// refresh lands before the credential actually lapses.
const EXPIRY_SKEW_MINUTES: i64 = 5;

/// Fallback lifetime when the token endpoint omits `expires_in`.
const DEFAULT_LIFETIME_SECS: i64 = 3600;

/// Google OAuth2 client for the authorization-code and refresh-token grants.
///
/// Endpoint URLs are overridable for tests against a local mock server.
///
/// # Example
/// ```no_run
/// use gmail_connector::auth::GoogleOAuthClient;
/// use gmail_connector::config::GmailConfig;
///
/// let client = GoogleOAuthClient::new(GmailConfig::from_env());
/// let consent_url = client.authorize_url()?;
/// # Ok::<(), gmail_connector::auth::AuthError>(())
/// ```
pub struct GoogleOAuthClient {
    client: reqwest::Client,
    config: GmailConfig,
    auth_url: String,
    token_url: String,
    profile_url: String,
}

impl GoogleOAuthClient {
    pub fn new(config: GmailConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            profile_url: DEFAULT_PROFILE_URL.to_string(),
        }
    }

    pub fn with_auth_url(mut self, url: impl Into<String>) -> Self {
        self.auth_url = url.into();
        self
    }

    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    pub fn with_profile_url(mut self, url: impl Into<String>) -> Self {
        self.profile_url = url.into();
        self
    }

    /// Build the consent URL the caller should send the user to.
    ///
    /// The interactive flow itself happens outside this crate; the code it
    /// produces comes back through
    /// [`TokenManager::exchange_authorization_code`](super::manager::TokenManager::exchange_authorization_code).
    pub fn authorize_url(&self) -> Result<String, AuthError> {
        let mut url = reqwest::Url::parse(&self.auth_url)
            .map_err(|err| AuthError::InvalidArgument(format!("authorize endpoint: {err}")))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("client_id", &self.config.client_id);
            pairs.append_pair("redirect_uri", &self.config.redirect_uri);
            pairs.append_pair("response_type", "code");
            pairs.append_pair("scope", &self.config.scopes.join(" "));
            pairs.append_pair("access_type", &self.config.access_type);
            pairs.append_pair("prompt", &self.config.prompt);
            if let Some(state) = &self.config.state {
                pairs.append_pair("state", state);
            }
        }
        Ok(url.into())
    }

    async fn post_token_request(&self, params: &[(&str, &str)]) -> Result<Token, AuthError> {
        let resp = self.client.post(&self.token_url).form(params).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AuthError::exchange(format!(
                "token endpoint returned {status}: {body}"
            )));
        }
        let payload: GoogleTokenResponse = resp.json().await?;
        Ok(token_from_response(payload))
    }
}

#[async_trait]
impl OAuthClient for GoogleOAuthClient {
    async fn exchange_code(&self, code: &str) -> Result<Token, AuthError> {
        debug!("exchanging authorization code");
        let token = self
            .post_token_request(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", &self.config.client_id),
                ("client_secret", &self.config.client_secret),
                ("redirect_uri", &self.config.redirect_uri),
            ])
            .await?;
        info!("authorization code exchange succeeded");
        Ok(token)
    }

    async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<Token, AuthError> {
        debug!("exchanging refresh token");
        let token = self
            .post_token_request(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", &self.config.client_id),
                ("client_secret", &self.config.client_secret),
            ])
            .await?;
        info!("refresh token exchange succeeded");
        Ok(token)
    }

    fn is_expired(&self, token: &Token) -> bool {
        match token.expires_at {
            Some(deadline) => deadline - Utc::now() < Duration::minutes(EXPIRY_SKEW_MINUTES),
            None => true,
        }
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<Profile, AuthError> {
        let resp = self
            .client
            .get(&self.profile_url)
            .bearer_auth(access_token)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AuthError::exchange(format!(
                "profile endpoint returned {status}: {body}"
            )));
        }
        Ok(resp.json().await?)
    }
}

#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    access_token: String,
    token_type: Option<String>,
    expires_in: Option<i64>,
    refresh_token: Option<String>,
    scope: Option<String>,
}

fn token_from_response(payload: GoogleTokenResponse) -> Token {
    let lifetime = payload.expires_in.unwrap_or(DEFAULT_LIFETIME_SECS);
    Token {
        access_token: payload.access_token,
        token_type: payload.token_type.unwrap_or_else(|| "Bearer".to_string()),
        expires_at: Some(Utc::now() + Duration::seconds(lifetime)),
        refresh_token: payload.refresh_token,
        scope: payload.scope,
        email: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GoogleOAuthClient {
        GoogleOAuthClient::new(GmailConfig {
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            redirect_uri: "http://localhost:9004/callback".to_string(),
            state: Some("csrf-1".to_string()),
            ..GmailConfig::default()
        })
    }

    fn token_with_deadline(deadline: Option<chrono::DateTime<Utc>>) -> Token {
        Token {
            access_token: "access".to_string(),
            token_type: "Bearer".to_string(),
            expires_at: deadline,
            refresh_token: None,
            scope: None,
            email: None,
        }
    }

    #[test]
    fn token_without_expiry_information_is_expired() {
        assert!(client().is_expired(&token_with_deadline(None)));
    }

    #[test]
    fn token_beyond_the_skew_window_is_fresh() {
        let deadline = Utc::now() + Duration::minutes(30);
        assert!(!client().is_expired(&token_with_deadline(Some(deadline))));
    }

    #[test]
    fn token_inside_the_skew_window_is_expired() {
        let deadline = Utc::now() + Duration::minutes(2);
        assert!(client().is_expired(&token_with_deadline(Some(deadline))));
    }

    #[test]
    fn token_past_its_deadline_is_expired() {
        let deadline = Utc::now() - Duration::hours(1);
        assert!(client().is_expired(&token_with_deadline(Some(deadline))));
    }

    #[test]
    fn authorize_url_carries_the_consent_parameters() {
        let url = client().authorize_url().unwrap();
        assert!(url.starts_with(DEFAULT_AUTH_URL));
        assert!(url.contains("client_id=client-id"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("state=csrf-1"));
    }

    #[test]
    fn token_response_defaults_lifetime_and_token_type() {
        let token = token_from_response(GoogleTokenResponse {
            access_token: "at-1".to_string(),
            token_type: None,
            expires_in: None,
            refresh_token: None,
            scope: None,
        });
        assert_eq!(token.token_type, "Bearer");
        let deadline = token.expires_at.expect("deadline");
        assert!(deadline > Utc::now() + Duration::minutes(55));
        assert!(deadline <= Utc::now() + Duration::minutes(61));
    }
}
