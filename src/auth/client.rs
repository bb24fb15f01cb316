use async_trait::async_trait;
use serde::Deserialize;

use super::error::AuthError;
use super::token::Token;

/// Mailbox profile as reported by the mail API.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub email_address: Option<String>,
    pub messages_total: Option<u64>,
    pub threads_total: Option<u64>,
    pub history_id: Option<String>,
}

/// OAuth exchange capability the token lifecycle manager depends on.
///
/// Implemented by [`GoogleOAuthClient`](super::google::GoogleOAuthClient)
/// for production use; tests substitute an in-process fake.
#[async_trait]
pub trait OAuthClient: Send + Sync {
    /// Exchange a one-time authorization code for a token.
    async fn exchange_code(&self, code: &str) -> Result<Token, AuthError>;

    /// Exchange a refresh token for a new access token.
    ///
    /// The returned token's refresh-token field may be empty; callers keep
    /// the prior one in that case.
    async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<Token, AuthError>;

    /// Whether `token` should be treated as expired. A token without expiry
    /// information is expired.
    fn is_expired(&self, token: &Token) -> bool;

    /// Fetch the remote account profile with the given access token.
    async fn fetch_profile(&self, access_token: &str) -> Result<Profile, AuthError>;
}
