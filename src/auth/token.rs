use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OAuth credential set for a Gmail account.
///
/// Created by a successful authorization-code or refresh-token exchange,
/// persisted through a [`TokenStore`](super::store::TokenStore), and replaced
/// wholesale on every refresh.
///
/// # Example
/// ```no_run
/// use gmail_connector::auth::Token;
///
/// let token = Token {
///     access_token: "access".to_string(),
///     token_type: "Bearer".to_string(),
///     expires_at: None,
///     refresh_token: Some("refresh".to_string()),
///     scope: Some("https://mail.google.com/".to_string()),
///     email: None,
/// };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
    /// Address of the mailbox this credential belongs to.
    pub email: Option<String>,
}

impl Token {
    /// A token without an access token string is not a credential.
    pub fn is_usable(&self) -> bool {
        !self.access_token.is_empty()
    }

    /// The refresh token, if present and non-empty.
    pub fn usable_refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref().filter(|t| !t.is_empty())
    }
}
