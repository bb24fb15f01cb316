//! Authenticated Gmail API surface.

use std::sync::Arc;

use crate::auth::client::{OAuthClient, Profile};
use crate::auth::error::AuthError;
use crate::auth::manager::TokenManager;

/// Authenticated handle for the Gmail API.
///
/// Every call goes through [`TokenManager::ensure_fresh`] first, so callers
/// never see an expired credential.
pub struct GmailService {
    client: Arc<dyn OAuthClient>,
    manager: Arc<TokenManager>,
}

impl GmailService {
    pub fn new(client: Arc<dyn OAuthClient>, manager: Arc<TokenManager>) -> Self {
        Self { client, manager }
    }

    /// The mailbox profile for the bound account.
    pub async fn profile(&self) -> Result<Profile, AuthError> {
        let token = self.manager.ensure_fresh().await?;
        self.client.fetch_profile(&token.access_token).await
    }

    /// The bearer credential for a direct API call.
    pub async fn access_token(&self) -> Result<String, AuthError> {
        Ok(self.manager.ensure_fresh().await?.access_token)
    }
}
