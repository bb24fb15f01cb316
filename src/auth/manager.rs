use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::client::OAuthClient;
use super::error::AuthError;
use super::store::TokenStore;
use super::token::Token;

/// Token lifecycle manager for one bound Gmail account.
///
/// Guarantees that a caller asking for a usable credential either gets a
/// valid, non-expired [`Token`] or triggers the single remote exchange
/// needed to obtain one, and that every successful exchange is persisted
/// before it is handed back. The store is the source of truth on first use;
/// the manager writes back after every state-changing exchange.
///
/// All operations serialize on one internal async mutex, so concurrent
/// callers for the same account cannot race a refresh-then-persist sequence
/// and clobber each other's stored refresh token.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use gmail_connector::auth::{FileTokenStore, GoogleOAuthClient, TokenManager};
/// use gmail_connector::config::GmailConfig;
///
/// # async fn example() -> Result<(), gmail_connector::auth::AuthError> {
/// let client = Arc::new(GoogleOAuthClient::new(GmailConfig::from_env()));
/// let store = Arc::new(FileTokenStore::new_default("ingest@example.com"));
/// let manager = TokenManager::new(client, store, None);
///
/// if manager.has_stored_token().await? {
///     let token = manager.ensure_fresh().await?;
///     println!("bearer {}", token.access_token);
/// }
/// # Ok(())
/// # }
/// ```
pub struct TokenManager {
    client: Arc<dyn OAuthClient>,
    store: Arc<dyn TokenStore>,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    /// Bound mailbox identity. Learned from the remote profile after the
    /// first authorization, or from a hydrated token's email stamp, when not
    /// supplied at construction.
    account: Option<String>,
    /// Current token; `None` until hydrated from the store.
    token: Option<Token>,
}

impl TokenManager {
    pub fn new(
        client: Arc<dyn OAuthClient>,
        store: Arc<dyn TokenStore>,
        account: Option<String>,
    ) -> Self {
        Self {
            client,
            store,
            state: Mutex::new(State {
                account,
                token: None,
            }),
        }
    }

    /// The currently bound account identity, if known.
    pub async fn account(&self) -> Option<String> {
        self.state.lock().await.account.clone()
    }

    /// Re-bind the manager to a different account identity.
    pub async fn set_account(&self, account: impl Into<String>) {
        self.state.lock().await.account = Some(account.into());
    }

    /// Whether the store holds a usable token record.
    ///
    /// Reads the store directly; no cache mutation, no network access.
    pub async fn has_stored_token(&self) -> Result<bool, AuthError> {
        Ok(self
            .store
            .load()?
            .map(|token| token.is_usable())
            .unwrap_or(false))
    }

    /// The current token: the in-memory one if set, else lazily hydrated
    /// from the store.
    pub async fn current_token(&self) -> Result<Option<Token>, AuthError> {
        let mut state = self.state.lock().await;
        self.hydrate(&mut state)
    }

    /// Whether the current token is expired.
    ///
    /// No token at all, or a token without expiry information, reports
    /// expired.
    pub async fn is_expired(&self) -> Result<bool, AuthError> {
        let mut state = self.state.lock().await;
        Ok(match self.hydrate(&mut state)? {
            Some(token) => self.client.is_expired(&token),
            None => true,
        })
    }

    /// Return a valid, non-expired token, refreshing it first if necessary.
    ///
    /// The fresh case is the cheap common path and issues no network call.
    /// An expired token with a refresh token triggers exactly one refresh
    /// exchange, persisted before it is returned. An expired token without a
    /// refresh path fails with [`AuthError::AuthRequired`]; the caller must
    /// obtain a new authorization code out of band.
    pub async fn ensure_fresh(&self) -> Result<Token, AuthError> {
        let mut state = self.state.lock().await;
        match self.hydrate(&mut state)? {
            Some(token) if !self.client.is_expired(&token) => Ok(token),
            Some(token) => {
                if token.usable_refresh_token().is_none() {
                    return Err(AuthError::AuthRequired);
                }
                self.refresh_locked(&mut state, token).await
            }
            None => Err(AuthError::AuthRequired),
        }
    }

    /// Refresh unconditionally, regardless of the current expiry state.
    ///
    /// Useful when the remote API has already rejected the access token (a
    /// 401 on a mail call) ahead of the recorded deadline. Fails with
    /// [`AuthError::RefreshUnavailable`] when the stored token has no
    /// refresh token, without a network call.
    pub async fn refresh(&self) -> Result<Token, AuthError> {
        let mut state = self.state.lock().await;
        match self.hydrate(&mut state)? {
            Some(token) => self.refresh_locked(&mut state, token).await,
            None => Err(AuthError::AuthRequired),
        }
    }

    /// Exchange a one-time authorization code for a token, bind the account
    /// from the remote profile, persist, and cache.
    ///
    /// While a non-expired token exists this returns it unchanged without
    /// contacting the provider, so a one-time code cannot be spent twice.
    /// A failed profile fetch is non-fatal: the exchange still succeeds and
    /// only the account binding is skipped.
    pub async fn exchange_authorization_code(&self, code: &str) -> Result<Token, AuthError> {
        let mut state = self.state.lock().await;
        if let Some(token) = self.hydrate(&mut state)? {
            if !self.client.is_expired(&token) {
                debug!("existing token still fresh, skipping code exchange");
                return Ok(token);
            }
        }
        if code.trim().is_empty() {
            return Err(AuthError::InvalidArgument(
                "empty authorization code".to_string(),
            ));
        }
        let token = self.client.exchange_code(code).await?;
        match self.client.fetch_profile(&token.access_token).await {
            Ok(profile) => {
                if let Some(address) = profile.email_address {
                    state.account = Some(address);
                }
            }
            Err(err) => {
                warn!(error = %err, "profile fetch failed, keeping previous account identity");
            }
        }
        let token = self.persist_locked(&state, &token)?;
        state.token = Some(token.clone());
        info!(
            account = state.account.as_deref().unwrap_or("unknown"),
            "authorization code exchanged"
        );
        Ok(token)
    }

    /// Stamp `token` with the bound account identity and write it to the
    /// store. The in-memory cache is left untouched; use
    /// [`add_token`](Self::add_token) to persist and cache together.
    pub async fn persist(&self, token: &Token) -> Result<(), AuthError> {
        let state = self.state.lock().await;
        self.persist_locked(&state, token)?;
        Ok(())
    }

    /// Persist `token` and make it the current in-memory token.
    pub async fn add_token(&self, token: Token) -> Result<Token, AuthError> {
        let mut state = self.state.lock().await;
        let token = self.persist_locked(&state, &token)?;
        state.token = Some(token.clone());
        Ok(token)
    }

    /// Delete the stored record and clear the in-memory token.
    ///
    /// Local bookkeeping only; the credential is not invalidated
    /// server-side.
    pub async fn revoke(&self) -> Result<(), AuthError> {
        let mut state = self.state.lock().await;
        self.store.delete()?;
        state.token = None;
        info!(
            account = state.account.as_deref().unwrap_or("unknown"),
            "stored token revoked"
        );
        Ok(())
    }

    /// Load the token from the store into the cache if the cache is empty.
    ///
    /// Records with an empty access token are treated as absent: they are
    /// not credentials and must never be handed out. A manager with no bound
    /// account adopts the email stamped on the hydrated token.
    fn hydrate(&self, state: &mut State) -> Result<Option<Token>, AuthError> {
        if state.token.is_none() {
            match self.store.load()? {
                Some(token) if token.is_usable() => {
                    debug!("hydrated token from store");
                    if state.account.is_none() && token.email.is_some() {
                        state.account = token.email.clone();
                    }
                    state.token = Some(token);
                }
                _ => {}
            }
        }
        Ok(state.token.clone())
    }

    async fn refresh_locked(&self, state: &mut State, prior: Token) -> Result<Token, AuthError> {
        let refresh_token = match prior.usable_refresh_token() {
            Some(value) => value.to_string(),
            None => return Err(AuthError::RefreshUnavailable),
        };
        debug!("access token expired, refreshing");
        let mut token = self.client.exchange_refresh_token(&refresh_token).await?;
        // Google omits the refresh token on refresh responses; keep the
        // prior one.
        if token.usable_refresh_token().is_none() {
            token.refresh_token = Some(refresh_token);
        }
        let token = self.persist_locked(state, &token)?;
        state.token = Some(token.clone());
        info!(
            account = state.account.as_deref().unwrap_or("unknown"),
            "access token refreshed"
        );
        Ok(token)
    }

    fn persist_locked(&self, state: &State, token: &Token) -> Result<Token, AuthError> {
        let mut record = token.clone();
        record.email = state.account.clone();
        self.store.save(&record)?;
        Ok(record)
    }
}
