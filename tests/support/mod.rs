#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use gmail_connector::auth::{AuthError, OAuthClient, Profile, Token, TokenStore};

/// Single-slot in-memory store. The crate keys stores by the bound account,
/// so one slot is the whole keyspace.
#[derive(Default)]
pub struct InMemoryTokenStore {
    token: Mutex<Option<Token>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, token: Token) {
        *self.token.lock().expect("store lock poisoned") = Some(token);
    }

    pub fn get(&self) -> Option<Token> {
        self.token.lock().expect("store lock poisoned").clone()
    }
}

impl TokenStore for InMemoryTokenStore {
    fn load(&self) -> Result<Option<Token>, AuthError> {
        Ok(self.get())
    }

    fn save(&self, token: &Token) -> Result<(), AuthError> {
        *self.token.lock().expect("store lock poisoned") = Some(token.clone());
        Ok(())
    }

    fn delete(&self) -> Result<(), AuthError> {
        *self.token.lock().expect("store lock poisoned") = None;
        Ok(())
    }
}

/// Scriptable [`OAuthClient`] that records exchange traffic.
///
/// Unconfigured exchanges fail the way a provider rejection would, so tests
/// can assert that no network path was taken.
#[derive(Default)]
pub struct FakeOAuthClient {
    code_token: Mutex<Option<Token>>,
    refresh_result: Mutex<Option<Token>>,
    profile_address: Mutex<Option<String>>,
    pub code_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub profile_calls: AtomicUsize,
    pub last_refresh_token: Mutex<Option<String>>,
}

impl FakeOAuthClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_code_token(self, token: Token) -> Self {
        *self.code_token.lock().expect("fake lock poisoned") = Some(token);
        self
    }

    pub fn with_refresh_result(self, token: Token) -> Self {
        *self.refresh_result.lock().expect("fake lock poisoned") = Some(token);
        self
    }

    pub fn with_profile_address(self, address: &str) -> Self {
        *self.profile_address.lock().expect("fake lock poisoned") = Some(address.to_string());
        self
    }
}

#[async_trait]
impl OAuthClient for FakeOAuthClient {
    async fn exchange_code(&self, _code: &str) -> Result<Token, AuthError> {
        self.code_calls.fetch_add(1, Ordering::SeqCst);
        self.code_token
            .lock()
            .expect("fake lock poisoned")
            .clone()
            .ok_or_else(|| AuthError::ExchangeFailed {
                message: "code exchange rejected".to_string(),
                source: None,
            })
    }

    async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<Token, AuthError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_refresh_token.lock().expect("fake lock poisoned") =
            Some(refresh_token.to_string());
        self.refresh_result
            .lock()
            .expect("fake lock poisoned")
            .clone()
            .ok_or_else(|| AuthError::ExchangeFailed {
                message: "refresh exchange rejected".to_string(),
                source: None,
            })
    }

    fn is_expired(&self, token: &Token) -> bool {
        match token.expires_at {
            Some(deadline) => deadline <= Utc::now(),
            None => true,
        }
    }

    async fn fetch_profile(&self, _access_token: &str) -> Result<Profile, AuthError> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        match self.profile_address.lock().expect("fake lock poisoned").clone() {
            Some(address) => Ok(Profile {
                email_address: Some(address),
                ..Profile::default()
            }),
            None => Err(AuthError::ExchangeFailed {
                message: "profile endpoint unavailable".to_string(),
                source: None,
            }),
        }
    }
}

pub fn fresh_token(access: &str) -> Token {
    Token {
        access_token: access.to_string(),
        token_type: "Bearer".to_string(),
        expires_at: Some(Utc::now() + Duration::hours(1)),
        refresh_token: None,
        scope: None,
        email: None,
    }
}

pub fn expired_token(access: &str, refresh: Option<&str>) -> Token {
    Token {
        access_token: access.to_string(),
        token_type: "Bearer".to_string(),
        expires_at: Some(Utc::now() - Duration::hours(1)),
        refresh_token: refresh.map(str::to_string),
        scope: None,
        email: None,
    }
}

pub fn token_without_expiry(access: &str) -> Token {
    Token {
        access_token: access.to_string(),
        token_type: "Bearer".to_string(),
        expires_at: None,
        refresh_token: None,
        scope: None,
        email: None,
    }
}
