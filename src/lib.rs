//! Gmail OAuth2 credential management.
//!
//! Obtains, persists, validates, and refreshes the OAuth2 credentials for a
//! single Gmail account, and exposes an authenticated handle for the Gmail
//! API. The interactive consent flow stays with the caller; this crate takes
//! the authorization code that flow produces and manages everything after it.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use gmail_connector::auth::{FileTokenStore, GoogleOAuthClient, TokenManager};
//! use gmail_connector::config::GmailConfig;
//!
//! # async fn example() -> Result<(), gmail_connector::auth::AuthError> {
//! let config = GmailConfig::from_env();
//! let client = Arc::new(GoogleOAuthClient::new(config));
//! let store = Arc::new(FileTokenStore::new_default("ingest@example.com"));
//! let manager = TokenManager::new(client, store, Some("ingest@example.com".to_string()));
//!
//! let token = manager.ensure_fresh().await?;
//! println!("bearer {}", token.access_token);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod gmail;
