use thiserror::Error;

/// Typed failures for token lifecycle operations.
///
/// Nothing here is retried internally; retry and backoff policy belong to
/// the calling ingestion pipeline.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed caller input, e.g. an empty authorization code.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No usable token and no refresh path; the caller must restart the
    /// interactive consent flow.
    #[error("Authorization required: no usable token and no refresh token")]
    AuthRequired,

    /// A refresh was requested but the stored token has no refresh token.
    #[error("Refresh unavailable: stored token has no refresh token")]
    RefreshUnavailable,

    /// Provider or transport failure during a network exchange.
    #[error("Exchange failed: {message}")]
    ExchangeFailed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AuthError {
    pub(crate) fn exchange(message: impl Into<String>) -> Self {
        Self::ExchangeFailed {
            message: message.into(),
            source: None,
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(error: reqwest::Error) -> Self {
        Self::ExchangeFailed {
            message: error.to_string(),
            source: Some(Box::new(error)),
        }
    }
}

impl From<std::io::Error> for AuthError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<toml::de::Error> for AuthError {
    fn from(error: toml::de::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<toml::ser::Error> for AuthError {
    fn from(error: toml::ser::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}
