use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::AuthError;
use super::token::Token;

/// Storage abstraction for the persisted token of one account.
///
/// The store is keyed implicitly by the account the owning manager is bound
/// to; it holds at most one record. It is the durable owner of the token
/// across process restarts.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<Token>, AuthError>;
    fn save(&self, token: &Token) -> Result<(), AuthError>;
    fn delete(&self) -> Result<(), AuthError>;
}

/// Configuration for file-backed token storage.
#[derive(Debug, Clone)]
pub struct TokenStoreConfig {
    pub base_dir: PathBuf,
    pub account: String,
}

impl TokenStoreConfig {
    pub fn new(base_dir: PathBuf, account: impl Into<String>) -> Self {
        Self {
            base_dir,
            account: account.into(),
        }
    }

    pub fn default_dir() -> PathBuf {
        default_connector_dir()
    }
}

/// File-backed token store using one TOML file per account.
///
/// # Example
/// ```no_run
/// use gmail_connector::auth::{FileTokenStore, Token, TokenStore};
///
/// let store = FileTokenStore::new_default("ingest@example.com");
/// let token = Token {
///     access_token: "access".to_string(),
///     token_type: "Bearer".to_string(),
///     expires_at: None,
///     refresh_token: Some("refresh".to_string()),
///     scope: None,
///     email: Some("ingest@example.com".to_string()),
/// };
/// store.save(&token)?;
/// # Ok::<(), gmail_connector::auth::AuthError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    base_dir: PathBuf,
    account: String,
}

impl FileTokenStore {
    pub fn new(config: TokenStoreConfig) -> Self {
        Self {
            base_dir: config.base_dir,
            account: config.account,
        }
    }

    pub fn new_default(account: impl Into<String>) -> Self {
        Self {
            base_dir: default_connector_dir(),
            account: account.into(),
        }
    }

    fn token_path(&self) -> PathBuf {
        let account = normalize_label(&self.account);
        self.base_dir.join(format!("{account}.toml"))
    }

    fn ensure_parent(path: &Path) -> Result<(), AuthError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<Token>, AuthError> {
        let path = self.token_path();
        let raw = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(AuthError::Io(err.to_string())),
        };
        let file: TokenFile = toml::from_str(&raw)?;
        Ok(Some(file.token))
    }

    fn save(&self, token: &Token) -> Result<(), AuthError> {
        let path = self.token_path();
        Self::ensure_parent(&path)?;
        let file = TokenFile {
            version: 1,
            account: self.account.clone(),
            token: token.clone(),
            saved_at: DateTime::<Utc>::from(std::time::SystemTime::now()),
        };
        let serialized = toml::to_string(&file)?;
        fs::write(&path, serialized)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    fn delete(&self) -> Result<(), AuthError> {
        let path = self.token_path();
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AuthError::Io(err.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TokenFile {
    version: u32,
    account: String,
    token: Token,
    saved_at: DateTime<Utc>,
}

fn default_connector_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".gmail-connector"))
        .unwrap_or_else(|| PathBuf::from(".gmail-connector"))
}

fn normalize_label(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return "default".to_string();
    }
    let mut out = String::with_capacity(trimmed.len());
    for ch in trimmed.chars() {
        let lower = ch.to_ascii_lowercase();
        if lower.is_ascii_alphanumeric() || lower == '-' {
            out.push(lower);
        } else {
            out.push('-');
        }
    }
    if out.trim_matches('-').is_empty() {
        "default".to_string()
    } else {
        out
    }
}
