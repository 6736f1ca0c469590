//! Store configuration.
//!
//! The storage directory and OAuth client settings are injected into
//! `SessionTokenStore` at construction. `StoreConfig::from_env` builds them
//! from process environment; by default tokens live under
//! `<cache dir>/tokenstash/tokens`.

use std::path::PathBuf;

use crate::error::{Result, StoreError};

/// Application name used for the default storage directory
const APP_NAME: &str = "tokenstash";

/// Subdirectory of the application cache dir that holds token records
const TOKENS_DIR: &str = "tokens";

/// Token issuance endpoint handed to reconstructed credentials
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

pub const ENV_CLIENT_ID: &str = "GOOGLE_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "GOOGLE_CLIENT_SECRET";
pub const ENV_TOKEN_URI: &str = "TOKENSTASH_TOKEN_URI";
pub const ENV_STORE_DIR: &str = "TOKENSTASH_DIR";

/// OAuth client settings attached to every credential rebuilt on load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthClientConfig {
    pub token_uri: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl Default for OAuthClientConfig {
    fn default() -> Self {
        Self {
            token_uri: DEFAULT_TOKEN_URI.to_string(),
            client_id: None,
            client_secret: None,
        }
    }
}

impl OAuthClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        Self {
            token_uri: get(ENV_TOKEN_URI).unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string()),
            client_id: get(ENV_CLIENT_ID),
            client_secret: get(ENV_CLIENT_SECRET),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub base_dir: PathBuf,
    pub client: OAuthClientConfig,
}

impl StoreConfig {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            client: OAuthClientConfig::default(),
        }
    }

    pub fn with_client(mut self, client: OAuthClientConfig) -> Self {
        self.client = client;
        self
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_dir = match lookup(ENV_STORE_DIR).filter(|v| !v.is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => Self::default_dir()?,
        };
        Ok(Self {
            base_dir,
            client: OAuthClientConfig::from_lookup(lookup),
        })
    }

    /// `<user cache dir>/tokenstash/tokens`
    pub fn default_dir() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir().ok_or(StoreError::NoStorageDir)?;
        Ok(cache_dir.join(APP_NAME).join(TOKENS_DIR))
    }
}
