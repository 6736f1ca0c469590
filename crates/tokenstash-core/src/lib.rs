//! Core library for tokenstash.
//!
//! Persists OAuth2 credentials (access token, refresh token, scopes and
//! expiry) keyed by session id, one JSON file per session.
//!
//! ```no_run
//! use tokenstash_core::{OAuthCredential, SessionTokenStore, StoreConfig};
//!
//! # fn main() -> tokenstash_core::Result<()> {
//! let store = SessionTokenStore::new(StoreConfig::from_env()?);
//! let cred = OAuthCredential::new("access").with_refresh_token("refresh");
//! store.save("abc123", "alice@example.com", &cred)?;
//!
//! let _loaded: Option<OAuthCredential> = store.load("abc123")?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod store;

pub use auth::{Credential, CredentialParts, OAuthCredential, SessionId};
pub use config::{OAuthClientConfig, StoreConfig};
pub use error::{Result, StoreError};
pub use store::{SessionTokenStore, StoredToken};
