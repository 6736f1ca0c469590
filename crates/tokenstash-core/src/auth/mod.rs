//! Session identifiers and the credential abstraction.
//!
//! This module provides:
//! - `SessionId`: a session key validated for use as a file name
//! - `Credential`: the accessors and constructor the token store relies on
//! - `OAuthCredential`: a plain implementation of `Credential`

pub mod credential;
pub mod session_id;

pub use credential::{Credential, CredentialParts, OAuthCredential};
pub use session_id::SessionId;
