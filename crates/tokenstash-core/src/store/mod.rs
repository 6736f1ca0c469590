//! Per-session token persistence.
//!
//! `SessionTokenStore` keeps one pretty-printed JSON record per session in
//! its base directory, named `<session id>.json`. The last save for a
//! session wins; records are never expired or removed automatically.

pub mod manager;
pub mod record;

pub use manager::SessionTokenStore;
pub use record::StoredToken;
