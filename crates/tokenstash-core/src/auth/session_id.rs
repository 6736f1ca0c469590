use std::fmt;
use std::str::FromStr;

use crate::error::{Result, StoreError};

/// Longest session id accepted as a file name component.
const MAX_SESSION_ID_LEN: usize = 128;

/// Extension of a stored token record.
const RECORD_EXTENSION: &str = "json";

/// Validated session identifier.
///
/// Only ASCII letters, digits, `-` and `_` are allowed, so an id can never
/// name a path outside the storage directory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn parse(id: &str) -> Result<Self> {
        let reject = |reason| StoreError::InvalidSessionId {
            id: id.to_string(),
            reason,
        };

        if id.is_empty() {
            return Err(reject("must not be empty"));
        }
        if id.len() > MAX_SESSION_ID_LEN {
            return Err(reject("longer than 128 characters"));
        }
        if !id.chars().all(Self::is_allowed_char) {
            return Err(reject("only ASCII letters, digits, '-' and '_' are allowed"));
        }
        Ok(Self(id.to_string()))
    }

    fn is_allowed_char(c: char) -> bool {
        c.is_ascii_alphanumeric() || c == '-' || c == '_'
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Account identifier recorded alongside the tokens
    pub fn user_id(&self) -> String {
        format!("user-{}", self.0)
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}", self.0, RECORD_EXTENSION)
    }

    /// Recover a session id from a record file name, ignoring anything else
    pub(crate) fn from_file_name(name: &str) -> Option<Self> {
        let stem = name.strip_suffix(RECORD_EXTENSION)?.strip_suffix('.')?;
        Self::parse(stem).ok()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SessionId {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_ids() {
        assert!(SessionId::parse("abc123").is_ok());
        assert!(SessionId::parse("9f1c-22_ab").is_ok());
        assert!(SessionId::parse(&"a".repeat(128)).is_ok());
    }

    #[test]
    fn test_parse_rejects_path_components() {
        assert!(SessionId::parse("").is_err());
        assert!(SessionId::parse(".").is_err());
        assert!(SessionId::parse("..").is_err());
        assert!(SessionId::parse("../etc/passwd").is_err());
        assert!(SessionId::parse("a/b").is_err());
        assert!(SessionId::parse("a\\b").is_err());
        assert!(SessionId::parse("with space").is_err());
        assert!(SessionId::parse("caf\u{e9}").is_err());
        assert!(SessionId::parse(&"a".repeat(129)).is_err());
    }

    #[test]
    fn test_invalid_id_error_names_the_id() {
        let err = SessionId::parse("a/b").unwrap_err();
        match err {
            StoreError::InvalidSessionId { id, .. } => assert_eq!(id, "a/b"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_from_str_validates() {
        let id: SessionId = "abc123".parse().unwrap();
        assert_eq!(id.as_str(), "abc123");
        assert!("../x".parse::<SessionId>().is_err());
    }

    #[test]
    fn test_derived_names() {
        let id = SessionId::parse("abc123").unwrap();
        assert_eq!(id.user_id(), "user-abc123");
        assert_eq!(id.file_name(), "abc123.json");
        assert_eq!(id.to_string(), "abc123");
    }

    #[test]
    fn test_from_file_name() {
        assert_eq!(
            SessionId::from_file_name("abc123.json"),
            Some(SessionId::parse("abc123").unwrap())
        );
        assert_eq!(SessionId::from_file_name("abc123.json.tmp"), None);
        assert_eq!(SessionId::from_file_name("abc123.txt"), None);
        assert_eq!(SessionId::from_file_name(".json"), None);
        assert_eq!(SessionId::from_file_name("notes"), None);
    }
}
