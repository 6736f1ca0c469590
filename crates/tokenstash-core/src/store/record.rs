use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::auth::{Credential, CredentialParts, SessionId};
use crate::config::OAuthClientConfig;
use crate::error::{Result, StoreError};

/// Naive timestamp layouts accepted for `expires_at`, read as UTC.
const NAIVE_EXPIRY_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// On-disk token record, one file per session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub user_id: String,
    pub email: String,
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl StoredToken {
    pub fn from_credential<C: Credential>(session: &SessionId, email: &str, credential: &C) -> Self {
        Self {
            user_id: session.user_id(),
            email: email.to_string(),
            access_token: credential.token().to_string(),
            refresh_token: credential.refresh_token().map(str::to_string),
            expires_at: credential.expiry().map(format_expiry),
            scopes: credential.scopes().to_vec(),
        }
    }

    pub fn expiry(&self) -> Result<Option<DateTime<Utc>>> {
        self.expires_at.as_deref().map(parse_expiry).transpose()
    }

    /// Build a credential from this record. An unparseable `expires_at` is
    /// logged and treated as unknown, the rest of the record is still used.
    pub fn into_credential<C: Credential>(self, client: &OAuthClientConfig) -> C {
        let expiry = self.expiry().unwrap_or_else(|e| {
            warn!(user = %self.user_id, error = %e, "Ignoring unreadable expiry");
            None
        });
        C::from_parts(CredentialParts {
            token: self.access_token,
            refresh_token: self.refresh_token,
            token_uri: client.token_uri.clone(),
            client_id: client.client_id.clone(),
            client_secret: client.client_secret.clone(),
            scopes: self.scopes,
            expiry,
        })
    }
}

pub fn format_expiry(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse an RFC 3339 timestamp, or a naive one taken to be UTC
pub fn parse_expiry(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    NAIVE_EXPIRY_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| StoreError::InvalidExpiry(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::OAuthCredential;
    use chrono::TimeZone;

    #[test]
    fn test_record_from_credential() {
        let session = SessionId::parse("abc123").unwrap();
        let expiry = Utc.with_ymd_and_hms(2025, 3, 1, 8, 30, 0).unwrap();
        let cred = OAuthCredential::new("T1")
            .with_refresh_token("R1")
            .with_expiry(expiry)
            .with_scopes(["a", "b"]);

        let record = StoredToken::from_credential(&session, "alice@example.com", &cred);
        assert_eq!(record.user_id, "user-abc123");
        assert_eq!(record.email, "alice@example.com");
        assert_eq!(record.access_token, "T1");
        assert_eq!(record.refresh_token.as_deref(), Some("R1"));
        assert_eq!(record.expires_at.as_deref(), Some("2025-03-01T08:30:00Z"));
        assert_eq!(record.scopes, vec!["a", "b"]);
    }

    #[test]
    fn test_record_json_layout() {
        let session = SessionId::parse("s1").unwrap();
        let record = StoredToken::from_credential(&session, "bob@example.com", &OAuthCredential::new("T"));
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "user_id": "user-s1",
                "email": "bob@example.com",
                "access_token": "T",
                "refresh_token": null,
                "expires_at": null,
                "scopes": []
            })
        );
    }

    #[test]
    fn test_parse_record_with_missing_optionals() {
        let json = r#"{"user_id": "user-x", "email": "x@example.com", "access_token": "T"}"#;
        let record: StoredToken = serde_json::from_str(json).unwrap();
        assert_eq!(record.refresh_token, None);
        assert_eq!(record.expires_at, None);
        assert!(record.scopes.is_empty());
    }

    #[test]
    fn test_parse_record_missing_access_token_fails() {
        let json = r#"{"user_id": "user-x", "email": "x@example.com"}"#;
        assert!(serde_json::from_str::<StoredToken>(json).is_err());
    }

    #[test]
    fn test_parse_expiry_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(parse_expiry("2024-06-01T12:00:00Z").unwrap(), expected);
        assert_eq!(parse_expiry("2024-06-01T14:00:00+02:00").unwrap(), expected);
        assert_eq!(parse_expiry("2024-06-01T12:00:00").unwrap(), expected);
        assert_eq!(
            parse_expiry("2024-06-01T12:00:00.250000").unwrap().timestamp(),
            expected.timestamp()
        );
        assert!(matches!(
            parse_expiry("next tuesday"),
            Err(StoreError::InvalidExpiry(_))
        ));
    }

    #[test]
    fn test_into_credential_uses_client_settings() {
        let record = StoredToken {
            user_id: "user-abc".to_string(),
            email: "a@example.com".to_string(),
            access_token: "T".to_string(),
            refresh_token: Some("R".to_string()),
            expires_at: Some("2030-01-01T00:00:00Z".to_string()),
            scopes: vec!["email".to_string()],
        };
        let client = OAuthClientConfig {
            token_uri: "https://idp.example/token".to_string(),
            client_id: Some("cid".to_string()),
            client_secret: Some("csecret".to_string()),
        };

        let cred: OAuthCredential = record.into_credential(&client);
        assert_eq!(cred.token, "T");
        assert_eq!(cred.refresh_token.as_deref(), Some("R"));
        assert_eq!(cred.token_uri, "https://idp.example/token");
        assert_eq!(cred.client_id.as_deref(), Some("cid"));
        assert_eq!(cred.client_secret.as_deref(), Some("csecret"));
        assert_eq!(cred.expiry, Some(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_into_credential_drops_unreadable_expiry() {
        let record = StoredToken {
            user_id: "user-abc".to_string(),
            email: "a@example.com".to_string(),
            access_token: "T".to_string(),
            refresh_token: Some("R".to_string()),
            expires_at: Some("garbage".to_string()),
            scopes: vec!["a".to_string()],
        };
        assert!(matches!(record.expiry(), Err(StoreError::InvalidExpiry(_))));

        let cred: OAuthCredential = record.into_credential(&OAuthClientConfig::default());
        assert_eq!(cred.token, "T");
        assert_eq!(cred.refresh_token.as_deref(), Some("R"));
        assert_eq!(cred.scopes, vec!["a"]);
        assert_eq!(cred.expiry, None);
    }
}
