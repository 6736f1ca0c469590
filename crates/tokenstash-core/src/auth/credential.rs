use chrono::{DateTime, Utc};

/// Everything needed to rebuild a usable credential from a stored record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialParts {
    pub token: String,
    pub refresh_token: Option<String>,
    pub token_uri: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub scopes: Vec<String>,
    pub expiry: Option<DateTime<Utc>>,
}

/// Capabilities the token store needs from a credential type.
///
/// Refresh and validation belong to the implementor; the store only reads
/// these fields on save and calls `from_parts` on load.
pub trait Credential: Sized {
    fn token(&self) -> &str;

    fn refresh_token(&self) -> Option<&str>;

    fn expiry(&self) -> Option<DateTime<Utc>>;

    /// Granted scopes, empty when unknown
    fn scopes(&self) -> &[String];

    fn from_parts(parts: CredentialParts) -> Self;
}

/// Plain OAuth2 credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthCredential {
    pub token: String,
    pub refresh_token: Option<String>,
    pub token_uri: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub scopes: Vec<String>,
    pub expiry: Option<DateTime<Utc>>,
}

impl OAuthCredential {
    /// Credential with only an access token, as handed over by a fresh login
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            refresh_token: None,
            token_uri: crate::config::DEFAULT_TOKEN_URI.to_string(),
            client_id: None,
            client_secret: None,
            scopes: Vec::new(),
            expiry: None,
        }
    }

    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    pub fn with_expiry(mut self, expiry: DateTime<Utc>) -> Self {
        self.expiry = Some(expiry);
        self
    }

    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Unknown expiry counts as not expired.
    pub fn is_expired(&self) -> bool {
        self.expiry.map(|at| Utc::now() >= at).unwrap_or(false)
    }
}

impl Credential for OAuthCredential {
    fn token(&self) -> &str {
        &self.token
    }

    fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    fn expiry(&self) -> Option<DateTime<Utc>> {
        self.expiry
    }

    fn scopes(&self) -> &[String] {
        &self.scopes
    }

    fn from_parts(parts: CredentialParts) -> Self {
        Self {
            token: parts.token,
            refresh_token: parts.refresh_token,
            token_uri: parts.token_uri,
            client_id: parts.client_id,
            client_secret: parts.client_secret,
            scopes: parts.scopes,
            expiry: parts.expiry,
        }
    }
}
