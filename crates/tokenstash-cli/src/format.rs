//! Display helpers for printing stored records.

use serde_json::{json, Value};
use tokenstash_core::StoredToken;

/// Characters of a token left visible when masking
const VISIBLE_TOKEN_CHARS: usize = 4;

/// Hide all but the first few characters of a secret
pub fn mask_token(token: &str) -> String {
    if token.chars().count() <= VISIBLE_TOKEN_CHARS {
        "…".to_string()
    } else {
        let visible: String = token.chars().take(VISIBLE_TOKEN_CHARS).collect();
        format!("{}…", visible)
    }
}

/// Record as JSON with both tokens masked
pub fn masked_record(record: &StoredToken) -> Value {
    json!({
        "user_id": record.user_id,
        "email": record.email,
        "access_token": mask_token(&record.access_token),
        "refresh_token": record.refresh_token.as_deref().map(mask_token),
        "expires_at": record.expires_at,
        "scopes": record.scopes,
    })
}
