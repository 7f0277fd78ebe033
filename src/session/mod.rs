//! Session cookie bridge.
//!
//! The provider's session travels in a single signed cookie. Nothing is
//! persisted server-side: `middleware` reads the cookie at the start of a
//! request and writes any change back on the way out.

pub mod cookie;
pub mod middleware;

use serde::{Deserialize, Serialize};

use crate::provider::{EXPIRY_MARGIN_SECS, jwt, now_secs};

/// Provider session carried in the session cookie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix seconds. Absent when the provider did not report one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
}

impl StoredSession {
    /// Whether the access token must be refreshed before use.
    ///
    /// Falls back to the token's own `exp` claim when `expires_at` is unknown.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(exp) => now_secs() + EXPIRY_MARGIN_SECS >= exp,
            None => jwt::is_token_expired(&self.access_token, EXPIRY_MARGIN_SECS),
        }
    }
}
