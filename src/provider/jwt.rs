//! Unverified JWT claim decoding.
//!
//! The provider validates access tokens on every `GET /user`; this module
//! only reads the `exp` claim locally so a stale session can be refreshed
//! before it is presented.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};

/// Claims carried by a provider access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    pub exp: Option<u64>,
    pub iat: Option<u64>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Decode a JWT payload without signature verification.
pub fn decode_jwt_unverified(token: &str) -> Result<Claims, JwtError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(JwtError::InvalidFormat);
    }

    // Some issuers pad the segments; the no-pad engine rejects '='.
    let payload_bytes = URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .map_err(|_| JwtError::InvalidFormat)?;

    serde_json::from_slice(&payload_bytes).map_err(|_| JwtError::InvalidFormat)
}

/// Check if a JWT is expired based on its `exp` claim.
///
/// Tokens that cannot be decoded, or carry no `exp`, count as expired.
pub fn is_token_expired(token: &str, margin_secs: u64) -> bool {
    match decode_jwt_unverified(token) {
        Ok(claims) => claims
            .exp
            .is_none_or(|exp| super::now_secs() + margin_secs >= exp),
        Err(_) => true,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Invalid JWT format")]
    InvalidFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_unsigned_jwt(claims: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());
        let sig = URL_SAFE_NO_PAD.encode(b"fake-signature");
        format!("{}.{}.{}", header, payload, sig)
    }

    #[test]
    fn test_decode_jwt_unverified() {
        let claims = serde_json::json!({
            "sub": "user-123",
            "email": "test@example.com",
            "exp": 9999999999u64,
            "iat": 1700000000u64,
            "role": "authenticated",
            "session_id": "s-1"
        });
        let token = make_unsigned_jwt(&claims);
        let decoded = decode_jwt_unverified(&token).unwrap();

        assert_eq!(decoded.sub, "user-123");
        assert_eq!(decoded.email.as_deref(), Some("test@example.com"));
        assert_eq!(decoded.role.as_deref(), Some("authenticated"));
    }

    #[test]
    fn test_decode_padded_payload() {
        let claims = serde_json::json!({"sub": "u", "exp": 9999999999u64});
        let token = make_unsigned_jwt(&claims);
        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        while parts[1].len() % 4 != 0 {
            parts[1].push('=');
        }
        let padded = parts.join(".");
        assert_eq!(decode_jwt_unverified(&padded).unwrap().sub, "u");
    }

    #[test]
    fn test_decode_invalid_format() {
        assert!(decode_jwt_unverified("not-a-jwt").is_err());
        assert!(decode_jwt_unverified("a.b").is_err());
        assert!(decode_jwt_unverified("").is_err());
    }

    #[test]
    fn test_is_token_expired_valid() {
        let future_exp = super::super::now_secs() + 3600;
        let claims = serde_json::json!({"sub": "u", "exp": future_exp});
        let token = make_unsigned_jwt(&claims);
        assert!(!is_token_expired(&token, 10));
    }

    #[test]
    fn test_is_token_expired_within_margin() {
        let soon = super::super::now_secs() + 5;
        let claims = serde_json::json!({"sub": "u", "exp": soon});
        let token = make_unsigned_jwt(&claims);
        assert!(is_token_expired(&token, 10));
        assert!(!is_token_expired(&token, 0));
    }

    #[test]
    fn test_is_token_expired_past() {
        let claims = serde_json::json!({"sub": "u", "exp": 1000});
        let token = make_unsigned_jwt(&claims);
        assert!(is_token_expired(&token, 0));
    }

    #[test]
    fn test_is_token_expired_no_exp() {
        let claims = serde_json::json!({"sub": "u"});
        let token = make_unsigned_jwt(&claims);
        assert!(is_token_expired(&token, 0));
    }

    #[test]
    fn test_is_token_expired_garbage() {
        assert!(is_token_expired("garbage", 0));
    }
}
