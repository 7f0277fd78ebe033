//! HMAC-SHA256 session cookie signing and verification.
//!
//! Cookie format: `base64url(payload).base64url(hmac_signature)`
//!
//! The payload is the JSON-encoded provider session. The signature covers
//! the raw JSON so a client cannot swap in tokens it did not receive here.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::StoredSession;

type HmacSha256 = Hmac<Sha256>;

/// Sign a payload, returning the cookie value.
pub fn sign_value(secret: &[u8], payload: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC key length is always valid");
    mac.update(payload.as_bytes());
    let signature = mac.finalize().into_bytes();

    let payload_encoded = URL_SAFE_NO_PAD.encode(payload.as_bytes());
    let sig_encoded = URL_SAFE_NO_PAD.encode(signature);

    format!("{}.{}", payload_encoded, sig_encoded)
}

/// Verify a signed cookie value and extract the payload.
///
/// Returns `None` if the signature is invalid or the format is wrong.
pub fn verify_value(secret: &[u8], cookie_value: &str) -> Option<String> {
    let (payload_part, sig_part) = cookie_value.split_once('.')?;

    let payload_bytes = URL_SAFE_NO_PAD.decode(payload_part).ok()?;
    let payload = String::from_utf8(payload_bytes).ok()?;

    let expected_sig = URL_SAFE_NO_PAD.decode(sig_part).ok()?;

    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC key length is always valid");
    mac.update(payload.as_bytes());

    mac.verify_slice(&expected_sig).ok()?;

    Some(payload)
}

/// Encode a provider session as a signed cookie value.
pub fn encode_session(secret: &[u8], session: &StoredSession) -> String {
    // A struct of strings and an integer always serializes.
    let payload = serde_json::to_string(session).unwrap_or_default();
    sign_value(secret, &payload)
}

/// Decode and verify a session cookie value.
pub fn decode_session(secret: &[u8], cookie_value: &str) -> Option<StoredSession> {
    let payload = verify_value(secret, cookie_value)?;
    serde_json::from_str(&payload).ok()
}
