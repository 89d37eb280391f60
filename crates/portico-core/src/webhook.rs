//! Webhook signature verification and payload parsing.
//!
//! Booking providers sign their webhook deliveries with an HMAC-SHA256
//! digest over the literal wire bytes of the request body. Any re-encoding
//! of a parsed body (whitespace, key order, number formatting) silently
//! invalidates every signature, so the transport layer MUST hand this
//! module the unmodified byte buffer — body auto-parsing has to be
//! bypassed for webhook routes.
//!
//! Verification never returns an error: it resolves to a definite
//! true/false so call sites cannot accidentally treat a failure path as
//! "verification passed". Payload parsing happens strictly after
//! verification succeeds.

use hmac::{Hmac, Mac};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Length of a hex-encoded SHA-256 digest.
const HEX_DIGEST_LEN: usize = 64;

// ============================================================================
// Signature Verification
// ============================================================================

/// Verify an HMAC-SHA256 webhook signature against the raw request body.
///
/// The header value may carry multiple comma-separated candidate tokens,
/// each optionally prefixed `sha256=`; the first token that is exactly a
/// 64-character hex digest is compared. Multi-valued headers are the
/// boundary's concern: callers pass the first value, or `None` when the
/// header is absent.
///
/// Fails closed on an empty or whitespace-only secret — verification is
/// never attempted with an empty key.
///
/// The digest comparison runs in constant time over the decoded bytes so
/// that response timing does not reveal where the first mismatching byte
/// occurs. Byte lengths are not secret and short-circuit safely.
pub fn verify_signature(raw_body: &[u8], signature_header: Option<&str>, secret: &str) -> bool {
    if secret.trim().is_empty() {
        return false;
    }

    let Some(header) = signature_header else {
        return false;
    };

    let Some(provided_hex) = extract_hex_digest(header) else {
        return false;
    };

    let Ok(provided) = hex::decode(&provided_hex) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(raw_body);
    let expected = mac.finalize().into_bytes();

    if provided.len() != expected.len() {
        return false;
    }

    expected.ct_eq(&provided).into()
}

/// Pull the first plausible hex digest out of a signature header value.
///
/// Each comma-separated segment is trimmed and checked against
/// `(optional "sha256=") + exactly 64 hex characters`; the first match is
/// returned lowercased.
fn extract_hex_digest(raw_header: &str) -> Option<String> {
    for segment in raw_header.split(',') {
        let segment = segment.trim();
        let candidate = segment.strip_prefix("sha256=").unwrap_or(segment);
        if candidate.len() == HEX_DIGEST_LEN && candidate.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Some(candidate.to_ascii_lowercase());
        }
    }
    None
}

// ============================================================================
// Payload Parsing
// ============================================================================

/// Parse verified webhook bytes into a typed payload.
///
/// Returns `None` on malformed JSON or invalid UTF-8 instead of erroring;
/// the caller maps that to an invalid-argument rejection. Must only be
/// invoked after [`verify_signature`] returned `true`, so unverified
/// payloads are never interpreted even loosely.
pub fn parse_webhook_json<T: DeserializeOwned>(raw_body: &[u8]) -> Option<T> {
    serde_json::from_slice(raw_body).ok()
}

/// Envelope of a booking-provider webhook delivery.
///
/// Only the trigger event is interpreted here; the inner payload is kept
/// as raw JSON because its shape is owned by the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingWebhookPayload {
    #[serde(rename = "triggerEvent")]
    pub trigger_event: String,

    #[serde(default)]
    pub payload: serde_json::Value,
}

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod tests;
