//! Verification and decoding of Stripe webhook deliveries.
//!
//! Stripe signs each delivery with HMAC-SHA256 over `"{timestamp}.{body}"`
//! and sends the result in the `Stripe-Signature` header as
//! `t=<unix>,v1=<hex>[,v1=<hex>...]`. The raw request body must be used:
//! re-serializing the JSON would change the bytes and break the signature.

use crate::error::PaymentError;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::collections::HashMap;

// Create a type alias for the HMAC-SHA256 implementation.
type HmacSha256 = Hmac<Sha256>;

/// How far a delivery's timestamp may lag before it is rejected as a replay.
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// The parsed `Stripe-Signature` header.
#[derive(Debug, Clone)]
pub struct SignatureHeader {
    pub timestamp: i64,
    pub signatures: Vec<String>,
}

/// Parses a `Stripe-Signature` header value.
pub fn parse_signature_header(header: &str) -> Result<SignatureHeader, PaymentError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let (key, value) = part
            .trim()
            .split_once('=')
            .ok_or_else(|| PaymentError::SignatureHeader(header.to_string()))?;
        match key {
            "t" => {
                timestamp = Some(
                    value
                        .parse::<i64>()
                        .map_err(|_| PaymentError::SignatureHeader(header.to_string()))?,
                );
            }
            "v1" => signatures.push(value.to_string()),
            // Older scheme versions (v0) are ignored.
            _ => {}
        }
    }

    let timestamp =
        timestamp.ok_or_else(|| PaymentError::SignatureHeader(header.to_string()))?;
    if signatures.is_empty() {
        return Err(PaymentError::SignatureHeader(header.to_string()));
    }

    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

/// Verifies a webhook delivery against the endpoint signing secret, using the
/// current wall clock for the replay window.
pub fn verify_signature(
    secret: &str,
    header: &str,
    payload: &[u8],
    tolerance_secs: i64,
) -> Result<(), PaymentError> {
    verify_signature_at(
        secret,
        header,
        payload,
        tolerance_secs,
        chrono::Utc::now().timestamp(),
    )
}

/// Clock-injected form of `verify_signature`.
pub fn verify_signature_at(
    secret: &str,
    header: &str,
    payload: &[u8],
    tolerance_secs: i64,
    now: i64,
) -> Result<(), PaymentError> {
    let parsed = parse_signature_header(header)?;

    if (now - parsed.timestamp).abs() > tolerance_secs {
        return Err(PaymentError::StaleWebhook(parsed.timestamp));
    }

    for candidate in &parsed.signatures {
        let Ok(candidate_bytes) = hex::decode(candidate) else {
            continue;
        };

        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(parsed.timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);

        // verify_slice performs a constant-time comparison.
        if mac.verify_slice(&candidate_bytes).is_ok() {
            return Ok(());
        }
    }

    Err(PaymentError::SignatureMismatch)
}

/// A Stripe event envelope, decoded after signature verification.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: StripeEventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeEventData {
    pub object: StripeCheckoutSession,
}

/// The checkout session object inside a `checkout.session.completed` event.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeCheckoutSession {
    pub id: String,
    /// Total in the smallest currency unit (cents for USD).
    pub amount_total: Option<i64>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";
    const PAYLOAD: &[u8] = br#"{"id":"evt_1","type":"checkout.session.completed"}"#;

    fn sign(secret: &str, timestamp: i64, payload: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn valid_signature_verifies() {
        let now = 1_700_000_000;
        let header = format!("t={},v1={}", now, sign(SECRET, now, PAYLOAD));
        assert!(
            verify_signature_at(SECRET, &header, PAYLOAD, DEFAULT_TOLERANCE_SECS, now).is_ok()
        );
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let now = 1_700_000_000;
        let header = format!("t={},v1={}", now, sign(SECRET, now, PAYLOAD));
        let tampered = br#"{"id":"evt_1","type":"checkout.session.completed","amount":1}"#;
        let result =
            verify_signature_at(SECRET, &header, tampered, DEFAULT_TOLERANCE_SECS, now);
        assert!(matches!(result, Err(PaymentError::SignatureMismatch)));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let now = 1_700_000_000;
        let header = format!("t={},v1={}", now, sign("whsec_other", now, PAYLOAD));
        let result =
            verify_signature_at(SECRET, &header, PAYLOAD, DEFAULT_TOLERANCE_SECS, now);
        assert!(matches!(result, Err(PaymentError::SignatureMismatch)));
    }

    #[test]
    fn stale_timestamp_is_rejected() {
        let signed_at = 1_700_000_000;
        let header = format!("t={},v1={}", signed_at, sign(SECRET, signed_at, PAYLOAD));
        let result = verify_signature_at(
            SECRET,
            &header,
            PAYLOAD,
            DEFAULT_TOLERANCE_SECS,
            signed_at + DEFAULT_TOLERANCE_SECS + 1,
        );
        assert!(matches!(result, Err(PaymentError::StaleWebhook(_))));
    }

    #[test]
    fn second_v1_signature_is_accepted() {
        // Stripe sends two v1 entries while a secret is being rolled.
        let now = 1_700_000_000;
        let header = format!(
            "t={},v1={},v1={}",
            now,
            sign("whsec_old", now, PAYLOAD),
            sign(SECRET, now, PAYLOAD)
        );
        assert!(
            verify_signature_at(SECRET, &header, PAYLOAD, DEFAULT_TOLERANCE_SECS, now).is_ok()
        );
    }

    #[test]
    fn header_without_timestamp_is_rejected() {
        let result = parse_signature_header("v1=deadbeef");
        assert!(matches!(result, Err(PaymentError::SignatureHeader(_))));
    }

    #[test]
    fn checkout_session_event_decodes() {
        let json = r#"{
            "id": "evt_1PWx",
            "type": "checkout.session.completed",
            "data": {
                "object": {
                    "id": "cs_test_a1",
                    "amount_total": 2500,
                    "metadata": { "pitcher_id": "7f8a1f8c-0000-0000-0000-000000000000" }
                }
            }
        }"#;
        let event: StripeEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.event_type, "checkout.session.completed");
        assert_eq!(event.data.object.amount_total, Some(2500));
        assert!(event.data.object.metadata.contains_key("pitcher_id"));
    }
}
