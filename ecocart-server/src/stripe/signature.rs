//! Stripe webhook signature (HMAC-SHA256)
//!
//! Header format: `t=<unix seconds>,v1=<hex>[,v1=<hex>...]`. The signed
//! payload is `"{t}.{raw body}"`.

use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Maximum distance between the signed timestamp and now
const TOLERANCE_SECS: i64 = 300;

/// Verify against the current clock
pub fn verify_webhook_signature(
    payload: &[u8],
    sig_header: &str,
    secret: &str,
) -> Result<(), &'static str> {
    verify_webhook_signature_at(payload, sig_header, secret, chrono::Utc::now().timestamp())
}

/// Verify against an explicit clock (unix seconds)
pub fn verify_webhook_signature_at(
    payload: &[u8],
    sig_header: &str,
    secret: &str,
    now: i64,
) -> Result<(), &'static str> {
    let mut timestamp = "";
    let mut signatures = Vec::new();
    for part in sig_header.split(',') {
        let part = part.trim();
        if let Some(t) = part.strip_prefix("t=") {
            timestamp = t;
        } else if let Some(v) = part.strip_prefix("v1=") {
            signatures.push(v);
        }
    }

    if timestamp.is_empty() || signatures.is_empty() {
        return Err("Invalid Stripe-Signature header");
    }

    let mac = signed_mac(payload, timestamp, secret)?;

    // Constant-time comparison via hmac::verify_slice; any v1 entry may match
    let matched = signatures.iter().any(|sig| {
        hex::decode(sig)
            .map(|bytes| mac.clone().verify_slice(&bytes).is_ok())
            .unwrap_or(false)
    });
    if !matched {
        return Err("Webhook signature mismatch");
    }

    // Reject events outside the tolerance window to prevent replay attacks
    let ts: i64 = timestamp.parse().map_err(|_| "Invalid timestamp")?;
    if (now - ts).abs() > TOLERANCE_SECS {
        return Err("Webhook timestamp outside tolerance");
    }

    Ok(())
}

/// Build a `Stripe-Signature` header value for a payload.
///
/// Used to replay events against a local server.
pub fn signature_header(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let ts = timestamp.to_string();
    let sig = signed_mac(payload, &ts, secret)
        .map(|mac| hex::encode(mac.finalize().into_bytes()))
        .unwrap_or_default();
    format!("t={ts},v1={sig}")
}

fn signed_mac(payload: &[u8], timestamp: &str, secret: &str) -> Result<Hmac<Sha256>, &'static str> {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).map_err(|_| "HMAC key error")?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}
