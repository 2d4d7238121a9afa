//! Slack request signing (v0): HMAC-SHA256 over `v0:{timestamp}:{body}` with the app's signing secret.
//!
//! Requests whose timestamp is outside the replay window are rejected even when the MAC matches.

use axum::http::HeaderMap;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-slack-signature";
pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";
const VERSION_PREFIX: &str = "v0=";

/// Default maximum distance between the request timestamp and now, in seconds.
pub const DEFAULT_REPLAY_WINDOW_SECS: u64 = 300;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("missing {0} header")]
    MissingHeader(&'static str),
    #[error("invalid request timestamp")]
    InvalidTimestamp,
    #[error("request timestamp outside the replay window")]
    Stale,
    #[error("malformed signature")]
    Malformed,
    #[error("signature mismatch")]
    Mismatch,
}

/// Verify a webhook request from its headers and raw body.
pub fn verify_request(
    headers: &HeaderMap,
    body: &[u8],
    signing_secret: &str,
    replay_window_secs: u64,
) -> Result<(), SignatureError> {
    let timestamp = header(headers, TIMESTAMP_HEADER)?;
    let signature = header(headers, SIGNATURE_HEADER)?;
    verify(
        signing_secret,
        timestamp,
        body,
        signature,
        chrono::Utc::now().timestamp(),
        replay_window_secs,
    )
}

fn header<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, SignatureError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(SignatureError::MissingHeader(name))
}

/// Check `signature` ("v0=<hex>") for `body` sent at `timestamp`, relative to `now` (unix seconds).
pub fn verify(
    signing_secret: &str,
    timestamp: &str,
    body: &[u8],
    signature: &str,
    now: i64,
    replay_window_secs: u64,
) -> Result<(), SignatureError> {
    let ts: i64 = timestamp
        .parse()
        .map_err(|_| SignatureError::InvalidTimestamp)?;
    if now.abs_diff(ts) > replay_window_secs {
        return Err(SignatureError::Stale);
    }
    let hex_sig = signature
        .strip_prefix(VERSION_PREFIX)
        .ok_or(SignatureError::Malformed)?;
    let expected = hex::decode(hex_sig).map_err(|_| SignatureError::Malformed)?;
    let mac = mac_for(signing_secret, timestamp, body)?;
    mac.verify_slice(&expected)
        .map_err(|_| SignatureError::Mismatch)
}

/// Compute the `X-Slack-Signature` value for a request. Used by tests and local tooling.
pub fn sign(signing_secret: &str, timestamp: &str, body: &[u8]) -> String {
    match mac_for(signing_secret, timestamp, body) {
        Ok(mac) => format!("{}{}", VERSION_PREFIX, hex::encode(mac.finalize().into_bytes())),
        Err(_) => String::new(),
    }
}

fn mac_for(signing_secret: &str, timestamp: &str, body: &[u8]) -> Result<HmacSha256, SignatureError> {
    let mut mac = HmacSha256::new_from_slice(signing_secret.as_bytes())
        .map_err(|_| SignatureError::Malformed)?;
    mac.update(b"v0:");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(body);
    Ok(mac)
}
