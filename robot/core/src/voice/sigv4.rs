//! AWS Signature Version 4 for JSON POST requests
//!
//! Only what the speech endpoint needs: a POST with no query string, a JSON
//! body and the `content-type`, `host`, `x-amz-date` (and optional
//! `x-amz-security-token`) headers.

use chrono::{DateTime, Utc};
use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::config::AwsCredentials;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// A request about to be signed
pub struct SigningRequest<'a> {
    /// Host header value
    pub host: &'a str,
    /// Absolute path, already URI-encoded
    pub path: &'a str,
    /// Region the service lives in
    pub region: &'a str,
    /// Service signing name
    pub service: &'a str,
    /// Exact request body bytes
    pub payload: &'a [u8],
    /// Signing time
    pub timestamp: DateTime<Utc>,
}

/// Headers to attach to the signed request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedHeaders {
    /// `Authorization` header value
    pub authorization: String,
    /// `x-amz-date` header value
    pub amz_date: String,
    /// `x-amz-security-token` header value, for temporary credentials
    pub security_token: Option<String>,
}

/// Lowercase hex SHA-256 of `data`
#[must_use]
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(key)?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Derive the per-day signing key
///
/// # Errors
///
/// Only if the HMAC implementation rejects a key length, which SHA-256
/// HMAC never does.
pub fn signing_key(
    secret: &str,
    date: &str,
    region: &str,
    service: &str,
) -> Result<Vec<u8>, InvalidLength> {
    let k_date = hmac_sha256(format!("AWS4{secret}").as_bytes(), date.as_bytes())?;
    let k_region = hmac_sha256(&k_date, region.as_bytes())?;
    let k_service = hmac_sha256(&k_region, service.as_bytes())?;
    hmac_sha256(&k_service, b"aws4_request")
}

/// Sign a JSON POST request
///
/// # Errors
///
/// See [`signing_key`].
pub fn sign_post(
    request: &SigningRequest<'_>,
    credentials: &AwsCredentials,
) -> Result<SignedHeaders, InvalidLength> {
    let amz_date = request.timestamp.format("%Y%m%dT%H%M%SZ").to_string();
    let date = request.timestamp.format("%Y%m%d").to_string();

    let mut headers = vec![
        ("content-type", "application/json".to_string()),
        ("host", request.host.to_string()),
        ("x-amz-date", amz_date.clone()),
    ];
    if let Some(ref token) = credentials.session_token {
        headers.push(("x-amz-security-token", token.clone()));
    }

    let canonical_headers: String = headers
        .iter()
        .map(|(name, value)| format!("{name}:{}\n", value.trim()))
        .collect();
    let signed_headers = headers
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(";");

    let canonical_request = format!(
        "POST\n{}\n\n{canonical_headers}\n{signed_headers}\n{}",
        request.path,
        sha256_hex(request.payload)
    );

    let scope = format!(
        "{date}/{}/{}/aws4_request",
        request.region, request.service
    );
    let string_to_sign = format!(
        "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
        sha256_hex(canonical_request.as_bytes())
    );

    let key = signing_key(
        &credentials.secret_access_key,
        &date,
        request.region,
        request.service,
    )?;
    let signature = hex::encode(hmac_sha256(&key, string_to_sign.as_bytes())?);

    Ok(SignedHeaders {
        authorization: format!(
            "{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
            credentials.access_key_id
        ),
        amz_date,
        security_token: credentials.session_token.clone(),
    })
}
