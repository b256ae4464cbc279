// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Client identity derivation.
//!
//! Two values are derived from the request headers:
//!
//! - a short rate-limit identifier: the originating address from
//!   `X-Forwarded-For` / `X-Real-IP`, base64 encoded and truncated. This is
//!   obfuscation only, the encoding is reversible.
//! - a hashed identifier stored on likes and comments: a truncated SHA-256
//!   digest of the rate-limit identifier, so network addresses never reach
//!   the store.
//!
//! Neither header is authenticated; both are spoofable by the client.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts, http::HeaderMap};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha256};
use std::convert::Infallible;

pub const FORWARDED_FOR: &str = "x-forwarded-for";
pub const REAL_IP: &str = "x-real-ip";

/// Sentinel used when no address header is present.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Length of the encoded rate-limit identifier.
pub const CLIENT_ID_LEN: usize = 20;

/// Length of the stored hex digest prefix.
pub const HASHED_ID_LEN: usize = 32;

/// Extract the originating client address from proxy headers.
///
/// Takes the first hop of `X-Forwarded-For`, then `X-Real-IP`, then the
/// `"unknown"` sentinel.
pub fn originating_address(headers: &HeaderMap) -> &str {
    let forwarded = headers
        .get(FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let real_ip = || {
        headers
            .get(REAL_IP)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    forwarded.or_else(real_ip).unwrap_or(UNKNOWN_CLIENT)
}

/// Derive the rate-limit identifier for a request.
pub fn client_identifier(headers: &HeaderMap) -> String {
    let mut encoded = STANDARD.encode(originating_address(headers));
    // base64 output is ASCII, so byte truncation is char-safe
    encoded.truncate(CLIENT_ID_LEN);
    encoded
}

/// One-way digest of a client identifier for persisted records.
pub fn hash_identifier(identifier: &str) -> String {
    let digest = Sha256::digest(identifier.as_bytes());
    let mut hashed = hex::encode(digest);
    hashed.truncate(HASHED_ID_LEN);
    hashed
}

/// Identity of the caller, computed once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    /// Rate-limit identifier (namespaced by the caller before use).
    pub key: String,
    /// Hashed identifier stored on likes and comments.
    pub hashed: String,
}

impl ClientIdentity {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let key = client_identifier(headers);
        let hashed = hash_identifier(&key);
        Self { key, hashed }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ClientIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}
