// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! CAPTCHA token verification.
//!
//! Tokens are checked against a reCAPTCHA-compatible `siteverify` endpoint.
//! Any transport or decoding failure counts as a failed verification.

use crate::config::CaptchaConfig;
use serde::Deserialize;
use std::time::Duration;
use tracing::{error, warn};

const VERIFY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    #[serde(default)]
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

enum Mode {
    Remote {
        client: reqwest::Client,
        secret: String,
        verify_url: String,
    },
    Unconfigured {
        accept: bool,
    },
    Fixed(bool),
}

/// CAPTCHA verifier.
pub struct CaptchaVerifier {
    mode: Mode,
}

impl CaptchaVerifier {
    /// Create a verifier from configuration.
    pub fn new(config: &CaptchaConfig) -> Self {
        let mode = match &config.secret_key {
            Some(secret) => Mode::Remote {
                client: reqwest::Client::new(),
                secret: secret.clone(),
                verify_url: config.verify_url.clone(),
            },
            None => Mode::Unconfigured {
                accept: config.skip_when_unconfigured,
            },
        };
        Self { mode }
    }

    /// Verifier that always answers `accept`, counted as configured.
    pub fn fixed(accept: bool) -> Self {
        Self {
            mode: Mode::Fixed(accept),
        }
    }

    /// Whether a verification secret is present.
    pub fn is_configured(&self) -> bool {
        !matches!(self.mode, Mode::Unconfigured { .. })
    }

    /// Verify a client token.
    pub async fn verify(&self, token: &str) -> bool {
        match &self.mode {
            Mode::Fixed(accept) => *accept,
            Mode::Unconfigured { accept } => {
                if *accept {
                    warn!("CAPTCHA secret not set, skipping verification");
                } else {
                    warn!("CAPTCHA secret not set, rejecting token");
                }
                *accept
            }
            Mode::Remote {
                client,
                secret,
                verify_url,
            } => match Self::verify_remote(client, verify_url, secret, token).await {
                Ok(response) => {
                    if !response.success {
                        warn!(error_codes = ?response.error_codes, "CAPTCHA token rejected");
                    }
                    response.success
                }
                Err(e) => {
                    error!(error = %e, "CAPTCHA verification error");
                    false
                }
            },
        }
    }

    async fn verify_remote(
        client: &reqwest::Client,
        verify_url: &str,
        secret: &str,
        token: &str,
    ) -> Result<VerifyResponse, reqwest::Error> {
        client
            .post(verify_url)
            .timeout(VERIFY_TIMEOUT)
            .form(&[("secret", secret), ("response", token)])
            .send()
            .await?
            .error_for_status()?
            .json::<VerifyResponse>()
            .await
    }
}
