// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the site gate service.
//!
//! Defaults reproduce the per-endpoint quotas the site has always used;
//! every value can be overridden from the environment.

use crate::limiter::WindowPolicy;
use crate::policy::{Endpoint, PolicyConfig};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_VERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

/// Configuration for the site gate service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Per-endpoint rate limit policies
    #[serde(default)]
    pub policies: PolicyConfig,

    /// Expired-window sweep configuration
    #[serde(default)]
    pub sweep: SweepConfig,

    /// CAPTCHA verification configuration
    #[serde(default)]
    pub captcha: CaptchaConfig,

    /// Comment moderation configuration
    #[serde(default)]
    pub comments: CommentsConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Optional JSON seed file with posts and products
    #[serde(default)]
    pub seed_path: Option<String>,
}

/// Sweep configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Seconds between sweeps (default: 300)
    #[serde(default = "default_sweep_interval_secs")]
    pub interval_secs: u64,
}

/// CAPTCHA verification configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct CaptchaConfig {
    /// Verification secret; CAPTCHA is unconfigured without it
    #[serde(default)]
    pub secret_key: Option<String>,

    /// Verification endpoint
    #[serde(default = "default_verify_url")]
    pub verify_url: String,

    /// Accept any token while unconfigured (development only, default: false)
    #[serde(default)]
    pub skip_when_unconfigured: bool,
}

// Keeps the secret out of logs
impl std::fmt::Debug for CaptchaConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptchaConfig")
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .field("verify_url", &self.verify_url)
            .field("skip_when_unconfigured", &self.skip_when_unconfigured)
            .finish()
    }
}

/// Comment moderation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentsConfig {
    /// Publish new comments immediately (default: true)
    #[serde(default = "default_true")]
    pub auto_approve: bool,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

/// Invalid configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid bind address {addr}: {reason}")]
    InvalidBindAddr { addr: String, reason: String },

    #[error("Policy for {endpoint} must admit at least one request per window of 1 to i64::MAX ms")]
    InvalidPolicy { endpoint: Endpoint },

    #[error("Sweep interval must be greater than zero")]
    ZeroSweepInterval,

    #[error("Invalid CAPTCHA verify URL {url}: {reason}")]
    InvalidVerifyUrl { url: String, reason: String },

    #[error("Metrics path must start with '/': {0}")]
    InvalidMetricsPath(String),
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_sweep_interval_secs() -> u64 {
    300
}

fn default_verify_url() -> String {
    DEFAULT_VERIFY_URL.to_string()
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            policies: PolicyConfig::default(),
            sweep: SweepConfig::default(),
            captcha: CaptchaConfig::default(),
            comments: CommentsConfig::default(),
            metrics: MetricsConfig::default(),
            seed_path: None,
        }
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl Default for CaptchaConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            verify_url: default_verify_url(),
            skip_when_unconfigured: false,
        }
    }
}

impl Default for CommentsConfig {
    fn default() -> Self {
        Self {
            auto_approve: default_true(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl SweepConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Config {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, falling back to defaults for
    /// missing or unparseable values.
    ///
    /// Recognised keys: `BIND_ADDR`, `{CONTACT,INTEREST,COMMENT,LIKE}_MAX_REQUESTS`,
    /// `{CONTACT,INTEREST,COMMENT,LIKE}_WINDOW_MS`, `SWEEP_INTERVAL_SECS`,
    /// `RECAPTCHA_SECRET_KEY`, `RECAPTCHA_VERIFY_URL`, `CAPTCHA_SKIP_UNCONFIGURED`,
    /// `COMMENTS_AUTO_APPROVE`, `METRICS_ENABLED`, `METRICS_PATH`, `SEED_PATH`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut config = Config::default();

        if let Some(addr) = non_empty("BIND_ADDR") {
            config.bind_addr = addr;
        }

        for endpoint in Endpoint::ALL {
            let prefix = env_prefix(endpoint);
            let policy = config.policies.for_endpoint_mut(endpoint);
            if let Some(max) = parse_var(&lookup, &format!("{prefix}_MAX_REQUESTS")) {
                policy.max_requests = max;
            }
            if let Some(window) = parse_var(&lookup, &format!("{prefix}_WINDOW_MS")) {
                policy.window_ms = window;
            }
        }

        if let Some(secs) = parse_var(&lookup, "SWEEP_INTERVAL_SECS") {
            config.sweep.interval_secs = secs;
        }

        config.captcha.secret_key = non_empty("RECAPTCHA_SECRET_KEY");
        if let Some(url) = non_empty("RECAPTCHA_VERIFY_URL") {
            config.captcha.verify_url = url;
        }
        if let Some(skip) = parse_var(&lookup, "CAPTCHA_SKIP_UNCONFIGURED") {
            config.captcha.skip_when_unconfigured = skip;
        }

        if let Some(auto_approve) = parse_var(&lookup, "COMMENTS_AUTO_APPROVE") {
            config.comments.auto_approve = auto_approve;
        }

        if let Some(enabled) = parse_var(&lookup, "METRICS_ENABLED") {
            config.metrics.enabled = enabled;
        }
        if let Some(path) = non_empty("METRICS_PATH") {
            config.metrics.path = path;
        }

        config.seed_path = non_empty("SEED_PATH");

        config
    }

    /// Check the configuration for values the service cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidBindAddr {
                addr: self.bind_addr.clone(),
                reason: e.to_string(),
            })?;

        for endpoint in Endpoint::ALL {
            let WindowPolicy {
                max_requests,
                window_ms,
            } = *self.policies.for_endpoint(endpoint);
            if max_requests == 0 || window_ms == 0 || i64::try_from(window_ms).is_err() {
                return Err(ConfigError::InvalidPolicy { endpoint });
            }
        }

        if self.sweep.interval_secs == 0 {
            return Err(ConfigError::ZeroSweepInterval);
        }

        let verify_url =
            url::Url::parse(&self.captcha.verify_url).map_err(|e| ConfigError::InvalidVerifyUrl {
                url: self.captcha.verify_url.clone(),
                reason: e.to_string(),
            })?;
        if !matches!(verify_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidVerifyUrl {
                url: self.captcha.verify_url.clone(),
                reason: "scheme must be http or https".to_string(),
            });
        }

        if !self.metrics.path.starts_with('/') {
            return Err(ConfigError::InvalidMetricsPath(self.metrics.path.clone()));
        }

        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|v| v.trim().parse().ok())
}

fn env_prefix(endpoint: Endpoint) -> &'static str {
    match endpoint {
        Endpoint::Contact => "CONTACT",
        Endpoint::ProductInterest => "INTEREST",
        Endpoint::Comment => "COMMENT",
        Endpoint::Like => "LIKE",
    }
}
