// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Per-endpoint rate-limit policies.
//!
//! Every gated endpoint namespaces the client identifier with its own
//! prefix, so quotas never collide across endpoint classes.

use crate::limiter::WindowPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Public write endpoints that pass through the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Contact,
    ProductInterest,
    Comment,
    Like,
}

impl Endpoint {
    pub const ALL: [Endpoint; 4] = [
        Endpoint::Contact,
        Endpoint::ProductInterest,
        Endpoint::Comment,
        Endpoint::Like,
    ];

    /// Key prefix for this endpoint.
    pub fn namespace(self) -> &'static str {
        match self {
            Self::Contact => "contact",
            Self::ProductInterest => "interest",
            Self::Comment => "comment",
            Self::Like => "like",
        }
    }

    /// Limiter key for a client identifier.
    pub fn key(self, identifier: &str) -> String {
        format!("{}:{}", self.namespace(), identifier)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.namespace())
    }
}

/// Window policies per endpoint class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Contact form submissions (default: 3 per hour)
    #[serde(default = "default_contact")]
    pub contact: WindowPolicy,

    /// Product interest submissions (default: 3 per hour)
    #[serde(default = "default_interest")]
    pub interest: WindowPolicy,

    /// Blog comments (default: 5 per minute)
    #[serde(default = "default_comment")]
    pub comment: WindowPolicy,

    /// Like toggles (default: 10 per minute)
    #[serde(default = "default_like")]
    pub like: WindowPolicy,
}

fn default_contact() -> WindowPolicy {
    WindowPolicy::per_hour(3)
}

fn default_interest() -> WindowPolicy {
    WindowPolicy::per_hour(3)
}

fn default_comment() -> WindowPolicy {
    WindowPolicy::per_minute(5)
}

fn default_like() -> WindowPolicy {
    WindowPolicy::per_minute(10)
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            contact: default_contact(),
            interest: default_interest(),
            comment: default_comment(),
            like: default_like(),
        }
    }
}

impl PolicyConfig {
    pub fn for_endpoint(&self, endpoint: Endpoint) -> &WindowPolicy {
        match endpoint {
            Endpoint::Contact => &self.contact,
            Endpoint::ProductInterest => &self.interest,
            Endpoint::Comment => &self.comment,
            Endpoint::Like => &self.like,
        }
    }

    pub fn for_endpoint_mut(&mut self, endpoint: Endpoint) -> &mut WindowPolicy {
        match endpoint {
            Endpoint::Contact => &mut self.contact,
            Endpoint::ProductInterest => &mut self.interest,
            Endpoint::Comment => &mut self.comment,
            Endpoint::Like => &mut self.like,
        }
    }
}
