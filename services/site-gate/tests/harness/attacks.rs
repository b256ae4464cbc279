// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Abuse patterns for simulation.

/// Attack pattern configuration.
#[derive(Debug, Clone)]
pub struct AttackConfig {
    /// Total number of requests to send
    pub total_requests: usize,
    /// Number of distinct client addresses
    pub unique_clients: usize,
    /// Simulated milliseconds between requests
    pub spacing_ms: i64,
}

impl AttackConfig {
    /// One client hammering an endpoint.
    pub fn single_client_flood() -> Self {
        Self {
            total_requests: 200,
            unique_clients: 1,
            spacing_ms: 10,
        }
    }

    /// Rotating spoofed `X-Forwarded-For` values.
    pub fn spoofed_rotation() -> Self {
        Self {
            total_requests: 500,
            unique_clients: 250,
            spacing_ms: 1,
        }
    }

    /// One request every 7 seconds: under 10 per minute.
    pub fn slow_drip() -> Self {
        Self {
            total_requests: 60,
            unique_clients: 1,
            spacing_ms: 7_000,
        }
    }
}
