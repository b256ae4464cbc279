// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus metrics for the gate.

use crate::policy::Endpoint;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// Metrics owned by one service instance.
pub struct GateMetrics {
    registry: Registry,
    requests: IntCounterVec,
    entries: IntGauge,
    swept: IntCounter,
}

impl GateMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests = IntCounterVec::new(
            Opts::new(
                "site_gate_requests_total",
                "Gated write requests by endpoint and outcome",
            ),
            &["endpoint", "outcome"],
        )?;
        let entries = IntGauge::new(
            "site_gate_limiter_entries",
            "Rate limit windows currently tracked",
        )?;
        let swept = IntCounter::new(
            "site_gate_swept_entries_total",
            "Expired rate limit windows removed by the sweeper",
        )?;

        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(entries.clone()))?;
        registry.register(Box::new(swept.clone()))?;

        Ok(Self {
            registry,
            requests,
            entries,
            swept,
        })
    }

    /// Count a gate decision.
    pub fn record_decision(&self, endpoint: Endpoint, allowed: bool) {
        let outcome = if allowed { "admitted" } else { "limited" };
        self.requests
            .with_label_values(&[endpoint.namespace(), outcome])
            .inc();
    }

    pub fn record_sweep(&self, removed: usize, remaining: usize) {
        self.swept.inc_by(removed as u64);
        self.entries.set(remaining as i64);
    }

    pub fn set_entries(&self, count: usize) {
        self.entries.set(count as i64);
    }

    pub fn requests(&self, endpoint: Endpoint, allowed: bool) -> u64 {
        let outcome = if allowed { "admitted" } else { "limited" };
        self.requests
            .with_label_values(&[endpoint.namespace(), outcome])
            .get()
    }

    pub fn entries(&self) -> i64 {
        self.entries.get()
    }

    pub fn swept_total(&self) -> u64 {
        self.swept.get()
    }

    /// Render all metrics in the Prometheus text format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
