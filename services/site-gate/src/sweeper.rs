// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Background sweep of expired rate-limit windows.
//!
//! The sweep only bounds memory; request admission never depends on it.

use crate::limiter::FixedWindowLimiter;
use crate::metrics::GateMetrics;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Handle to a running sweep task.
pub struct Sweeper {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Sweeper {
    /// Spawn the sweep loop on the current runtime.
    pub fn start(
        limiter: FixedWindowLimiter,
        metrics: Option<Arc<GateMetrics>>,
        every: Duration,
    ) -> Self {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            info!(interval_secs = every.as_secs(), "Rate limit sweeper started");

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let removed = limiter.sweep();
                        let remaining = limiter.len();
                        if removed > 0 {
                            debug!(removed, remaining, "Swept expired rate limit entries");
                        }
                        if let Some(metrics) = &metrics {
                            metrics.record_sweep(removed, remaining);
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        // A dropped sender also ends the loop
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("Rate limit sweeper stopped");
        });

        Self {
            shutdown_tx,
            handle,
        }
    }

    /// Signal the loop to exit and wait for it.
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.handle.await;
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}
