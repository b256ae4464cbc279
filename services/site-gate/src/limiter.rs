// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-window rate limiter for the public write endpoints.
//!
//! Each key owns at most one window. The first request opens a window of
//! `window_ms`; requests inside it are counted until `max_requests`, after
//! which they are rejected without touching the entry. Once the window's
//! reset time has passed the next request opens a fresh one; a request
//! landing exactly on the reset time still counts against the old window.
//!
//! Windows are fixed, not sliding: a burst straddling a window boundary can
//! see up to `2 * max_requests` admissions in a short span.
//!
//! The table lives in process memory. Restarts reset it and separate
//! instances keep separate tables.

use crate::clock::Clock;
use dashmap::{mapref::entry::Entry, DashMap};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Request budget for one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowPolicy {
    /// Requests admitted per window
    pub max_requests: u32,
    /// Window length in milliseconds
    pub window_ms: u64,
}

impl WindowPolicy {
    pub const fn new(max_requests: u32, window_ms: u64) -> Self {
        Self {
            max_requests,
            window_ms,
        }
    }

    pub const fn per_minute(max_requests: u32) -> Self {
        Self::new(max_requests, 60 * 1000)
    }

    pub const fn per_hour(max_requests: u32) -> Self {
        Self::new(max_requests, 60 * 60 * 1000)
    }
}

impl Default for WindowPolicy {
    fn default() -> Self {
        Self::per_minute(5)
    }
}

/// Outcome of a limiter check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// Requests left in the current window
    pub remaining: u32,
    /// Epoch milliseconds at which the window closes
    pub reset_time: i64,
}

impl RateLimitDecision {
    /// Seconds until the window closes, rounded up, at least 1.
    pub fn retry_after_secs(&self, now_ms: i64) -> u64 {
        let remaining_ms = (self.reset_time - now_ms).max(0) as u64;
        remaining_ms.div_ceil(1000).max(1)
    }
}

/// Counter for one key.
#[derive(Debug, Clone, Copy)]
struct RateLimitEntry {
    count: u32,
    reset_time: i64,
}

impl RateLimitEntry {
    fn open(now_ms: i64, policy: &WindowPolicy) -> Self {
        let window_ms = i64::try_from(policy.window_ms).unwrap_or(i64::MAX);
        Self {
            count: 1,
            reset_time: now_ms.saturating_add(window_ms),
        }
    }

    fn is_expired(&self, now_ms: i64) -> bool {
        self.reset_time < now_ms
    }
}

/// Thread-safe fixed-window rate limiter.
///
/// Cheap to clone; clones share the same table.
#[derive(Clone)]
pub struct FixedWindowLimiter {
    entries: Arc<DashMap<String, RateLimitEntry>>,
    clock: Arc<dyn Clock>,
}

impl FixedWindowLimiter {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            clock,
        }
    }

    /// Current time according to the limiter's clock.
    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Count a request against `key` and decide whether it is admitted.
    ///
    /// The check and the increment happen under the key's shard lock, so
    /// concurrent callers never over-admit.
    pub fn check(&self, key: &str, policy: &WindowPolicy) -> RateLimitDecision {
        let now = self.clock.now_ms();

        match self.entries.entry(key.to_string()) {
            Entry::Vacant(vacant) => {
                let entry = vacant.insert(RateLimitEntry::open(now, policy));
                Self::admitted(policy, entry.count, entry.reset_time)
            }
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();

                if entry.is_expired(now) {
                    *entry = RateLimitEntry::open(now, policy);
                    return Self::admitted(policy, entry.count, entry.reset_time);
                }

                if entry.count >= policy.max_requests {
                    debug!(reset_time = entry.reset_time, "Window exhausted");
                    return RateLimitDecision {
                        allowed: false,
                        remaining: 0,
                        reset_time: entry.reset_time,
                    };
                }

                entry.count += 1;
                Self::admitted(policy, entry.count, entry.reset_time)
            }
        }
    }

    fn admitted(policy: &WindowPolicy, count: u32, reset_time: i64) -> RateLimitDecision {
        RateLimitDecision {
            allowed: true,
            remaining: policy.max_requests.saturating_sub(count),
            reset_time,
        }
    }

    /// Drop every entry whose window has closed. Returns the number removed.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now_ms();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.entries.len())
    }

    /// Number of tracked keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
