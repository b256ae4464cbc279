// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Site Gate
//!
//! Abuse mitigation for the product site's public write endpoints
//! (contact form, product interest, blog comments, blog likes):
//!
//! - Client identity from `X-Forwarded-For` / `X-Real-IP`
//! - Hashed identifiers for stored likes and comments
//! - Fixed-window rate limiting per endpoint class
//! - Scheduled sweep of expired windows
//! - CAPTCHA verification

pub mod captcha;
pub mod clock;
pub mod config;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod limiter;
pub mod metrics;
pub mod models;
pub mod policy;
pub mod store;
pub mod sweeper;
pub mod validator;

pub use config::Config;
pub use identity::{client_identifier, hash_identifier, ClientIdentity};
pub use limiter::{FixedWindowLimiter, RateLimitDecision, WindowPolicy};
pub use policy::Endpoint;
pub use sweeper::Sweeper;
