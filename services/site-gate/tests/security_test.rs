// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Abuse simulations for the gate.
//!
//! These tests replay hostile traffic patterns through identity derivation
//! and the fixed-window limiter on a manual clock, then check what got
//! through.

mod harness;

use axum::http::HeaderMap;
use harness::{
    attacks::AttackConfig,
    generators,
    metrics::{AttackMetrics, Outcome},
};
use site_gate::{
    clock::ManualClock, policy::PolicyConfig, ClientIdentity, Endpoint, FixedWindowLimiter,
    WindowPolicy,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

const START_MS: i64 = 1_700_000_000_000;

fn limiter() -> (FixedWindowLimiter, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(START_MS));
    (FixedWindowLimiter::new(clock.clone()), clock)
}

/// Replay an attack against one endpoint class.
fn run_attack(
    config: &AttackConfig,
    limiter: &FixedWindowLimiter,
    clock: &ManualClock,
    endpoint: Endpoint,
    policy: &WindowPolicy,
) -> AttackMetrics {
    let ips = generators::generate_ips(config.unique_clients);
    let mut metrics = AttackMetrics::new();

    for i in 0..config.total_requests {
        let headers = generators::forwarded_headers(ips[i % ips.len()]);
        let identity = ClientIdentity::from_headers(&headers);

        let decision = limiter.check(&endpoint.key(&identity.key), policy);
        let outcome = if decision.allowed {
            Outcome::Allowed
        } else {
            Outcome::RateLimited
        };
        metrics.record(outcome, &identity.key);

        clock.advance(config.spacing_ms);
    }

    metrics
}

#[test]
fn test_single_client_flood() {
    let (limiter, clock) = limiter();
    let policies = PolicyConfig::default();

    let config = AttackConfig::single_client_flood();
    let metrics = run_attack(&config, &limiter, &clock, Endpoint::Like, &policies.like);

    println!("{metrics}");

    assert_eq!(metrics.count(Outcome::Allowed), 10);
    assert_eq!(metrics.count(Outcome::RateLimited), 190);
    assert!(metrics.block_rate() > 0.9);
}

#[test]
fn test_spoofed_forwarded_for_rotation() {
    let (limiter, clock) = limiter();
    let policies = PolicyConfig::default();

    let config = AttackConfig::spoofed_rotation();
    let metrics = run_attack(&config, &limiter, &clock, Endpoint::Like, &policies.like);

    println!("{metrics}");

    // Each forged address gets its own window; the header is trusted as given
    assert_eq!(metrics.unique_clients(), 250);
    assert_eq!(metrics.count(Outcome::RateLimited), 0);
    assert_eq!(metrics.max_allowed_per_client(), 2);
    assert_eq!(limiter.len(), 250);

    // Memory held by forged keys is reclaimed once their windows close
    clock.advance(policies.like.window_ms as i64);
    assert_eq!(limiter.sweep(), 250);
    assert!(limiter.is_empty());
}

#[test]
fn test_slow_drip_allowed() {
    let (limiter, clock) = limiter();
    let policies = PolicyConfig::default();

    let config = AttackConfig::slow_drip();
    let metrics = run_attack(&config, &limiter, &clock, Endpoint::Like, &policies.like);

    println!("{metrics}");

    // Under 10 per minute never trips the limiter
    assert_eq!(metrics.count(Outcome::RateLimited), 0);
}

#[test]
fn test_window_boundary_burst() {
    let (limiter, clock) = limiter();
    let policy = PolicyConfig::default().like;
    let key = Endpoint::Like.key("burst");

    assert!(limiter.check(&key, &policy).allowed);
    clock.advance(policy.window_ms as i64 - 1);

    let mut allowed = 1;
    for _ in 0..20 {
        if limiter.check(&key, &policy).allowed {
            allowed += 1;
        }
    }
    assert_eq!(allowed, 10);

    clock.advance(2);
    for _ in 0..20 {
        if limiter.check(&key, &policy).allowed {
            allowed += 1;
        }
    }

    // Fixed windows admit up to twice the quota across a boundary
    assert_eq!(allowed, 20);
}

#[test]
fn test_headerless_clients_share_one_quota() {
    let (limiter, _clock) = limiter();
    let policy = PolicyConfig::default().contact;
    let mut metrics = AttackMetrics::new();

    for headers in generators::anonymous_header_sets() {
        for _ in 0..5 {
            let identity = ClientIdentity::from_headers(&headers);
            let decision = limiter.check(&Endpoint::Contact.key(&identity.key), &policy);
            let outcome = if decision.allowed {
                Outcome::Allowed
            } else {
                Outcome::RateLimited
            };
            metrics.record(outcome, &identity.key);
        }
    }

    assert_eq!(metrics.unique_clients(), 1);
    assert_eq!(metrics.count(Outcome::Allowed), 3);
    assert_eq!(metrics.count(Outcome::RateLimited), 17);
}

#[test]
fn test_real_ip_and_forwarded_for_agree() {
    let ip = "192.0.2.44".parse().unwrap();
    let forwarded = ClientIdentity::from_headers(&generators::forwarded_headers(ip));
    let real_ip = ClientIdentity::from_headers(&generators::real_ip_headers(ip));
    assert_eq!(forwarded, real_ip);
}

#[test]
fn test_long_ipv6_prefix_collision() {
    let (limiter, _clock) = limiter();
    let policy = PolicyConfig::default().contact;

    // Identifiers keep only 20 encoded chars (15 address bytes)
    let mut a = HeaderMap::new();
    a.insert(
        "x-forwarded-for",
        "2001:db8:85a3::8a2e:370:7334".parse().unwrap(),
    );
    let mut b = HeaderMap::new();
    b.insert("x-forwarded-for", "2001:db8:85a3::1".parse().unwrap());

    let a = ClientIdentity::from_headers(&a);
    let b = ClientIdentity::from_headers(&b);
    assert_eq!(a.key, b.key);

    for _ in 0..3 {
        assert!(limiter.check(&Endpoint::Contact.key(&a.key), &policy).allowed);
    }
    assert!(!limiter.check(&Endpoint::Contact.key(&b.key), &policy).allowed);
}

#[test]
fn test_endpoint_quotas_isolated_under_flood() {
    let (limiter, clock) = limiter();
    let policies = PolicyConfig::default();

    let config = AttackConfig::single_client_flood();
    run_attack(&config, &limiter, &clock, Endpoint::Comment, &policies.comment);

    // A comment flood leaves the same client's like quota untouched
    let identity = ClientIdentity::from_headers(&generators::forwarded_headers(
        generators::generate_ips(1)[0],
    ));
    let decision = limiter.check(&Endpoint::Like.key(&identity.key), &policies.like);
    assert!(decision.allowed);
    assert_eq!(decision.remaining, 9);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_flood_never_over_admits() {
    let (limiter, _clock) = limiter();
    let policy = PolicyConfig::default().like;

    let mut tasks = Vec::new();
    for _ in 0..200 {
        let limiter = limiter.clone();
        tasks.push(tokio::spawn(async move {
            limiter.check("like:flood", &policy).allowed
        }));
    }

    let mut allowed = 0;
    for task in tasks {
        if task.await.unwrap() {
            allowed += 1;
        }
    }

    assert_eq!(allowed, 10);
}

#[test]
fn test_limiter_latency() {
    let (limiter, _clock) = limiter();
    let policy = WindowPolicy::per_minute(1_000);
    let ips = generators::generate_ips(1_000);

    let iterations = 10_000;
    let start = Instant::now();

    for i in 0..iterations {
        let identity = ClientIdentity::from_headers(&generators::forwarded_headers(ips[i % ips.len()]));
        let _ = limiter.check(&Endpoint::Comment.key(&identity.key), &policy);
    }

    let elapsed = start.elapsed();
    let avg = elapsed / iterations as u32;

    println!("Average identity + limiter latency: {avg:?}");

    // Should be under 100 microseconds per check
    assert!(
        avg < Duration::from_micros(100),
        "Gate too slow: {avg:?}"
    );
}
