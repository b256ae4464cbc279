// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Request header generators for abuse simulation.

use axum::http::{HeaderMap, HeaderValue};
use std::net::{IpAddr, Ipv4Addr};

/// Generate a pool of client addresses.
pub fn generate_ips(count: usize) -> Vec<IpAddr> {
    (0..count)
        .map(|i| {
            // Use 10.x.x.x private range
            let a = ((i >> 16) & 0xFF) as u8;
            let b = ((i >> 8) & 0xFF) as u8;
            let c = (i & 0xFF) as u8;
            IpAddr::V4(Ipv4Addr::new(10, a, b, c))
        })
        .collect()
}

/// Headers as seen behind a proxy that appends its own hop.
pub fn forwarded_headers(client: IpAddr) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let value = format!("{client}, 70.41.3.18");
    if let Ok(value) = HeaderValue::from_str(&value) {
        headers.insert("x-forwarded-for", value);
    }
    headers
}

/// Headers carrying only `X-Real-IP`.
pub fn real_ip_headers(client: IpAddr) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&client.to_string()) {
        headers.insert("x-real-ip", value);
    }
    headers
}

/// Header sets that carry no usable address.
pub fn anonymous_header_sets() -> Vec<HeaderMap> {
    let mut sets = vec![HeaderMap::new()];

    let mut empty_forwarded = HeaderMap::new();
    empty_forwarded.insert("x-forwarded-for", HeaderValue::from_static(""));
    sets.push(empty_forwarded);

    let mut blank_real_ip = HeaderMap::new();
    blank_real_ip.insert("x-real-ip", HeaderValue::from_static("   "));
    sets.push(blank_real_ip);

    let mut only_commas = HeaderMap::new();
    only_commas.insert("x-forwarded-for", HeaderValue::from_static(" , "));
    sets.push(only_commas);

    sets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_ips() {
        let ips = generate_ips(256);
        assert_eq!(ips.len(), 256);
        let unique: std::collections::HashSet<_> = ips.iter().collect();
        assert_eq!(unique.len(), 256);
    }

    #[test]
    fn test_forwarded_headers() {
        let headers = forwarded_headers("10.0.0.1".parse().unwrap());
        assert_eq!(headers["x-forwarded-for"], "10.0.0.1, 70.41.3.18");
    }
}
