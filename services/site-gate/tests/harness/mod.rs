// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test harness for gate abuse simulation.
//!
//! Drives the limiter and identity derivation with synthetic traffic and
//! tallies what got through.

pub mod attacks;
pub mod generators;
pub mod metrics;
