//! Service key derivation and work-factor calibration.
//!
//! This module provides:
//! - [`compute_hashed_key`]: master password + service identity to hashed key
//! - [`benchmark_iterations`]: how many hash iterations fit in a latency budget
//!
//! # Derivation chain
//!
//! ```text
//! service_nonce = raw(service_name) ‖ [0, nonce]
//! initial_key   = HMAC(raw(master_password), service_nonce)
//! hashed_key    = H^iterations(initial_key)
//! ```
//!
//! Every intermediate lives in a [`SecretWords`] and is zeroed when dropped,
//! whichever way the function returns.

use std::time::{Duration, Instant};

use crate::error::CryptoError;
use crate::hash::CryptoHash;
use crate::hmac::Mac;
use crate::memory::SecretWords;
use crate::words::raw_encode;

/// Latency budget used when none has been configured.
pub const DEFAULT_ACCEPTABLE_LATENCY: Duration = Duration::from_millis(50);

/// Service name used for calibration. Long, to measure a worst case.
pub const BENCHMARK_SERVICE_NAME: &str =
    "This dummy service name is voluntarily very long, as a worst-case scenario.";

/// Master password used for calibration.
pub const BENCHMARK_MASTER_PASSWORD: &str =
    "The same goes for this dummy master password ! 0123456789ABCDEFGHIJKLMNOP";

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// `HMAC(raw(master_password), raw(service_name) ‖ [0, nonce])`.
///
/// # Errors
///
/// Propagates allocation and MAC failures.
pub fn compute_initial_key(
    master_password: &str,
    service_name: &str,
    nonce: u64,
    hash: &dyn CryptoHash,
    mac: &dyn Mac,
) -> Result<SecretWords, CryptoError> {
    let name = raw_encode(service_name)?;
    let service_nonce = SecretWords::concat(&[name.expose(), &[0, nonce]])?;
    drop(name);
    let master = raw_encode(master_password)?;
    mac.mac(master.expose(), service_nonce.expose(), hash)
}

/// Derive the hashed key of one service.
///
/// The initial key is rehashed `iterations` times. With zero iterations
/// the hashed key is the initial key.
///
/// # Errors
///
/// Propagates allocation, MAC and hash failures. Nothing derived so far
/// survives a failure.
pub fn compute_hashed_key(
    master_password: &str,
    service_name: &str,
    nonce: u64,
    hash: &dyn CryptoHash,
    mac: &dyn Mac,
    iterations: u64,
) -> Result<SecretWords, CryptoError> {
    let mut key = compute_initial_key(master_password, service_name, nonce, hash, mac)?;
    for _ in 0..iterations {
        hash.rehash(&mut key)?;
    }
    Ok(key)
}

// ---------------------------------------------------------------------------
// Calibration
// ---------------------------------------------------------------------------

/// Count how many times the initial key can be rehashed within `budget`.
///
/// Blocks the caller for `budget`. A zero budget returns 0 at once.
///
/// # Errors
///
/// Returns `CryptoError::MalformedInput` if `budget` cannot be added to the
/// current time, and propagates hash and MAC failures.
pub fn benchmark_iterations(
    budget: Duration,
    hash: &dyn CryptoHash,
    mac: &dyn Mac,
) -> Result<u64, CryptoError> {
    let start = Instant::now();
    let deadline = start
        .checked_add(budget)
        .ok_or_else(|| CryptoError::MalformedInput(format!("latency budget {budget:?} out of range")))?;

    let mut key = compute_initial_key(
        BENCHMARK_MASTER_PASSWORD,
        BENCHMARK_SERVICE_NAME,
        0,
        hash,
        mac,
    )?;
    let mut iterations = 0u64;
    while Instant::now() < deadline {
        hash.rehash(&mut key)?;
        iterations = iterations.saturating_add(1);
    }

    tracing::debug!(
        iterations,
        budget_ms = budget.as_millis(),
        hash = hash.name(),
        "benchmarked key hashing"
    );
    Ok(iterations)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
