//! Iteration calibration on the current hardware.

use std::time::{Duration, Instant};

use hashish_crypto_core::hash::Sha512;
use hashish_crypto_core::hmac::Rfc2104Hmac;
use hashish_crypto_core::kdf::{benchmark_iterations, compute_hashed_key};

#[test]
fn benchmark_blocks_for_the_budget() {
    let budget = Duration::from_millis(30);
    let start = Instant::now();
    let iterations = benchmark_iterations(budget, &Sha512, &Rfc2104Hmac)
        .expect("benchmark should succeed");
    assert!(start.elapsed() >= budget);
    assert!(iterations > 0, "at least one hash fits in 30 ms");
}

#[test]
fn longer_budget_allows_more_iterations() {
    let short = benchmark_iterations(Duration::from_millis(10), &Sha512, &Rfc2104Hmac)
        .expect("benchmark should succeed");
    let long = benchmark_iterations(Duration::from_millis(80), &Sha512, &Rfc2104Hmac)
        .expect("benchmark should succeed");
    assert!(long > short, "80 ms gave {long}, 10 ms gave {short}");
}

#[test]
fn calibrated_count_is_usable() {
    let iterations = benchmark_iterations(Duration::from_millis(10), &Sha512, &Rfc2104Hmac)
        .expect("benchmark should succeed");
    let key = compute_hashed_key("pw", "svc", 0, &Sha512, &Rfc2104Hmac, iterations)
        .expect("derivation should succeed");
    assert_eq!(key.len(), 8);
}
