//! The embedded self-test suite, and what it reports on bad files.

use hashish_crypto_core::registry::{AlgorithmRegistry, GeneratorAlgorithm, HashAlgorithm};
use hashish_crypto_core::selftest::{run_all, run_vectors, Subject, TEST_FILE_HEADER};
use hashish_crypto_core::CryptoError;

#[test]
fn all_embedded_vectors_pass() {
    let registry = AlgorithmRegistry::new();
    let report = run_all(&registry);
    assert!(report.passed(), "failed: {:?}", report.failed_algorithms());
    let total: usize = report
        .results
        .iter()
        .map(|(_, outcome)| outcome.as_ref().map_or(0, |r| r.passed))
        .sum();
    assert_eq!(total, 5 + 5 + 4 + 6);
}

#[test]
fn every_subject_has_vectors() {
    let registry = AlgorithmRegistry::new();
    for (subject, _) in run_all(&registry).results {
        assert!(subject.embedded_vectors().starts_with(TEST_FILE_HEADER));
    }
}

#[test]
fn corrupted_vector_is_caught() {
    let registry = AlgorithmRegistry::new();
    let subject = Subject::Hash(HashAlgorithm::Sha512);
    let text = subject
        .embedded_vectors()
        .replacen("result : 0xbe2c90e5", "result : 0xbe2c90e6", 1);
    let report = run_vectors(subject, &text, &registry).expect("file should run");
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.passed, 4);
    assert!(matches!(report.check(), Err(CryptoError::SelfTestMismatch { .. })));
}

#[test]
fn comments_and_indentation_are_ignored() {
    let registry = AlgorithmRegistry::new();
    let subject = Subject::Generator(GeneratorAlgorithm::Default);
    let text = format!(
        "{TEST_FILE_HEADER}\n  # leading comment\n   hash : SHA-512\n\thmac : RFC 2104\n"
    );
    // A tab is not a space: the hmac line is not recognised and is ignored.
    let report = run_vectors(subject, &text, &registry).expect("file should run");
    assert_eq!(report.passed, 0);
    assert!(report.passed());
}
