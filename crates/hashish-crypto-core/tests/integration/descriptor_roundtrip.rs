//! A service's password must survive saving and reloading its descriptor.

use hashish_crypto_core::descriptor::{PasswordMode, ServiceDescriptor};
use hashish_crypto_core::password::Constraints;
use hashish_crypto_core::registry::AlgorithmRegistry;
use hashish_crypto_core::CryptoError;

const MASTER: &str = "an excellent master password";

fn reload(descriptor: &ServiceDescriptor, registry: &AlgorithmRegistry) -> ServiceDescriptor {
    ServiceDescriptor::parse(&descriptor.to_text(), registry).expect("own output should parse")
}

#[test]
fn generated_password_survives_reload() {
    let registry = AlgorithmRegistry::new();
    let mut service = ServiceDescriptor::new("forum.example.net", 64, &registry);
    service
        .set_constraints(Constraints {
            case_sensitivity: true,
            number_of_caps: 4,
            number_of_digits: 4,
            maximal_length: 12,
            extra_symbols: "@".into(),
        })
        .expect("constraints are matchable");
    let before = service.compute_password(MASTER).expect("compute should succeed");

    let mut reloaded = reload(&service, &registry);
    assert_eq!(reloaded, service);
    let after = reloaded.compute_password(MASTER).expect("compute should succeed");
    assert_eq!(before.as_str(), after.as_str());
}

#[test]
fn encrypted_password_survives_reload() {
    let registry = AlgorithmRegistry::new();
    let mut service = ServiceDescriptor::new("bank.example", 64, &registry);
    service
        .encrypt_password(MASTER, "Ünïcødé pässwörd ✓")
        .expect("encrypt should succeed");

    let mut reloaded = reload(&service, &registry);
    assert_eq!(reloaded.mode(), PasswordMode::Encrypted);
    let password = reloaded.compute_password(MASTER).expect("compute should succeed");
    assert_eq!(password.as_str(), "Ünïcødé pässwörd ✓");
}

#[test]
fn full_lifecycle_across_reloads() {
    let registry = AlgorithmRegistry::new();
    let mut service = ServiceDescriptor::new("shop.example", 32, &registry);
    let first = service.compute_password(MASTER).expect("compute should succeed");

    // Imposed password replaces the generated one.
    service.encrypt_password(MASTER, "imposed").expect("encrypt should succeed");
    let mut service = reload(&service, &registry);
    assert_eq!(service.nonce(), 0);

    // Changing the imposed password moves to a fresh nonce.
    service.encrypt_password(MASTER, "imposed again").expect("encrypt should succeed");
    let mut service = reload(&service, &registry);
    assert_eq!(service.nonce(), 1);
    assert_eq!(
        service.compute_password(MASTER).expect("compute should succeed").as_str(),
        "imposed again"
    );

    // Going back to generated never reuses an encryption key.
    service.switch_to_generated().expect("switch should succeed");
    let mut service = reload(&service, &registry);
    assert_eq!(service.nonce(), 2);
    let last = service.compute_password(MASTER).expect("compute should succeed");
    assert_ne!(first.as_str(), last.as_str());
}

#[test]
fn crlf_files_parse() {
    let registry = AlgorithmRegistry::new();
    let service = ServiceDescriptor::new("windows.example", 5, &registry);
    let text = service.to_text().replace('\n', "\r\n");
    let parsed = ServiceDescriptor::parse(&text, &registry).expect("CRLF text should parse");
    assert_eq!(parsed.service_name, "windows.example");
    assert_eq!(parsed.iterations, 5);
}

#[test]
fn unknown_cipher_is_unsupported() {
    let registry = AlgorithmRegistry::new();
    let service = ServiceDescriptor::new("x", 1, &registry);
    let text = service
        .to_text()
        .replace("OFB-chained XOR cipher", "AES-256-GCM");
    let result = ServiceDescriptor::parse(&text, &registry);
    assert!(matches!(result, Err(CryptoError::UnsupportedAlgorithm { .. })));
}
