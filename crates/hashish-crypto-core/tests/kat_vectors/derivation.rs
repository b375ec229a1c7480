//! End-to-end derivation: master password and service to password.

use hashish_crypto_core::descriptor::ServiceDescriptor;
use hashish_crypto_core::hash::Sha512;
use hashish_crypto_core::hmac::Rfc2104Hmac;
use hashish_crypto_core::kdf::{compute_hashed_key, compute_initial_key};
use hashish_crypto_core::password::Constraints;
use hashish_crypto_core::registry::AlgorithmRegistry;
use hashish_crypto_core::words::hex_encode;

#[test]
fn initial_key() {
    let key = compute_initial_key("hunter2", "example.org", 1, &Sha512, &Rfc2104Hmac)
        .expect("derivation should succeed");
    assert_eq!(
        hex_encode(key.expose()),
        "0x92bd9553fe88dde3 16654cb0dce083ed ab0158c5387245b1 f65d75aa2a9c6015 \
         a7b98a76bf80233d 627f203b0ea7109e 204486d35748a163 56a85157efebaba0"
    );
}

#[test]
fn hashed_key_after_ten_iterations() {
    let key = compute_hashed_key("hunter2", "example.org", 0, &Sha512, &Rfc2104Hmac, 10)
        .expect("derivation should succeed");
    assert_eq!(
        hex_encode(key.expose()),
        "0xcdd3661653ff64ac 6b0d66307ed09618 f7a05f9735092421 72bf7ecefdecc717 \
         b89fe08af375bf89 91ee13c81bb64faa fb06f72338c37384 4b614a67c3d65e8e"
    );
}

#[test]
fn generated_service_passwords() {
    let registry = AlgorithmRegistry::new();
    let mut service = ServiceDescriptor::new("example.org", 10, &registry);
    let password = service.compute_password("hunter2").expect("compute should succeed");
    assert_eq!(password.as_str(), "fatcp8rm99jh88b");

    service.bump_nonce().expect("bump should succeed");
    let password = service.compute_password("hunter2").expect("compute should succeed");
    assert_eq!(password.as_str(), "qc1bynwevzeqjgd");
}

#[test]
fn constrained_service_password() {
    let registry = AlgorithmRegistry::new();
    let mut service = ServiceDescriptor::new("mail.example.com", 1000, &registry);
    service
        .set_constraints(Constraints {
            case_sensitivity: true,
            number_of_caps: 2,
            number_of_digits: 3,
            maximal_length: 20,
            extra_symbols: "!?".into(),
        })
        .expect("constraints are matchable");
    service.bump_nonce().expect("bump should succeed");
    service.bump_nonce().expect("bump should succeed");
    let password = service
        .compute_password("correct horse battery staple")
        .expect("compute should succeed");
    assert_eq!(password.as_str(), "Z79L3eS8eQ6GHIjj?rBb");
}

#[test]
fn encrypted_service_password() {
    let registry = AlgorithmRegistry::new();
    let mut service = ServiceDescriptor::new("example.org", 10, &registry);
    service
        .encrypt_password("hunter2", "imposed-Pa55word")
        .expect("encrypt should succeed");
    let ciphertext = service.encrypted_password().expect("ciphertext is stored");
    assert_eq!(
        hex_encode(ciphertext),
        "0x563dd667786b926f 857eba6b1521c5c6 a830a593ee234e3b ea1a391f70d6bc46"
    );
}
