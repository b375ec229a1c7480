//! Default generator vectors.

use hashish_crypto_core::hash::Sha512;
use hashish_crypto_core::hmac::Rfc2104Hmac;
use hashish_crypto_core::password::{
    CachedData, Constraints, DefaultPasswordGenerator, PasswordGenerator,
};
use hashish_crypto_core::words::hex_decode;

const KEY_A: &str = "0xd2deaf05f6d12f53 f12700beb7d24590 a6f2613a975753ef a84596c5e9c88ae9 \
    9a2a573f0ede8ea9 70c2b75017ca5e55 c8b07c26bff7d86a 70e4496f50bec4ec";
const KEY_B: &str = "0xec434022089bf711 8ae29ecd7205ee78 e830c1a9e017a69c 6b105c631c031dbc \
    cdf7558c9ad3727c 8a91879b7e7dce90 704aac13840b06ca be0922445558e9e8";

fn generate(key: &str, constraints: &Constraints, cached: &mut CachedData) -> String {
    let key = hex_decode(key).expect("valid hex");
    DefaultPasswordGenerator
        .generate(&key, &Rfc2104Hmac, &Sha512, constraints, cached)
        .expect("generate should succeed")
        .as_str()
        .to_owned()
}

fn strict(caps: u32, digits: u32, maximal_length: u32, extra_symbols: &str) -> Constraints {
    Constraints {
        case_sensitivity: true,
        number_of_caps: caps,
        number_of_digits: digits,
        maximal_length,
        extra_symbols: extra_symbols.into(),
    }
}

#[test]
fn default_constraints() {
    let mut cached = CachedData::default();
    assert_eq!(generate(KEY_A, &Constraints::default(), &mut cached), "qc1bynwevzeqjgd");
    assert_eq!(cached.constraint_counter, 0);
}

#[test]
fn caps_and_digits() {
    let mut cached = CachedData::default();
    assert_eq!(generate(KEY_A, &strict(3, 3, 15, ""), &mut cached), "W87XU7I5GlaHYUr");
}

#[test]
fn extra_symbols() {
    let mut cached = CachedData::default();
    assert_eq!(
        generate(KEY_B, &strict(2, 2, 20, "!#$%&*+-=?@_"), &mut cached),
        "9WY5@e&mdtL!FU7gdhRb"
    );
}

#[test]
fn unlimited_length_keeps_the_whole_candidate() {
    let unlimited = Constraints {
        maximal_length: 0,
        ..Constraints::default()
    };
    let mut cached = CachedData::default();
    let password = generate(KEY_B, &unlimited, &mut cached);
    assert_eq!(password.len(), 104);
    assert!(password.starts_with("l6e82zbjchs7a3hv5ott"));
}

#[test]
fn search_stores_the_matching_counter() {
    let mut cached = CachedData::default();
    assert_eq!(
        generate(KEY_B, &strict(15, 15, 30, ""), &mut cached),
        "16U12DRUQV9V8TSYHEOJ0A02181847"
    );
    assert_eq!(cached.constraint_counter, 3);
}

#[test]
fn search_resumes_from_cached_counter() {
    let mut cached = CachedData {
        constraint_counter: 7,
    };
    assert_eq!(generate(KEY_A, &strict(3, 3, 15, ""), &mut cached), "OLX0541et3BixKi");
    assert_eq!(cached.constraint_counter, 7);
}
