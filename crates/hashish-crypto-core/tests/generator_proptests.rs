#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

//! Property-based tests for the default password generator.

use hashish_crypto_core::hash::Sha512;
use hashish_crypto_core::hmac::Rfc2104Hmac;
use hashish_crypto_core::password::{
    CachedData, Constraints, DefaultPasswordGenerator, PasswordGenerator,
};
use proptest::prelude::*;

fn matchable_constraints() -> impl Strategy<Value = Constraints> {
    (any::<bool>(), 0u32..4, 0u32..4, 8u32..40, "[!#$%&*+=?@_-]{0,6}").prop_map(
        |(case_sensitivity, caps, digits, maximal_length, extra_symbols)| Constraints {
            case_sensitivity,
            number_of_caps: if case_sensitivity { caps } else { 0 },
            number_of_digits: digits,
            maximal_length,
            extra_symbols,
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Generated passwords honour every constraint.
    #[test]
    fn password_satisfies_constraints(
        key in proptest::collection::vec(any::<u64>(), 8),
        constraints in matchable_constraints(),
    ) {
        let mut cached = CachedData::default();
        let password = DefaultPasswordGenerator
            .generate(&key, &Rfc2104Hmac, &Sha512, &constraints, &mut cached)
            .expect("matchable constraints should generate");

        let length = password.chars().count();
        prop_assert!(length <= constraints.maximal_length as usize);
        let digits = password.chars().filter(char::is_ascii_digit).count();
        prop_assert!(digits >= constraints.number_of_digits as usize);
        let caps = password.chars().filter(char::is_ascii_uppercase).count();
        prop_assert!(caps >= constraints.number_of_caps as usize);
        if !constraints.case_sensitivity {
            prop_assert_eq!(caps, 0);
        }
        for ch in password.chars() {
            prop_assert!(
                ch.is_ascii_alphanumeric() || constraints.extra_symbols.contains(ch),
                "unexpected character {:?}", ch
            );
        }
    }

    /// Starting from the cached counter reproduces the same password.
    #[test]
    fn cached_counter_reproduces_password(
        key in proptest::collection::vec(any::<u64>(), 8),
        constraints in matchable_constraints(),
    ) {
        let mut cached = CachedData::default();
        let first = DefaultPasswordGenerator
            .generate(&key, &Rfc2104Hmac, &Sha512, &constraints, &mut cached)
            .expect("matchable constraints should generate");
        let mut resumed = cached;
        let second = DefaultPasswordGenerator
            .generate(&key, &Rfc2104Hmac, &Sha512, &constraints, &mut resumed)
            .expect("matchable constraints should generate");
        prop_assert_eq!(first.as_str(), second.as_str());
        prop_assert_eq!(resumed, cached);
    }
}
