//! Secrets must not leak through formatting or survive their owners.

use hashish_crypto_core::hash::Sha512State;
use hashish_crypto_core::memory::SecretWords;
use zeroize::Zeroize;

#[test]
fn secret_words_are_masked() {
    let secret = SecretWords::new(&[0xdead_beef_dead_beef]).expect("allocation should succeed");
    assert_eq!(format!("{secret:?}"), "SecretWords(***)");
    assert_eq!(format!("{secret}"), "SecretWords(***)");
}

#[test]
fn hash_state_is_masked_and_zeroizable() {
    let mut state = Sha512State::new();
    state.compress(&[0x0123_4567_89ab_cdef; 16]);
    assert!(state.digest().iter().any(|&w| w != 0));
    assert!(!format!("{state:?}").contains("0123456789abcdef"));

    state.zeroize();
    assert!(state.digest().iter().all(|&w| w == 0));
}
