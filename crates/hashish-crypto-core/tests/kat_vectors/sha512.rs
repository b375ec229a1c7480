//! SHA-512 on word arrays: FIPS 180-2 vectors and a `sha2` cross-check.

use hashish_crypto_core::hash::{CryptoHash, Sha512};
use hashish_crypto_core::words::{hex_decode, hex_encode};
use sha2::Digest;

fn to_bytes(words: &[u64]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_be_bytes()).collect()
}

// ── FIPS 180-2 Appendix C ───────────────────────────────────────────

#[test]
fn fips_180_2_empty_message() {
    let digest = Sha512.hash(&[]).expect("hash should succeed");
    assert_eq!(
        hex_encode(digest.expose()),
        "0xcf83e1357eefb8bd f1542850d66d8007 d620e4050b5715dc 83f4a921d36ce9ce \
         47d0d13c5d85f2b0 ff8318d2877eec2f 63b931bd47417a81 a538327af927da3e"
    );
}

#[test]
fn fips_180_2_two_block_message() {
    let message: Vec<u64> = b"abcdefghbcdefghicdefghijdefghijkefghijklfghijklmghijklmn\
hijklmnoijklmnopjklmnopqklmnopqrlmnopqrsmnopqrstnopqrstu"
        .chunks(8)
        .map(|c| u64::from_be_bytes(c.try_into().expect("112 bytes split into words")))
        .collect();
    assert_eq!(message.len(), 14);

    let digest = Sha512.hash(&message).expect("hash should succeed");
    assert_eq!(
        hex_encode(digest.expose()),
        "0x8e959b75dae313da 8cf4f72814fc143f 8f7779c6eb9f7fa1 7299aeadb6889018 \
         501d289e4900f7e4 331b99dec4b5433a c7d329eeb6dd2654 5e96e55b874be909"
    );
}

// ── Padding boundaries, checked against RustCrypto ──────────────────

#[test]
fn every_length_up_to_three_blocks_matches_sha2() {
    for len in 0..=48u64 {
        let message: Vec<u64> = (0..len).map(|i| i.wrapping_mul(0x9e37_79b9_7f4a_7c15)).collect();
        let ours = Sha512.hash(&message).expect("hash should succeed");
        let reference = sha2::Sha512::digest(to_bytes(&message));
        assert_eq!(
            to_bytes(ours.expose()),
            reference.as_slice(),
            "digest mismatch for a {len}-word message"
        );
    }
}

#[test]
fn rehash_equals_hash_of_digest() {
    let message = hex_decode("0x0123456789abcdef").expect("valid hex");
    let mut state = Sha512.hash(&message).expect("hash should succeed");
    let expected = sha2::Sha512::digest(sha2::Sha512::digest(to_bytes(&message)));
    Sha512.rehash(&mut state).expect("rehash should succeed");
    assert_eq!(to_bytes(state.expose()), expected.as_slice());
}
