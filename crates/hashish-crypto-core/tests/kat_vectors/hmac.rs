//! RFC 2104 HMAC over SHA-512 words: RFC 4231 and an `hmac` crate cross-check.

use hashish_crypto_core::hash::Sha512;
use hashish_crypto_core::hmac::{Mac, Rfc2104Hmac};
use hashish_crypto_core::words::{hex_decode, hex_encode};
use hmac::Mac as _;

type ReferenceHmac = hmac::Hmac<sha2::Sha512>;

fn to_bytes(words: &[u64]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_be_bytes()).collect()
}

fn reference(key: &[u64], message: &[u64]) -> Vec<u8> {
    let mut mac = ReferenceHmac::new_from_slice(&to_bytes(key)).expect("any key length is valid");
    mac.update(&to_bytes(message));
    mac.finalize().into_bytes().to_vec()
}

// ── RFC 4231 ────────────────────────────────────────────────────────
// Keys are zero-padded to the block anyway, so a 20-byte key padded to
// three words gives the same MAC.

#[test]
fn rfc4231_test_case_1() {
    let key = hex_decode("0x0b0b0b0b0b0b0b0b 0b0b0b0b0b0b0b0b 0b0b0b0b00000000").expect("valid hex");
    let message = hex_decode("0x4869205468657265").expect("valid hex");
    let tag = Rfc2104Hmac.mac(&key, &message, &Sha512).expect("mac should succeed");
    assert_eq!(
        hex_encode(tag.expose()),
        "0x87aa7cdea5ef619d 4ff0b4241a1d6cb0 2379f4e2ce4ec278 7ad0b30545e17cde \
         daa833b7d6b8a702 038b274eaea3f4e4 be9d914eeb61f170 2e696c203a126854"
    );
}

// ── Key lengths around the block size ───────────────────────────────

#[test]
fn key_lengths_match_reference() {
    let message: Vec<u64> = (0..5u64).map(|i| i.wrapping_mul(0x0101_0101_0101_0101)).collect();
    for key_len in [1usize, 8, 15, 16, 17, 32] {
        let key: Vec<u64> = (0..key_len as u64).map(|i| !i).collect();
        let tag = Rfc2104Hmac.mac(&key, &message, &Sha512).expect("mac should succeed");
        assert_eq!(
            to_bytes(tag.expose()),
            reference(&key, &message),
            "HMAC mismatch for a {key_len}-word key"
        );
    }
}

#[test]
fn empty_message_matches_reference() {
    let key = [0x4a65_6665_0000_0000u64];
    let tag = Rfc2104Hmac.mac(&key, &[], &Sha512).expect("mac should succeed");
    assert_eq!(to_bytes(tag.expose()), reference(&key, &[]));
}
