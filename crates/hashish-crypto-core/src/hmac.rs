//! Keyed message authentication over word arrays.
//!
//! [`Rfc2104Hmac`] is the HMAC construction of RFC 2104, generic over any
//! [`CryptoHash`]. With SHA-512 it agrees with HMAC-SHA-512 applied to the
//! big-endian serialization of the key and message words.

use crate::error::CryptoError;
use crate::hash::CryptoHash;
use crate::memory::SecretWords;

const INNER_PAD: u64 = 0x3636_3636_3636_3636;
const OUTER_PAD: u64 = 0x5c5c_5c5c_5c5c_5c5c;

/// A keyed MAC on word arrays, parameterised by a hash.
pub trait Mac {
    /// Name used in descriptors and test-vector files.
    fn name(&self) -> &'static str;

    /// Compute the MAC of `message` under `key`.
    ///
    /// The result has `hash.hash_length()` words.
    ///
    /// # Errors
    ///
    /// Propagates failures of the underlying hash and of scratch allocation.
    fn mac(
        &self,
        key: &[u64],
        message: &[u64],
        hash: &dyn CryptoHash,
    ) -> Result<SecretWords, CryptoError>;
}

/// HMAC as specified by RFC 2104.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rfc2104Hmac;

impl Rfc2104Hmac {
    /// Name used in descriptors and test-vector files.
    pub const NAME: &'static str = "RFC 2104";
}

impl Mac for Rfc2104Hmac {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn mac(
        &self,
        key: &[u64],
        message: &[u64],
        hash: &dyn CryptoHash,
    ) -> Result<SecretWords, CryptoError> {
        let block_length = hash.block_length();

        // Keys longer than a block are replaced by their digest; either way
        // the key is zero-padded to exactly one block.
        let mut key_block = SecretWords::zeroed(block_length)?;
        if key.len() > block_length {
            let hashed_key = hash.hash(key)?;
            copy_prefix(key_block.expose_mut(), hashed_key.expose());
        } else {
            copy_prefix(key_block.expose_mut(), key);
        }

        let mut inner = SecretWords::concat(&[key_block.expose(), message])?;
        xor_prefix(inner.expose_mut(), block_length, INNER_PAD);
        let inner_digest = hash.hash(inner.expose())?;
        drop(inner);

        let mut outer = SecretWords::concat(&[key_block.expose(), inner_digest.expose()])?;
        xor_prefix(outer.expose_mut(), block_length, OUTER_PAD);
        hash.hash(outer.expose())
    }
}

fn copy_prefix(dst: &mut [u64], src: &[u64]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d = *s;
    }
}

fn xor_prefix(words: &mut [u64], len: usize, pad: u64) {
    for word in words.iter_mut().take(len) {
        *word ^= pad;
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
