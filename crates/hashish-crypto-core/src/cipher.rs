//! Legacy password encryption.
//!
//! Passwords that cannot be generated (because a service imposes them)
//! are stored encrypted under the service's hashed key with
//! [`OfbChainedXorCipher`], a synchronous stream cipher whose keystream is
//! a hash chain:
//!
//! ```text
//! ks[0]   = H(hashed_key)
//! ks[i+1] = H(ks[i] ^ hashed_key)
//! c[i]    = p[i] ^ ks[i]          (the last block may be shorter)
//! ```
//!
//! Encryption and decryption are the same operation. The keystream only
//! depends on the hashed key, so a hashed key must never encrypt two
//! different secrets: callers bump the service nonce instead.

use crate::error::CryptoError;
use crate::hash::CryptoHash;
use crate::memory::SecretWords;

/// A symmetric cipher keyed by a hashed key.
pub trait PasswordCipher {
    /// Name used in descriptors and test-vector files.
    fn name(&self) -> &'static str;

    /// Encrypt `message` under `hashed_key`, which must be exactly
    /// `hash.hash_length()` words. The output has the message's length.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::MalformedInput` for a key of the wrong length
    /// and propagates hash failures. No partial output escapes on failure.
    fn encrypt(
        &self,
        hashed_key: &[u64],
        message: &[u64],
        hash: &dyn CryptoHash,
    ) -> Result<SecretWords, CryptoError>;

    /// Decrypt `ciphertext` under `hashed_key`.
    ///
    /// # Errors
    ///
    /// Same as [`PasswordCipher::encrypt`].
    fn decrypt(
        &self,
        hashed_key: &[u64],
        ciphertext: &[u64],
        hash: &dyn CryptoHash,
    ) -> Result<SecretWords, CryptoError>;
}

/// Hash-chained XOR stream cipher in output-feedback mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OfbChainedXorCipher;

impl OfbChainedXorCipher {
    /// Name used in descriptors and test-vector files.
    pub const NAME: &'static str = "OFB-chained XOR cipher";
}

impl PasswordCipher for OfbChainedXorCipher {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn encrypt(
        &self,
        hashed_key: &[u64],
        message: &[u64],
        hash: &dyn CryptoHash,
    ) -> Result<SecretWords, CryptoError> {
        let block_length = hash.hash_length();
        if hashed_key.len() != block_length {
            return Err(CryptoError::MalformedInput(format!(
                "hashed key has {} words, expected {block_length}",
                hashed_key.len()
            )));
        }

        let mut output = SecretWords::zeroed(message.len())?;
        let mut keystream = hash.hash(hashed_key)?;
        let mut blocks = message
            .chunks(block_length)
            .zip(output.expose_mut().chunks_mut(block_length))
            .peekable();
        while let Some((plain, cipher)) = blocks.next() {
            for ((c, p), k) in cipher.iter_mut().zip(plain).zip(keystream.expose()) {
                *c = p ^ k;
            }
            if blocks.peek().is_some() {
                for (k, h) in keystream.expose_mut().iter_mut().zip(hashed_key) {
                    *k ^= h;
                }
                hash.rehash(&mut keystream)?;
            }
        }
        Ok(output)
    }

    fn decrypt(
        &self,
        hashed_key: &[u64],
        ciphertext: &[u64],
        hash: &dyn CryptoHash,
    ) -> Result<SecretWords, CryptoError> {
        self.encrypt(hashed_key, ciphertext, hash)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
