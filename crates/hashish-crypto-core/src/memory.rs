//! Secure memory types for key material expressed as 64-bit words.
//!
//! This module provides:
//! - [`SecretWords`]: an owned word buffer that zeroes itself on drop and
//!   masks its content in `Debug`/`Display`
//! - [`try_zeroed_words`]: fallible scratch allocation, so that running out
//!   of memory surfaces as [`CryptoError::Allocation`] instead of aborting

use crate::error::CryptoError;
use secrecy::{ExposeSecret, ExposeSecretMut, SecretBox, SecretSlice};
use std::fmt;

// ---------------------------------------------------------------------------
// Fallible allocation
// ---------------------------------------------------------------------------

/// Allocate a zero-filled `Vec<u64>` of exactly `len` words.
///
/// `what` names the buffer in the resulting error.
///
/// # Errors
///
/// Returns `CryptoError::Allocation` if the allocator refuses the request.
pub fn try_zeroed_words(len: usize, what: &'static str) -> Result<Vec<u64>, CryptoError> {
    let mut words = Vec::new();
    words
        .try_reserve_exact(len)
        .map_err(|_| CryptoError::Allocation(what))?;
    words.resize(len, 0);
    Ok(words)
}

// ---------------------------------------------------------------------------
// SecretWords
// ---------------------------------------------------------------------------

/// Variable-length buffer of secret 64-bit words.
///
/// Wraps [`SecretSlice<u64>`] from the `secrecy` crate and adds:
/// - Fallible construction (allocation failure is an error, not an abort)
/// - Masked `Debug` output (`SecretWords(***)`)
/// - Zeroization on drop (via `secrecy`'s built-in `Zeroize`)
pub struct SecretWords {
    inner: SecretSlice<u64>,
}

impl SecretWords {
    /// Copy `data` into a new secret buffer.
    ///
    /// The caller remains responsible for the source slice.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Allocation` if memory allocation fails.
    pub fn new(data: &[u64]) -> Result<Self, CryptoError> {
        let mut words = try_zeroed_words(data.len(), "secret words")?;
        words.copy_from_slice(data);
        Ok(Self::from_vec(words))
    }

    /// Create a buffer of `len` zero words.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Allocation` if memory allocation fails.
    pub fn zeroed(len: usize) -> Result<Self, CryptoError> {
        try_zeroed_words(len, "secret words").map(Self::from_vec)
    }

    /// Concatenate several slices into one secret buffer.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Allocation` if memory allocation fails or the
    /// total length overflows.
    pub fn concat(parts: &[&[u64]]) -> Result<Self, CryptoError> {
        let total = parts
            .iter()
            .try_fold(0usize, |acc, part| acc.checked_add(part.len()))
            .ok_or(CryptoError::Allocation("concatenated words"))?;
        let mut words = Vec::new();
        words
            .try_reserve_exact(total)
            .map_err(|_| CryptoError::Allocation("concatenated words"))?;
        for part in parts {
            words.extend_from_slice(part);
        }
        Ok(Self::from_vec(words))
    }

    /// Take ownership of an existing vector.
    ///
    /// The vector's allocation becomes the secret buffer; spare capacity is
    /// released first.
    #[must_use]
    pub fn from_vec(words: Vec<u64>) -> Self {
        Self {
            inner: SecretBox::new(words.into_boxed_slice()),
        }
    }

    /// Expose the underlying words. Keep the borrow short.
    #[must_use]
    pub fn expose(&self) -> &[u64] {
        self.inner.expose_secret()
    }

    /// Mutable access to the underlying words.
    pub fn expose_mut(&mut self) -> &mut [u64] {
        self.inner.expose_secret_mut()
    }

    /// Returns the number of words in the buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.expose().len()
    }

    /// Returns `true` if the buffer holds no words.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for SecretWords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretWords(***)")
    }
}

impl fmt::Display for SecretWords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretWords(***)")
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
