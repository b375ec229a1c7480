//! Algorithm selection by name.
//!
//! Descriptors and test-vector files refer to algorithms by name. Each role
//! has a closed set of variants ([`HashAlgorithm`], [`MacAlgorithm`],
//! [`CipherAlgorithm`], [`GeneratorAlgorithm`]) that resolves to an
//! implementation of the role's capability trait. An
//! [`AlgorithmRegistry`] is built once at startup and passed to whatever
//! needs to resolve names.

use crate::cipher::{OfbChainedXorCipher, PasswordCipher};
use crate::error::{AlgorithmKind, CryptoError};
use crate::hash::{CryptoHash, Sha512};
use crate::hmac::{Mac, Rfc2104Hmac};
use crate::password::{DefaultPasswordGenerator, PasswordGenerator};

// ---------------------------------------------------------------------------
// Variant sets
// ---------------------------------------------------------------------------

/// Registered hashes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    /// SHA-512 on word arrays.
    Sha512,
}

impl HashAlgorithm {
    /// Every variant, production default first.
    pub const ALL: [Self; 1] = [Self::Sha512];

    /// The implementation behind this variant.
    #[must_use]
    pub fn engine(self) -> &'static dyn CryptoHash {
        match self {
            Self::Sha512 => &Sha512,
        }
    }

    /// Name used in descriptors and test-vector files.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.engine().name()
    }
}

/// Registered MACs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MacAlgorithm {
    /// HMAC per RFC 2104.
    Rfc2104,
}

impl MacAlgorithm {
    /// Every variant, production default first.
    pub const ALL: [Self; 1] = [Self::Rfc2104];

    /// The implementation behind this variant.
    #[must_use]
    pub fn engine(self) -> &'static dyn Mac {
        match self {
            Self::Rfc2104 => &Rfc2104Hmac,
        }
    }

    /// Name used in descriptors and test-vector files.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.engine().name()
    }
}

/// Registered password ciphers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CipherAlgorithm {
    /// Hash-chained XOR stream cipher.
    OfbChainedXor,
}

impl CipherAlgorithm {
    /// Every variant, production default first.
    pub const ALL: [Self; 1] = [Self::OfbChainedXor];

    /// The implementation behind this variant.
    #[must_use]
    pub fn engine(self) -> &'static dyn PasswordCipher {
        match self {
            Self::OfbChainedXor => &OfbChainedXorCipher,
        }
    }

    /// Name used in descriptors and test-vector files.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.engine().name()
    }
}

/// Registered password generators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeneratorAlgorithm {
    /// Base-N generator with constraint search.
    Default,
}

impl GeneratorAlgorithm {
    /// Every variant, production default first.
    pub const ALL: [Self; 1] = [Self::Default];

    /// The implementation behind this variant.
    #[must_use]
    pub fn engine(self) -> &'static dyn PasswordGenerator {
        match self {
            Self::Default => &DefaultPasswordGenerator,
        }
    }

    /// Name used in descriptors and test-vector files.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.engine().name()
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Name-to-algorithm lookup for every role.
///
/// The first entry of each role is the default used for new services.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlgorithmRegistry {
    hashes: Vec<HashAlgorithm>,
    macs: Vec<MacAlgorithm>,
    ciphers: Vec<CipherAlgorithm>,
    generators: Vec<GeneratorAlgorithm>,
}

impl Default for AlgorithmRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AlgorithmRegistry {
    /// Registry of every algorithm this crate implements.
    #[must_use]
    pub fn new() -> Self {
        Self {
            hashes: HashAlgorithm::ALL.to_vec(),
            macs: MacAlgorithm::ALL.to_vec(),
            ciphers: CipherAlgorithm::ALL.to_vec(),
            generators: GeneratorAlgorithm::ALL.to_vec(),
        }
    }

    /// Look up a hash by name.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::UnsupportedAlgorithm` for an unknown name.
    pub fn hash(&self, name: &str) -> Result<HashAlgorithm, CryptoError> {
        find(&self.hashes, name, AlgorithmKind::Hash, |a| a.name())
    }

    /// Look up a MAC by name.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::UnsupportedAlgorithm` for an unknown name.
    pub fn mac(&self, name: &str) -> Result<MacAlgorithm, CryptoError> {
        find(&self.macs, name, AlgorithmKind::Mac, |a| a.name())
    }

    /// Look up a password cipher by name.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::UnsupportedAlgorithm` for an unknown name.
    pub fn cipher(&self, name: &str) -> Result<CipherAlgorithm, CryptoError> {
        find(&self.ciphers, name, AlgorithmKind::Cipher, |a| a.name())
    }

    /// Look up a password generator by name.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::UnsupportedAlgorithm` for an unknown name.
    pub fn generator(&self, name: &str) -> Result<GeneratorAlgorithm, CryptoError> {
        find(&self.generators, name, AlgorithmKind::Generator, |a| a.name())
    }

    /// Hash used for new services.
    #[must_use]
    pub fn default_hash(&self) -> HashAlgorithm {
        self.hashes.first().copied().unwrap_or(HashAlgorithm::Sha512)
    }

    /// MAC used for new services.
    #[must_use]
    pub fn default_mac(&self) -> MacAlgorithm {
        self.macs.first().copied().unwrap_or(MacAlgorithm::Rfc2104)
    }

    /// Cipher used for new encrypted passwords.
    #[must_use]
    pub fn default_cipher(&self) -> CipherAlgorithm {
        self.ciphers
            .first()
            .copied()
            .unwrap_or(CipherAlgorithm::OfbChainedXor)
    }

    /// Generator used for new services.
    #[must_use]
    pub fn default_generator(&self) -> GeneratorAlgorithm {
        self.generators
            .first()
            .copied()
            .unwrap_or(GeneratorAlgorithm::Default)
    }

    /// Registered hashes.
    #[must_use]
    pub fn hashes(&self) -> &[HashAlgorithm] {
        &self.hashes
    }

    /// Registered MACs.
    #[must_use]
    pub fn macs(&self) -> &[MacAlgorithm] {
        &self.macs
    }

    /// Registered ciphers.
    #[must_use]
    pub fn ciphers(&self) -> &[CipherAlgorithm] {
        &self.ciphers
    }

    /// Registered generators.
    #[must_use]
    pub fn generators(&self) -> &[GeneratorAlgorithm] {
        &self.generators
    }
}

fn find<T: Copy>(
    candidates: &[T],
    name: &str,
    kind: AlgorithmKind,
    name_of: impl Fn(T) -> &'static str,
) -> Result<T, CryptoError> {
    let name = name.trim_end();
    candidates
        .iter()
        .copied()
        .find(|&candidate| name_of(candidate) == name)
        .ok_or_else(|| {
            tracing::warn!(%kind, name, "unsupported algorithm");
            CryptoError::UnsupportedAlgorithm {
                kind,
                name: name.to_owned(),
            }
        })
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
