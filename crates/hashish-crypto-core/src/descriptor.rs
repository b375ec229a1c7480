//! Per-service parameters and the operations that derive passwords from them.
//!
//! A [`ServiceDescriptor`] holds everything needed to recompute a service's
//! password from the master password: algorithm choices, iteration count,
//! nonce, password mode, generator constraints and, for encrypted
//! passwords, the ciphertext. It never holds the master password or any
//! derived key.
//!
//! # Nonce rule
//!
//! The nonce diversifies the hashed key. It changes whenever the key would
//! otherwise be reused for a different secret:
//! - replacing an existing ciphertext bumps it
//! - leaving encrypted mode bumps it, so the next generated password is
//!   not derived from a former encryption key
//!
//! An encrypted descriptor's nonce is always the one its ciphertext was
//! sealed with, so [`ServiceDescriptor::bump_nonce`] only applies to
//! generated passwords.

use std::time::Duration;

use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::kdf;
use crate::memory::SecretWords;
use crate::password::{CachedData, Constraints};
use crate::registry::{
    AlgorithmRegistry, CipherAlgorithm, GeneratorAlgorithm, HashAlgorithm, MacAlgorithm,
};
use crate::text::{content_lines, parse_number};
use crate::words::{hex_decode, hex_encode, raw_decode, raw_encode};

/// First line of every descriptor file.
pub const DESCRIPTOR_HEADER: &str = "*** Hashish service descriptor v1 ***";

const ID_SERVICE_NAME: &str = "service_name : ";
const ID_HASH_USED: &str = "hash_used : ";
const ID_HMAC_USED: &str = "hmac_used : ";
const ID_ITERATIONS: &str = "iterations : ";
const ID_NONCE: &str = "nonce : ";
const ID_PASSWORD_TYPE: &str = "password_type : ";
const ID_GENERATOR_USED: &str = "generator_used : ";
const ID_CONSTRAINTS: &str = "constraints : ";
const ID_CACHED_DATA: &str = "cached_data : ";
const ID_CIPHER_USED: &str = "cipher_used : ";
const ID_ENCRYPTED_PW: &str = "encrypted_pw : ";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// How a service's password is obtained.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PasswordMode {
    /// Derived by the password generator.
    #[default]
    Generated,
    /// Decrypted from a stored ciphertext.
    Encrypted,
}

impl PasswordMode {
    /// Numeric code used in descriptor files.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Generated => 0,
            Self::Encrypted => 1,
        }
    }

    /// Inverse of [`PasswordMode::code`].
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Generated),
            1 => Some(Self::Encrypted),
            _ => None,
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Generated => "generated",
            Self::Encrypted => "encrypted",
        }
    }
}

/// Everything needed to recompute one service's password.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceDescriptor {
    /// Public service identifier, part of the key derivation input.
    pub service_name: String,
    /// Hash for key stretching, the MAC and the cipher.
    pub hash: HashAlgorithm,
    /// MAC for the initial key and the generator.
    pub mac: MacAlgorithm,
    /// Number of times the initial key is rehashed.
    pub iterations: u64,
    /// Generator used in generated mode.
    pub generator: GeneratorAlgorithm,
    /// Cipher used in encrypted mode.
    pub cipher: CipherAlgorithm,
    nonce: u64,
    mode: PasswordMode,
    constraints: Constraints,
    cached_data: CachedData,
    encrypted_password: Option<Vec<u64>>,
}

impl ServiceDescriptor {
    /// A generated-password descriptor with the registry's default algorithms.
    #[must_use]
    pub fn new(service_name: impl Into<String>, iterations: u64, registry: &AlgorithmRegistry) -> Self {
        Self {
            service_name: service_name.into(),
            hash: registry.default_hash(),
            mac: registry.default_mac(),
            iterations,
            generator: registry.default_generator(),
            cipher: registry.default_cipher(),
            nonce: 0,
            mode: PasswordMode::Generated,
            constraints: Constraints::default(),
            cached_data: CachedData::default(),
            encrypted_password: None,
        }
    }

    /// Current nonce.
    #[must_use]
    pub const fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Current password mode.
    #[must_use]
    pub const fn mode(&self) -> PasswordMode {
        self.mode
    }

    /// Generator constraints.
    #[must_use]
    pub const fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    /// Cached search state.
    #[must_use]
    pub const fn cached_data(&self) -> &CachedData {
        &self.cached_data
    }

    /// Stored ciphertext, present exactly in encrypted mode.
    #[must_use]
    pub fn encrypted_password(&self) -> Option<&[u64]> {
        self.encrypted_password.as_deref()
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Replace the constraints; the cached counter restarts from zero.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::UnmatchableConstraints` and leaves the
    /// descriptor unchanged if the constraints contradict themselves.
    pub fn set_constraints(&mut self, constraints: Constraints) -> Result<(), CryptoError> {
        constraints.validate()?;
        self.constraints = constraints;
        self.cached_data = CachedData::default();
        Ok(())
    }

    /// Regenerate: move to the next nonce, giving a new generated password.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::WrongPasswordMode` for an encrypted password
    /// and `CryptoError::MalformedInput` if the nonce would overflow.
    pub fn bump_nonce(&mut self) -> Result<(), CryptoError> {
        if self.mode != PasswordMode::Generated {
            return Err(CryptoError::WrongPasswordMode(PasswordMode::Generated.label()));
        }
        self.nonce = next_nonce(self.nonce)?;
        self.cached_data = CachedData::default();
        Ok(())
    }

    /// Drop the ciphertext and derive the password from now on.
    ///
    /// Leaving encrypted mode bumps the nonce. Already generated
    /// descriptors are left unchanged.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::MalformedInput` if the nonce would overflow.
    pub fn switch_to_generated(&mut self) -> Result<(), CryptoError> {
        if self.mode == PasswordMode::Encrypted {
            self.nonce = next_nonce(self.nonce)?;
            self.cached_data = CachedData::default();
        }
        self.mode = PasswordMode::Generated;
        self.encrypted_password = None;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Derivation
    // -----------------------------------------------------------------------

    /// Derive this service's hashed key.
    ///
    /// # Errors
    ///
    /// Propagates key-derivation failures.
    pub fn hashed_key(&self, master_password: &str) -> Result<SecretWords, CryptoError> {
        self.hashed_key_with_nonce(master_password, self.nonce)
    }

    fn hashed_key_with_nonce(
        &self,
        master_password: &str,
        nonce: u64,
    ) -> Result<SecretWords, CryptoError> {
        kdf::compute_hashed_key(
            master_password,
            &self.service_name,
            nonce,
            self.hash.engine(),
            self.mac.engine(),
            self.iterations,
        )
    }

    /// Compute the service password.
    ///
    /// Generated passwords may advance the cached counter; callers that
    /// persist descriptors should save it when it changes.
    ///
    /// # Errors
    ///
    /// Propagates derivation, generation and decryption failures.
    /// A wrong master password is not detected: it yields a wrong password.
    pub fn compute_password(&mut self, master_password: &str) -> Result<Zeroizing<String>, CryptoError> {
        let hashed_key = self.hashed_key(master_password)?;
        match self.mode {
            PasswordMode::Generated => self.generator.engine().generate(
                hashed_key.expose(),
                self.mac.engine(),
                self.hash.engine(),
                &self.constraints,
                &mut self.cached_data,
            ),
            PasswordMode::Encrypted => {
                let ciphertext = self
                    .encrypted_password
                    .as_deref()
                    .ok_or_else(|| CryptoError::MalformedInput("encrypted password missing".into()))?;
                let plaintext =
                    self.cipher
                        .engine()
                        .decrypt(hashed_key.expose(), ciphertext, self.hash.engine())?;
                Ok(raw_decode(plaintext.expose()))
            }
        }
    }

    /// Store `plaintext` encrypted under this service's hashed key.
    ///
    /// Replacing an existing ciphertext first moves to the next nonce. On
    /// failure the descriptor is left exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::MalformedInput` for an empty password or a
    /// nonce overflow, and propagates derivation and cipher failures.
    pub fn encrypt_password(&mut self, master_password: &str, plaintext: &str) -> Result<(), CryptoError> {
        if plaintext.is_empty() {
            return Err(CryptoError::MalformedInput(
                "the password to encrypt is empty".into(),
            ));
        }
        let nonce = match self.mode {
            PasswordMode::Encrypted => next_nonce(self.nonce)?,
            PasswordMode::Generated => self.nonce,
        };

        let hashed_key = self.hashed_key_with_nonce(master_password, nonce)?;
        let message = raw_encode(plaintext)?;
        let ciphertext = self
            .cipher
            .engine()
            .encrypt(hashed_key.expose(), message.expose(), self.hash.engine())?;

        self.nonce = nonce;
        self.encrypted_password = Some(ciphertext.expose().to_vec());
        self.mode = PasswordMode::Encrypted;
        Ok(())
    }

    /// Calibrate an iteration count for this descriptor's algorithms.
    ///
    /// # Errors
    ///
    /// See [`kdf::benchmark_iterations`].
    pub fn benchmark_iterations(&self, budget: Duration) -> Result<u64, CryptoError> {
        kdf::benchmark_iterations(budget, self.hash.engine(), self.mac.engine())
    }

    // -----------------------------------------------------------------------
    // Text form
    // -----------------------------------------------------------------------

    /// Render the descriptor file.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        push_line(&mut out, DESCRIPTOR_HEADER, "");
        out.push('\n');
        push_line(&mut out, ID_SERVICE_NAME, &self.service_name);
        out.push('\n');
        push_line(&mut out, ID_HASH_USED, self.hash.name());
        push_line(&mut out, ID_HMAC_USED, self.mac.name());
        push_line(&mut out, ID_ITERATIONS, &self.iterations.to_string());
        push_line(&mut out, ID_NONCE, &self.nonce.to_string());
        out.push('\n');
        push_line(&mut out, ID_PASSWORD_TYPE, &self.mode.code().to_string());
        push_line(&mut out, ID_GENERATOR_USED, self.generator.name());
        push_line(&mut out, ID_CONSTRAINTS, "{");
        self.constraints.write_lines(&mut out);
        out.push_str("}\n");
        push_line(&mut out, ID_CACHED_DATA, "{");
        self.cached_data.write_lines(&mut out);
        out.push_str("}\n");
        push_line(&mut out, ID_CIPHER_USED, self.cipher.name());
        if let Some(ciphertext) = &self.encrypted_password {
            push_line(&mut out, ID_ENCRYPTED_PW, &hex_encode(ciphertext));
        }
        out
    }

    /// Parse a descriptor file.
    ///
    /// The header is the first line that is neither blank nor a comment.
    /// Fields missing from the file keep their defaults; unknown lines are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::MalformedInput` for a bad header, number,
    /// boolean, password type or hex blob, or an encrypted descriptor
    /// without ciphertext, and `CryptoError::UnsupportedAlgorithm` for an
    /// unknown algorithm name.
    pub fn parse(text: &str, registry: &AlgorithmRegistry) -> Result<Self, CryptoError> {
        let mut lines = content_lines(text);
        if lines.next().map(str::trim_end) != Some(DESCRIPTOR_HEADER) {
            return Err(CryptoError::MalformedInput(
                "missing service descriptor header".into(),
            ));
        }

        let mut descriptor = Self::new(String::new(), 0, registry);
        let mut ciphertext = None;
        while let Some(line) = lines.next() {
            if let Some(value) = line.strip_prefix(ID_SERVICE_NAME) {
                value.clone_into(&mut descriptor.service_name);
            } else if let Some(value) = line.strip_prefix(ID_HASH_USED) {
                descriptor.hash = registry.hash(value)?;
            } else if let Some(value) = line.strip_prefix(ID_HMAC_USED) {
                descriptor.mac = registry.mac(value)?;
            } else if let Some(value) = line.strip_prefix(ID_ITERATIONS) {
                descriptor.iterations = parse_number("iterations", value)?;
            } else if let Some(value) = line.strip_prefix(ID_NONCE) {
                descriptor.nonce = parse_number("nonce", value)?;
            } else if let Some(value) = line.strip_prefix(ID_PASSWORD_TYPE) {
                let code = parse_number("password_type", value)?;
                descriptor.mode = PasswordMode::from_code(code).ok_or_else(|| {
                    CryptoError::MalformedInput(format!("password_type: unknown value {code}"))
                })?;
            } else if let Some(value) = line.strip_prefix(ID_GENERATOR_USED) {
                descriptor.generator = registry.generator(value)?;
            } else if line.starts_with(ID_CONSTRAINTS) {
                for inner in lines.by_ref().take_while(|l| !l.starts_with('}')) {
                    descriptor.constraints.read_line(inner)?;
                }
            } else if line.starts_with(ID_CACHED_DATA) {
                for inner in lines.by_ref().take_while(|l| !l.starts_with('}')) {
                    descriptor.cached_data.read_line(inner)?;
                }
            } else if let Some(value) = line.strip_prefix(ID_CIPHER_USED) {
                descriptor.cipher = registry.cipher(value)?;
            } else if let Some(value) = line.strip_prefix(ID_ENCRYPTED_PW) {
                ciphertext = Some(hex_decode(value.trim_end())?);
            }
        }

        match descriptor.mode {
            PasswordMode::Encrypted => {
                if ciphertext.is_none() {
                    return Err(CryptoError::MalformedInput(format!(
                        "service {:?} is encrypted but has no encrypted_pw",
                        descriptor.service_name
                    )));
                }
                descriptor.encrypted_password = ciphertext;
            }
            PasswordMode::Generated => descriptor.encrypted_password = None,
        }
        Ok(descriptor)
    }
}

fn next_nonce(nonce: u64) -> Result<u64, CryptoError> {
    nonce
        .checked_add(1)
        .ok_or_else(|| CryptoError::MalformedInput("nonce overflow".into()))
}

fn push_line(out: &mut String, id: &str, value: &str) {
    out.push_str(id);
    out.push_str(value);
    out.push('\n');
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
