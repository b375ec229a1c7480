//! `hashish-crypto-core`: deterministic per-service password derivation.
//!
//! Pure and synchronous: the only text this crate reads is its own embedded
//! test vectors. Persistence lives in `hashish-vault`.
//!
//! Everything operates on arrays of 64-bit words:
//! - [`words`]: text and hex to words and back
//! - [`hash`], [`hmac`], [`cipher`], [`password`]: the pluggable algorithms
//! - [`registry`]: algorithm selection by name
//! - [`kdf`]: master password + service to hashed key, and calibration
//! - [`descriptor`]: per-service parameters and their text form
//! - [`selftest`]: known-answer checks for every registered algorithm

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod error;
pub mod memory;
pub mod text;
pub mod words;

pub mod cipher;
pub mod hash;
pub mod hmac;
pub mod password;

pub mod registry;

pub mod kdf;

pub mod descriptor;

pub mod selftest;

pub use cipher::{OfbChainedXorCipher, PasswordCipher};
pub use descriptor::{PasswordMode, ServiceDescriptor, DESCRIPTOR_HEADER};
pub use error::{AlgorithmKind, CryptoError};
pub use hash::{CryptoHash, Sha512};
pub use hmac::{Mac, Rfc2104Hmac};
pub use kdf::{benchmark_iterations, compute_hashed_key, DEFAULT_ACCEPTABLE_LATENCY};
pub use memory::SecretWords;
pub use password::{
    CachedData, Constraints, DefaultPasswordGenerator, PasswordGenerator, DEFAULT_MAXIMAL_LENGTH,
};
pub use registry::{
    AlgorithmRegistry, CipherAlgorithm, GeneratorAlgorithm, HashAlgorithm, MacAlgorithm,
};
pub use selftest::{run_all, run_vectors, SelfTestReport, Subject, VectorReport};
