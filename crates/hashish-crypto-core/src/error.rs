//! Error types for `hashish-crypto-core`.

use thiserror::Error;

/// Which pluggable role an algorithm name was looked up for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlgorithmKind {
    /// Cryptographic hash (`hash_used`).
    Hash,
    /// Keyed MAC (`hmac_used`).
    Mac,
    /// Legacy password cipher (`cipher_used`).
    Cipher,
    /// Constrained password generator (`generator_used`).
    Generator,
}

impl std::fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Hash => "hash",
            Self::Mac => "HMAC",
            Self::Cipher => "password cipher",
            Self::Generator => "password generator",
        })
    }
}

/// Errors produced by the derivation engine.
///
/// None of these carry secret material: messages may name services,
/// algorithms or public test vectors, never keys or passwords.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// A scratch buffer could not be allocated.
    #[error("allocation of {0} failed")]
    Allocation(&'static str),

    /// Hex/raw decoding failure, wrong word-array length, or a malformed
    /// descriptor line.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The constraints contradict themselves; no search was attempted.
    #[error("unmatchable constraints: {0}")]
    UnmatchableConstraints(String),

    /// The constraint search ran out of candidates without a match.
    #[error("no password matching the constraints within {attempts} candidates")]
    ConstraintSearchExhausted {
        /// Number of candidates tried.
        attempts: u64,
    },

    /// A named algorithm is not registered.
    #[error("unsupported {kind}: {name}")]
    UnsupportedAlgorithm {
        /// Role the name was looked up for.
        kind: AlgorithmKind,
        /// The unknown name, as found in the input.
        name: String,
    },

    /// The operation does not apply to the descriptor's password mode.
    #[error("operation requires a {0} password")]
    WrongPasswordMode(&'static str),

    /// A computed result disagrees with a known vector.
    #[error("{algorithm} self-test mismatch\ngot result : {got}\nexpected   : {expected}")]
    SelfTestMismatch {
        /// Name of the algorithm under test.
        algorithm: String,
        /// What was computed.
        got: String,
        /// What the vector file says.
        expected: String,
    },

    /// A test-vector file has a bad header or an unusable line.
    #[error("test vector file error: {0}")]
    SelfTestFile(String),
}
