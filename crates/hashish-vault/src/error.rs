//! Vault error types for `hashish-vault`.

use hashish_crypto_core::CryptoError;
use thiserror::Error;

/// Errors produced by vault operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Derivation, parsing or self-test failure (delegated from crypto-core).
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// I/O error from the filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The service index or settings could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No service is stored under this name.
    #[error("unknown service name: {0}")]
    UnknownService(String),

    /// Another service already uses this name.
    #[error("a service named {0} already exists")]
    ServiceExists(String),

    /// The name cannot be stored in a descriptor file.
    #[error("invalid service name: {0:?}")]
    InvalidServiceName(String),

    /// Every candidate descriptor file name is taken.
    #[error("no suitable file name could be found for the new service")]
    NoFreeFileName,

    /// Calibration produced no usable iteration count.
    #[error("calibration failed: {0}")]
    Calibration(String),

    /// The log filter or writer could not be set up.
    #[error("logging setup failed: {0}")]
    Logging(String),
}
