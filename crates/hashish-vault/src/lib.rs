//! `hashish-vault`: persistence around the Hashish derivation engine.
//!
//! Keeps service descriptors on disk, remembers the calibrated iteration
//! count, and sets up logging. All cryptography lives in
//! `hashish-crypto-core`; nothing secret is written here except the
//! encrypted passwords already sealed inside descriptors.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod error;
pub mod logging;
pub mod settings;
pub mod store;

pub use error::VaultError;
pub use logging::{init_logging, ERROR_LOG_FILE};
pub use settings::Settings;
pub use store::{ServiceStore, CACHE_SIZE, INDEX_FILE, SERVICES_DIR};
