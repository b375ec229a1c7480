//! Application settings, stored as plain JSON in the data directory.
//!
//! Settings hold no secrets: the acceptable derivation latency and the
//! iteration count calibrated for it on this machine.

use std::fs;
use std::path::Path;
use std::time::Duration;

use hashish_crypto_core::kdf::benchmark_iterations;
use hashish_crypto_core::registry::AlgorithmRegistry;
use serde::{Deserialize, Serialize};

use crate::error::VaultError;

// ── Settings ───────────────────────────────────────────────────────

/// Persisted application settings.
///
/// Stored in `{data_dir}/settings.json`. Missing fields take their
/// defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// How long deriving one password may take, in milliseconds.
    #[serde(default = "default_latency")]
    pub acceptable_latency_ms: u64,

    /// Iterations given to new services; calibrated for the latency.
    #[serde(default)]
    pub default_iterations: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            acceptable_latency_ms: default_latency(),
            default_iterations: 0,
        }
    }
}

fn default_latency() -> u64 {
    u64::try_from(hashish_crypto_core::DEFAULT_ACCEPTABLE_LATENCY.as_millis()).unwrap_or(50)
}

// ── File I/O ───────────────────────────────────────────────────────

const SETTINGS_FILE: &str = "settings.json";

impl Settings {
    /// The latency budget as a [`Duration`].
    #[must_use]
    pub const fn latency(&self) -> Duration {
        Duration::from_millis(self.acceptable_latency_ms)
    }

    /// Load settings from `{data_dir}/settings.json`.
    ///
    /// Returns [`Default::default()`] when the file is missing or
    /// contains invalid JSON.
    #[must_use]
    pub fn load(data_dir: &Path) -> Self {
        Self::try_load(data_dir).unwrap_or_default()
    }

    fn try_load(data_dir: &Path) -> Option<Self> {
        let contents = fs::read_to_string(data_dir.join(SETTINGS_FILE)).ok()?;
        match serde_json::from_str(&contents) {
            Ok(settings) => Some(settings),
            Err(e) => {
                tracing::warn!(error = %e, "corrupt settings file, using defaults");
                None
            }
        }
    }

    /// Load settings, calibrating and saving them first if there are none.
    ///
    /// A missing or corrupt file triggers a benchmark at the default
    /// latency. A file without a calibrated iteration count is benchmarked
    /// at its own latency, or the default one if that is zero.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::Calibration` if the benchmark yields zero
    /// iterations, and propagates benchmark and write failures.
    pub fn load_or_calibrate(data_dir: &Path, registry: &AlgorithmRegistry) -> Result<Self, VaultError> {
        let mut settings = match Self::try_load(data_dir) {
            Some(settings) if settings.default_iterations > 0 => return Ok(settings),
            Some(settings) if settings.acceptable_latency_ms > 0 => settings,
            _ => Self::default(),
        };
        let latency_ms = settings.acceptable_latency_ms;
        settings.set_latency(latency_ms, registry)?;
        settings.save(data_dir)?;
        tracing::info!(
            latency_ms = settings.acceptable_latency_ms,
            iterations = settings.default_iterations,
            "calibrated default iterations"
        );
        Ok(settings)
    }

    /// Calibrate for a new latency budget.
    ///
    /// Blocks for `latency_ms`. Settings are only changed on success; the
    /// caller persists them with [`Settings::save`].
    ///
    /// # Errors
    ///
    /// Returns `VaultError::Calibration` if no iteration fits in the
    /// budget, and propagates benchmark failures.
    pub fn set_latency(&mut self, latency_ms: u64, registry: &AlgorithmRegistry) -> Result<(), VaultError> {
        let iterations = benchmark_iterations(
            Duration::from_millis(latency_ms),
            registry.default_hash().engine(),
            registry.default_mac().engine(),
        )?;
        if iterations == 0 {
            return Err(VaultError::Calibration(format!(
                "no hash iteration fits in {latency_ms} ms"
            )));
        }
        self.acceptable_latency_ms = latency_ms;
        self.default_iterations = iterations;
        Ok(())
    }

    /// Persist settings to `{data_dir}/settings.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file system rejects the write or rename.
    pub fn save(&self, data_dir: &Path) -> Result<(), VaultError> {
        let json = serde_json::to_string_pretty(self)?;
        write_atomic(data_dir, SETTINGS_FILE, &json)?;
        Ok(())
    }
}

/// Write `{dir}/{file_name}` through a `.tmp` file and a rename.
///
/// The file is owner-only on Unix.
pub(crate) fn write_atomic(dir: &Path, file_name: &str, contents: &str) -> std::io::Result<()> {
    let path = dir.join(file_name);
    let tmp = dir.join(format!(".{file_name}.tmp"));

    fs::write(&tmp, contents)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))?;
    }

    fs::rename(&tmp, &path)
}

// ── Tests ──────────────────────────────────────────────────────────
