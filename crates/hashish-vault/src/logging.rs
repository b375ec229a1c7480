//! Process-wide `tracing` setup.
//!
//! Events go to stderr, or to `error_log.txt` in a log directory. The
//! filter comes from `RUST_LOG` when set, otherwise from `level`.

use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::VaultError;

/// Log file written inside the log directory.
pub const ERROR_LOG_FILE: &str = "error_log.txt";

/// Install the global subscriber.
///
/// With a `log_dir`, events are appended to `{log_dir}/error_log.txt`
/// through a background writer; keep the returned guard alive until exit
/// so buffered lines are flushed. A subscriber that is already installed
/// is left in place.
///
/// # Errors
///
/// Returns `VaultError::Logging` for an unparsable filter or an
/// unopenable log file, and an I/O error if `log_dir` cannot be created.
pub fn init_logging(level: &str, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>, VaultError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| VaultError::Logging(format!("invalid log filter {level:?}: {e}")))?;

    let Some(dir) = log_dir else {
        let installed = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init();
        if let Err(e) = installed {
            tracing::debug!(error = %e, "subscriber already installed");
        }
        return Ok(None);
    };

    fs::create_dir_all(dir)?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(ERROR_LOG_FILE)
        .build(dir)
        .map_err(|e| VaultError::Logging(format!("cannot open {ERROR_LOG_FILE}: {e}")))?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init();
    if let Err(e) = installed {
        tracing::debug!(error = %e, "subscriber already installed");
    }
    Ok(Some(guard))
}
