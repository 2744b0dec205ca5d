//! Tracing subscriber setup
//!
//! Library code only emits `tracing` events; binaries and tests call
//! [`init`] once to print them. Secrets (signatures, seeds, plaintexts,
//! private keys) are never part of any event.

use once_cell::sync::OnceCell;
use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INITIALIZED: OnceCell<()> = OnceCell::new();

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),

    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),
}

/// Install a fmt subscriber filtered by `RUST_LOG`, falling back to
/// `default_filter`. Calling it again is a no-op.
pub fn init(default_filter: &str) -> Result<(), LoggingError> {
    let fallback =
        EnvFilter::try_new(default_filter).map_err(|e| LoggingError::InvalidFilter(e.to_string()))?;

    INITIALIZED
        .get_or_try_init(|| {
            let filter = EnvFilter::try_from_default_env().unwrap_or(fallback);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_target(true))
                .try_init()
                .map_err(|e| LoggingError::InitializationFailed(e.to_string()))
        })
        .map(|_| ())
}

/// [`init`] with the filter from a [`crate::MessagingConfig`]
pub fn init_from_config(config: &crate::MessagingConfig) -> Result<(), LoggingError> {
    init(&config.log_filter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        assert!(init("debug").is_ok());
        assert!(init("info").is_ok());
        assert!(init_from_config(&crate::MessagingConfig::default()).is_ok());
    }

    #[test]
    fn test_invalid_filter() {
        assert!(matches!(
            init("sigkey_core=notalevel"),
            Err(LoggingError::InvalidFilter(_))
        ));
    }
}
