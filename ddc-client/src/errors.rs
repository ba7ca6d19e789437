//! Error types for the monitor facade.

use ddc_features::FeatureError;
use ddc_protocol::DdcError;
use thiserror::Error;

/// Errors that can occur while talking to a monitor.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Bus or protocol failure.
    #[error(transparent)]
    Ddc(#[from] DdcError),

    /// Feature or value could not be resolved.
    #[error(transparent)]
    Feature(#[from] FeatureError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// No discovered monitor matches the selection.
    #[error("No monitor matches {0:?}")]
    NoSuchMonitor(String),
}

impl MonitorError {
    /// Returns true if this error is potentially retryable.
    ///
    /// Only IO and checksum failures are transient; everything else fails the
    /// same way on every attempt.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Ddc(e) => e.is_retryable(),
            Self::Feature(_) | Self::Config(_) | Self::NoSuchMonitor(_) => false,
        }
    }

    /// Returns true if this error is fatal (not retryable).
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !self.is_retryable()
    }
}
