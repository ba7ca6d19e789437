//! Error types for the feature registry.

use thiserror::Error;

/// Errors raised when resolving features or feature values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeatureError {
    /// No feature matches the given name or code text.
    #[error("Invalid VCP feature: {0:?}")]
    NotFound(String),

    /// The input is neither a hex value nor a value name of the feature.
    #[error("Unexpected value {input:?} for feature {feature:?}")]
    InvalidValue {
        /// Feature the value was meant for.
        feature: String,
        /// Input as given.
        input: String,
    },

    /// Text that should be a one-byte hex code is not.
    #[error("Invalid feature code {0:?}")]
    InvalidCode(String),

    /// Two features would share one name.
    #[error("Feature name {name:?} is already used by 0x{code:02X}")]
    DuplicateName {
        /// Name in conflict.
        name: String,
        /// Code already holding the name.
        code: u8,
    },
}
