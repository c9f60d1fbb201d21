//! Error types shared by all `mixfem` operations.
use thiserror::Error;

/// Result type alias using the `mixfem` [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when configuring or running the assembly core.
///
/// All operations in this crate are pure and deterministic, so every error is final:
/// the caller has to fix its input before trying again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Invalid or missing configuration, e.g. material parameters, problem names or boundary tags.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A query outside the configured range, or inputs with incompatible sizes.
    #[error("domain error: {0}")]
    Domain(String),

    /// The operation has no meaning for the receiver.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),
}

impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn domain(msg: impl Into<String>) -> Self {
        Self::Domain(msg.into())
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedOperation(msg.into())
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    pub fn is_domain(&self) -> bool {
        matches!(self, Self::Domain(_))
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedOperation(_))
    }
}
