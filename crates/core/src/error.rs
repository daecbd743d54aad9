//! Error model.

use thiserror::Error;

/// Result type used by the fallible edges of the workspace.
pub type BindyResult<T> = Result<T, BindyError>;

/// Errors raised outside the event facade.
///
/// The facade itself never fails: malformed requests are absorbed as no-ops.
/// These variants only cover parsing at the boundaries (identifiers, config).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BindyError {
    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A configuration document could not be read.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl BindyError {
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
