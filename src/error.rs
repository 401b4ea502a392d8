use thiserror::Error;

use crate::format::FormatError;

/// Crate-wide error type. Every variant is a deterministic input failure;
/// none of them is worth retrying.
#[derive(Debug, Error)]
pub enum BCryptError {
    #[error("Invalid secret: secret is absent")]
    InvalidSecret,

    #[error("Invalid salt: {0}")]
    InvalidSalt(FormatError),

    #[error("Invalid hash: {0}")]
    InvalidHash(FormatError),

    #[error("Invalid cost: {0}")]
    InvalidCost(String),

    /// The primitive refused input that already passed structural validation.
    #[error("Hash primitive error: {0}")]
    Primitive(String),
}

pub type Result<T> = std::result::Result<T, BCryptError>;
