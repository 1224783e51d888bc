//! Protocol encoding errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The value is not a well-formed envelope of a known kind.
    #[error("Malformed envelope: {0}")]
    Malformed(String),

    #[error("Failed to encode envelope: {0}")]
    Encode(String),
}
