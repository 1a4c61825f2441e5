//! Protocol error types.

use thiserror::Error;

/// Result alias for wire format operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors raised while encoding or decoding socket frames.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Frame is not valid JSON, or its shape does not match its `type`.
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Frame is valid JSON but has no string `type` tag.
    #[error("frame has no type tag")]
    MissingType,

    /// Frame is tagged `eeg_data` but carries no `data` object.
    #[error("eeg_data frame has no data")]
    MissingData,
}

impl ProtocolError {
    /// Returns true if the frame could not be parsed as JSON at all.
    ///
    /// Distinguishes garbage on the wire from well-formed frames with the
    /// wrong shape, which matters for logging only. Both are dropped.
    pub fn is_syntax(&self) -> bool {
        match self {
            Self::Malformed(e) => e.is_syntax() || e.is_eof(),
            Self::MissingType | Self::MissingData => false,
        }
    }
}
