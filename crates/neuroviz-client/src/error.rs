//! Error types for the REST client.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by [`crate::ApiClient`].
#[derive(Error, Debug)]
pub enum ApiError {
    /// The backend answered 2xx but reported `success: false`.
    #[error("request rejected: {message}")]
    Rejected {
        /// Message from the response envelope.
        message: String,
    },

    /// The backend answered 401. The stored token and the cache are gone.
    #[error("unauthorized: login required")]
    Unauthorized,

    /// The backend answered with a non-2xx status other than 401.
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Envelope message if the body carried one, else the raw body.
        message: String,
    },

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The response body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The request was rejected locally before sending.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The call needs a token and none is stored.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The token store failed.
    #[error(transparent)]
    Token(#[from] TokenError),
}

impl ApiError {
    /// Returns true if the caller must log in again.
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::NotAuthenticated)
    }
}

/// Errors from a [`crate::TokenStore`].
#[derive(Error, Debug)]
pub enum TokenError {
    /// Reading or writing the token file failed.
    #[error("token file {path}: {source}")]
    Io {
        /// Token file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
