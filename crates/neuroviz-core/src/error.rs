//! Error types for the stream session core.
//!
//! None of these escape [`crate::StreamSession`] as panics or `Err` returns
//! from socket handling: connection failures become state, and only the
//! synchronous validation paths (channel selection, configuration) return
//! `Result`.

use thiserror::Error;

/// Socket failures observed by the session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// The socket could not be opened.
    #[error("connection failed: {reason}")]
    Failed {
        /// Transport-provided description.
        reason: String,
    },

    /// An open socket closed without the session asking for it.
    #[error("connection dropped: {reason}")]
    Dropped {
        /// Transport-provided description.
        reason: String,
    },
}

impl ConnectionError {
    /// Transport-provided description.
    pub fn reason(&self) -> &str {
        match self {
            Self::Failed { reason } | Self::Dropped { reason } => reason,
        }
    }
}

/// Channel selection errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// Name is not in the electrode catalog.
    #[error("unknown channel: {0}")]
    Unknown(String),
}

/// Invalid session configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// History must hold at least one sample.
    #[error("history capacity must be positive")]
    ZeroCapacity,

    /// The tick timer needs a non-zero period.
    #[error("tick interval must be positive")]
    ZeroInterval,

    /// The handshake needs a non-zero deadline.
    #[error("connect timeout must be positive")]
    ZeroConnectTimeout,

    /// Stream endpoint is not a WebSocket URL.
    #[error("stream url must start with ws:// or wss://, got {0}")]
    InvalidUrl(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_errors_expose_reason() {
        let failed = ConnectionError::Failed { reason: "refused".to_owned() };
        assert_eq!(failed.reason(), "refused");
        assert_eq!(failed.to_string(), "connection failed: refused");

        let dropped = ConnectionError::Dropped { reason: "reset".to_owned() };
        assert_eq!(dropped.to_string(), "connection dropped: reset");
    }
}
