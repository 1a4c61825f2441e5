//! CLI error type.

use neuroviz_app::HandleError;
use neuroviz_client::ApiError;
use neuroviz_core::{ChannelError, ConfigError};
use thiserror::Error;

/// Anything that ends a command unsuccessfully.
#[derive(Error, Debug)]
pub enum CliError {
    /// REST call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// HTTP client could not be built.
    #[error("http client setup failed: {0}")]
    HttpSetup(String),

    /// Stream configuration rejected.
    #[error("invalid stream configuration: {0}")]
    Config(#[from] ConfigError),

    /// Channel not in the catalog.
    #[error(transparent)]
    Channel(#[from] ChannelError),

    /// Session runtime went away.
    #[error("stream session: {0}")]
    Handle(#[from] HandleError),

    /// Stream ended because the connection failed.
    #[error("stream ended: {0}")]
    StreamLost(String),

    /// Session runtime task panicked or was cancelled.
    #[error("stream runtime: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// Writing output or reading an upload failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Output could not be serialized.
    #[error("output encoding: {0}")]
    Json(#[from] serde_json::Error),

    /// Argument combination the parser cannot express.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
