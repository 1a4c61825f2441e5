//! Errors surfaced to session owners.

use neuroviz_core::ChannelError;
use thiserror::Error;

/// Errors returned by [`crate::SessionHandle`].
///
/// Socket failures never appear here; they are reported through
/// [`crate::SessionView::last_error`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandleError {
    /// The runtime has exited.
    #[error("session runtime has shut down")]
    Closed,

    /// Channel selection was rejected.
    #[error(transparent)]
    Channel(#[from] ChannelError),
}
