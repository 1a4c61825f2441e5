//! Commands sent from a [`crate::SessionHandle`] to the runtime.

use neuroviz_core::ChannelError;
use tokio::sync::oneshot;

/// User operations, delivered to the runtime in order.
#[derive(Debug)]
pub enum SessionCommand {
    /// Begin streaming, connecting first if needed.
    Start,
    /// Stop requesting data, keep the socket.
    Stop,
    /// Stop, close the socket and clear buffers.
    Disconnect,
    /// Clear buffers only.
    Reset,
    /// Add a channel to the display selection.
    Select {
        /// Channel name.
        channel: String,
        /// Whether the selection changed.
        reply: oneshot::Sender<Result<bool, ChannelError>>,
    },
    /// Remove a channel from the display selection.
    Deselect {
        /// Channel name.
        channel: String,
        /// Whether the selection changed.
        reply: oneshot::Sender<bool>,
    },
    /// Tear the session down and exit the runtime.
    Shutdown,
}
