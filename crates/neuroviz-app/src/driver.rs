//! Driver trait for abstracting socket I/O.
//!
//! The [`Driver`] trait decouples the session runtime from a specific socket
//! implementation. Production uses a WebSocket; simulation uses an in-memory
//! socket with a scripted server. The generic [`crate::Runtime`] handles all
//! orchestration.

use std::future::Future;

/// Abstracts the streaming socket for the session runtime.
///
/// At most one socket exists per driver. `connect` replaces nothing: the
/// runtime only asks for a connection when the session has none.
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Open a socket to `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket cannot be opened.
    fn connect(&mut self, url: &str) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Send a text frame on the open socket.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no socket or the write fails.
    fn send_text(&mut self, text: String) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Receive the next text frame.
    ///
    /// Returns `None` once the socket is closed, or `Some(Err)` if it failed.
    /// Either way the driver is no longer connected afterwards. Must be
    /// cancel-safe: the runtime polls it inside `select!`.
    fn recv_frame(&mut self) -> impl Future<Output = Option<Result<String, Self::Error>>> + Send;

    /// Close the socket, if any. Never fails.
    fn close(&mut self) -> impl Future<Output = ()> + Send;

    /// Check if a socket is open.
    fn is_connected(&self) -> bool;
}
