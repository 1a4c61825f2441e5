//! Wire format for the NeuroViz streaming socket.
//!
//! The streaming backend speaks JSON text frames over a single WebSocket. Every
//! frame is an object tagged by a `type` field:
//!
//! - [`ControlMessage`]: client to server commands (`start_stream`,
//!   `generate_data`, `stop_stream`)
//! - [`InboundMessage`]: server to client notifications, of which only
//!   `eeg_data` ([`EegFrame`]) carries signal readings
//!
//! Decoding never panics. Anything that is not valid JSON or lacks the fields
//! its `type` requires is reported as a [`ProtocolError`] so the caller can
//! drop the frame.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod control;
pub mod errors;
pub mod inbound;

pub use control::ControlMessage;
pub use errors::{ProtocolError, Result};
pub use inbound::{EegFrame, InboundMessage, StreamNotice};
