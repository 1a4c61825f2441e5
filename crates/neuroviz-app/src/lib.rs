//! Application layer for NeuroViz live streaming
//!
//! Generic runtime that drives a [`StreamSession`](neuroviz_core::StreamSession)
//! against a socket [`Driver`] and a tokio timer, so the same orchestration code
//! runs against a real WebSocket in production and a simulated socket in tests.
//!
//! # Components
//!
//! - [`Runtime`]: owns the session, the tick timer and the driver; executes
//!   session actions and feeds socket events back in
//! - [`SessionHandle`]: cloneable command/observe handle for the owning view
//! - [`SessionView`]: snapshot published after every state change
//! - [`Driver`]: trait for platform-specific socket I/O
//! - `WsDriver` (feature `transport`): WebSocket driver over tokio-tungstenite

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod command;
mod driver;
mod error;
mod handle;
mod runtime;
mod view;
#[cfg(feature = "transport")]
mod ws;

pub use command::SessionCommand;
pub use driver::Driver;
pub use error::HandleError;
pub use handle::SessionHandle;
pub use runtime::Runtime;
pub use view::{ChannelTrace, SessionView};
#[cfg(feature = "transport")]
pub use ws::{WsDriver, WsError};
