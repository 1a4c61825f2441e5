//! Live stream session core for NeuroViz.
//!
//! Pure state machine for one logical streaming session: connection lifecycle,
//! start/stop/reset transitions, bounded sample history and the derived
//! band-power snapshot.
//!
//! # Architecture
//!
//! The session follows the Sans-IO, action-based pattern. Socket callbacks and
//! timer ticks arrive as a closed set of [`SessionEvent`]s; user operations
//! are methods. Both return [`SessionAction`]s that the caller executes
//! against a real (or simulated) socket and timer. Nothing here performs I/O,
//! so every transition is unit-testable without a network.
//!
//! # Components
//!
//! - [`StreamSession`]: the state machine
//! - [`History`] / [`Sample`]: bounded FIFO of received samples
//! - [`BandPower`] / [`BandPowerSnapshot`]: derived per-channel power split
//! - [`SelectedChannels`]: ordered subset of [`AVAILABLE_CHANNELS`]
//! - [`Environment`]: time source for components that expire state

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod band_power;
pub mod channel;
pub mod env;
pub mod error;
pub mod history;
pub mod session;

pub use band_power::{BAND_WEIGHTS, Band, BandPower, BandPowerSnapshot};
pub use channel::{AVAILABLE_CHANNELS, DEFAULT_CHANNELS, SelectedChannels};
pub use env::Environment;
pub use error::{ChannelError, ConfigError, ConnectionError};
pub use history::{History, Sample};
pub use session::{
    ConnectionState, DEFAULT_CONNECT_TIMEOUT, DEFAULT_HISTORY_CAPACITY, DEFAULT_STREAM_PATH,
    DEFAULT_TICK_INTERVAL, SessionAction, SessionEvent, StreamConfig, StreamSession, StreamState,
};
