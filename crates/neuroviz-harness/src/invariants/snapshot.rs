//! Observable session state for invariant checking.

use neuroviz_core::{BandPower, ConnectionState, StreamSession, StreamState};
use serde::Serialize;

/// Everything the invariants look at, extracted from a [`StreamSession`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    /// Socket state.
    pub connection: ConnectionState,
    /// Streaming state.
    pub stream: StreamState,
    /// Whether the session believes a tick timer runs.
    pub timer_running: bool,
    /// Control messages waiting for the socket.
    pub queued_messages: usize,
    /// Samples in history.
    pub history_len: usize,
    /// History capacity.
    pub history_capacity: usize,
    /// Sequence numbers in history, oldest first.
    pub sequences: Vec<u64>,
    /// Channels carried by the latest sample.
    pub latest_channels: Vec<String>,
    /// Band-power snapshot, in order.
    pub band_power: Vec<(String, BandPower)>,
    /// Selected channels.
    pub selected: Vec<String>,
}

impl SessionSnapshot {
    /// Extract a snapshot from `session`.
    pub fn from_session(session: &StreamSession) -> Self {
        let history = session.history();
        Self {
            connection: session.connection_state(),
            stream: session.stream_state(),
            timer_running: session.is_timer_running(),
            queued_messages: session.queued_messages().len(),
            history_len: history.len(),
            history_capacity: history.capacity(),
            sequences: history.iter().map(|sample| sample.sequence).collect(),
            latest_channels: history
                .latest()
                .map(|sample| sample.channel_samples.keys().cloned().collect())
                .unwrap_or_default(),
            band_power: session
                .band_power()
                .iter()
                .map(|(channel, power)| (channel.to_owned(), *power))
                .collect(),
            selected: session.selected_channels().as_slice().to_vec(),
        }
    }
}
