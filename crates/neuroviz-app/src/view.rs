//! Read-only snapshot of a session for renderers.

use neuroviz_core::{BandPower, ConnectionState, StreamSession, StreamState};
use serde::Serialize;

/// Signal chart data for one channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelTrace {
    /// Channel name.
    pub channel: String,
    /// `(sequence, first reading)` in arrival order.
    pub points: Vec<(u64, f64)>,
}

/// Everything a view needs to draw the streaming page.
///
/// Published by the runtime after every state change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    /// Socket state.
    pub connection: ConnectionState,
    /// Streaming state.
    pub stream: StreamState,
    /// Number of samples in history.
    pub sample_count: usize,
    /// Sequence number of the latest sample. Keeps increasing once history
    /// is full.
    pub latest_sequence: Option<u64>,
    /// Server timestamp of the latest sample.
    pub latest_timestamp: Option<f64>,
    /// One trace per selected channel, in selection order.
    pub traces: Vec<ChannelTrace>,
    /// Band power of the latest sample, in selection order at arrival.
    pub band_power: Vec<(String, BandPower)>,
    /// Selected channels, in display order.
    pub selected: Vec<String>,
    /// Latest connection failure, if not yet recovered.
    pub last_error: Option<String>,
}

impl SessionView {
    /// Snapshot `session`.
    pub fn from_session(session: &StreamSession) -> Self {
        let history = session.history();
        let traces = session
            .selected_channels()
            .iter()
            .map(|channel| ChannelTrace { channel: channel.to_owned(), points: history.trace(channel) })
            .collect();

        Self {
            connection: session.connection_state(),
            stream: session.stream_state(),
            sample_count: history.len(),
            latest_sequence: history.latest().map(|sample| sample.sequence),
            latest_timestamp: history.latest().and_then(|sample| sample.server_timestamp),
            traces,
            band_power: session
                .band_power()
                .iter()
                .map(|(channel, power)| (channel.to_owned(), *power))
                .collect(),
            selected: session.selected_channels().as_slice().to_vec(),
            last_error: session.last_error().map(ToString::to_string),
        }
    }

    /// Returns true if the socket is open.
    pub fn is_connected(&self) -> bool {
        self.connection == ConnectionState::Connected
    }

    /// Returns true if data is being requested.
    pub fn is_streaming(&self) -> bool {
        self.stream == StreamState::Streaming
    }
}

impl Default for SessionView {
    fn default() -> Self {
        Self {
            connection: ConnectionState::Disconnected,
            stream: StreamState::Idle,
            sample_count: 0,
            latest_sequence: None,
            latest_timestamp: None,
            traces: Vec::new(),
            band_power: Vec::new(),
            selected: Vec::new(),
            last_error: None,
        }
    }
}
