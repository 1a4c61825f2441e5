//! Live stream session state machine.
//!
//! Owns the connection lifecycle, the start/stop/reset transitions, the
//! bounded sample history and the derived band-power snapshot. Uses the action
//! pattern: socket callbacks and timer ticks come in as [`SessionEvent`]s,
//! user operations are methods, and both return [`SessionAction`]s for the
//! driver to execute. No I/O happens here.
//!
//! # State Machine
//!
//! Connection and streaming state are orthogonal:
//!
//! ```text
//!                  start()                     Opened
//! ┌──────────────┐ ──────> ┌───────────────┐ ───────> ┌─────────────────────┐
//! │ Disconnected │         │  Connecting   │          │ Connected/Streaming │
//! │     Idle     │ <────── │     Idle      │          └─────────────────────┘
//! └──────────────┘ Failed/ └───────────────┘           stop() │    ↑ start()
//!        ↑         Closed                                     ↓    │
//!        │                                            ┌─────────────────────┐
//!        └──────────────── disconnect() ───────────── │   Connected/Idle    │
//!                                                     └─────────────────────┘
//! ```
//!
//! # Invariants
//!
//! - At most one tick timer exists: `StartTimer` is never emitted while a
//!   timer is running
//! - `Streaming` implies `Connected`
//! - History length never exceeds the configured capacity
//! - Every key of the band-power snapshot was selected when the triggering
//!   sample arrived
//! - Socket failures never surface as `Err` or panic; they become state

use std::time::Duration;

use neuroviz_proto::{ControlMessage, EegFrame, InboundMessage};
use serde::Serialize;

use crate::{
    BandPowerSnapshot, ChannelError, ConfigError, ConnectionError, History, Sample,
    SelectedChannels,
};

/// Period of the `generate_data` timer (25 Hz).
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(40);

/// Number of samples kept for display.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Time allowed for the socket handshake before the attempt counts as failed.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Path of the streaming socket on the backend host.
pub const DEFAULT_STREAM_PATH: &str = "/ws/stream";

/// Socket lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConnectionState {
    /// No socket.
    Disconnected,
    /// Socket requested, open not yet confirmed.
    Connecting,
    /// Socket open.
    Connected,
}

/// Whether the session is asking the backend for data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StreamState {
    /// No timer running.
    Idle,
    /// Timer running, `generate_data` sent on every tick.
    Streaming,
}

/// Session configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConfig {
    /// WebSocket URL of the streaming endpoint.
    pub url: String,
    /// Period of the `generate_data` timer.
    pub tick_interval: Duration,
    /// Maximum number of samples kept in history.
    pub history_capacity: usize,
    /// Handshake deadline. Expiry is reported as `SessionEvent::Failed`.
    pub connect_timeout: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self::for_host("localhost")
    }
}

impl StreamConfig {
    /// Configuration for the default stream path on `host` (`host[:port]`).
    pub fn for_host(host: &str) -> Self {
        Self {
            url: format!("ws://{host}{DEFAULT_STREAM_PATH}"),
            tick_interval: DEFAULT_TICK_INTERVAL,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Check the configuration before constructing a session.
    ///
    /// # Errors
    ///
    /// - `ConfigError::ZeroCapacity` if `history_capacity` is zero
    /// - `ConfigError::ZeroInterval` if `tick_interval` is zero
    /// - `ConfigError::ZeroConnectTimeout` if `connect_timeout` is zero
    /// - `ConfigError::InvalidUrl` if `url` is not a `ws://` or `wss://` URL
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.tick_interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        if self.connect_timeout.is_zero() {
            return Err(ConfigError::ZeroConnectTimeout);
        }
        if !(self.url.starts_with("ws://") || self.url.starts_with("wss://")) {
            return Err(ConfigError::InvalidUrl(self.url.clone()));
        }
        Ok(())
    }
}

/// Events fed into the session by the driver.
///
/// Socket callbacks and timer ticks, serialized by the caller's event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The socket requested by `Connect` is open.
    Opened,
    /// A text frame arrived on the socket.
    FrameReceived(String),
    /// The socket closed.
    Closed {
        /// Close reason reported by the transport.
        reason: String,
    },
    /// The socket failed to open, or an I/O error killed it.
    Failed {
        /// Error reported by the transport.
        reason: String,
    },
    /// The tick timer fired.
    Tick,
}

/// Actions the session produces for the driver to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Open a socket to `url`. Report the outcome as `Opened` or `Failed`.
    Connect {
        /// Endpoint to connect to.
        url: String,
    },
    /// Send a control message on the open socket.
    Send(ControlMessage),
    /// Close the socket, if any.
    Close,
    /// Start the periodic tick timer. Each firing is reported as `Tick`.
    StartTimer {
        /// Timer period.
        interval: Duration,
    },
    /// Cancel the tick timer.
    StopTimer,
}

/// Live stream session state machine.
///
/// Exactly one owner drives a session; independent views need independent
/// sessions.
#[derive(Debug, Clone)]
pub struct StreamSession {
    config: StreamConfig,
    connection: ConnectionState,
    stream: StreamState,
    /// `start()` was called while connecting; stream once the socket opens.
    start_pending: bool,
    /// Control messages waiting for the socket to open.
    outbox: Vec<ControlMessage>,
    timer_running: bool,
    selected: SelectedChannels,
    history: History,
    band_power: BandPowerSnapshot,
    next_sequence: u64,
    last_error: Option<ConnectionError>,
}

impl StreamSession {
    /// Create a disconnected, idle session with the default channel selection.
    pub fn new(config: StreamConfig) -> Self {
        Self::with_channels(config, SelectedChannels::default())
    }

    /// Create a disconnected, idle session with `selected` channels.
    pub fn with_channels(config: StreamConfig, selected: SelectedChannels) -> Self {
        let history = History::with_capacity(config.history_capacity);
        Self {
            config,
            connection: ConnectionState::Disconnected,
            stream: StreamState::Idle,
            start_pending: false,
            outbox: Vec::new(),
            timer_running: false,
            selected,
            history,
            band_power: BandPowerSnapshot::new(),
            next_sequence: 0,
            last_error: None,
        }
    }

    /// Begin streaming.
    ///
    /// Opens a socket if there is none. `start_stream` is sent as soon as the
    /// socket is open, followed by a timer that requests data every tick.
    /// Idempotent: while streaming, or while a start is already waiting on a
    /// connecting socket, this returns no actions.
    pub fn start(&mut self) -> Vec<SessionAction> {
        match (self.connection, self.stream) {
            (_, StreamState::Streaming) => {
                tracing::debug!("start ignored, already streaming");
                vec![]
            },
            (ConnectionState::Connecting, StreamState::Idle) => {
                if !self.start_pending {
                    self.start_pending = true;
                    self.outbox.push(ControlMessage::StartStream);
                }
                vec![]
            },
            (ConnectionState::Disconnected, StreamState::Idle) => {
                self.connection = ConnectionState::Connecting;
                self.start_pending = true;
                self.outbox.clear();
                self.outbox.push(ControlMessage::StartStream);

                tracing::info!(url = %self.config.url, "connecting to stream");
                vec![SessionAction::Connect { url: self.config.url.clone() }]
            },
            (ConnectionState::Connected, StreamState::Idle) => self.begin_streaming(),
        }
    }

    /// Stop requesting data. The socket stays open.
    pub fn stop(&mut self) -> Vec<SessionAction> {
        let mut actions = Vec::new();

        if self.connection == ConnectionState::Connected {
            actions.push(SessionAction::Send(ControlMessage::StopStream));
        }
        if self.timer_running {
            self.timer_running = false;
            actions.push(SessionAction::StopTimer);
        }

        self.start_pending = false;
        self.outbox.clear();
        self.stream = StreamState::Idle;
        actions
    }

    /// Stop, close the socket and clear history and band power.
    ///
    /// The state is `Disconnected` immediately; the transport's close
    /// confirmation may arrive later and is ignored.
    pub fn disconnect(&mut self) -> Vec<SessionAction> {
        let mut actions = self.stop();
        actions.push(SessionAction::Close);

        if self.connection != ConnectionState::Disconnected {
            tracing::info!("disconnecting from stream");
        }
        self.connection = ConnectionState::Disconnected;
        self.clear_buffers();
        actions
    }

    /// Clear history and band power. Connection and streaming are unaffected.
    pub fn reset(&mut self) {
        self.clear_buffers();
    }

    /// Release the timer and the socket because the owner is going away.
    ///
    /// Unlike [`Self::disconnect`], nothing is sent to the backend.
    pub fn teardown(&mut self) -> Vec<SessionAction> {
        let mut actions = Vec::new();

        if self.timer_running {
            self.timer_running = false;
            actions.push(SessionAction::StopTimer);
        }
        if self.connection != ConnectionState::Disconnected {
            actions.push(SessionAction::Close);
        }

        self.connection = ConnectionState::Disconnected;
        self.stream = StreamState::Idle;
        self.start_pending = false;
        self.outbox.clear();
        actions
    }

    /// Add `name` to the displayed channels. Only future samples are affected.
    ///
    /// Returns `Ok(false)` if it was already selected.
    ///
    /// # Errors
    ///
    /// - `ChannelError::Unknown` if `name` is not in the catalog
    pub fn select_channel(&mut self, name: &str) -> Result<bool, ChannelError> {
        self.selected.select(name)
    }

    /// Remove `name` from the displayed channels. Only future samples are
    /// affected.
    pub fn deselect_channel(&mut self, name: &str) -> bool {
        self.selected.deselect(name)
    }

    /// Process a socket or timer event.
    pub fn handle(&mut self, event: SessionEvent) -> Vec<SessionAction> {
        match event {
            SessionEvent::Opened => self.handle_opened(),
            SessionEvent::FrameReceived(text) => {
                self.handle_frame(&text);
                vec![]
            },
            SessionEvent::Closed { reason } | SessionEvent::Failed { reason } => {
                self.handle_connection_lost(reason)
            },
            SessionEvent::Tick => {
                if self.stream == StreamState::Streaming
                    && self.connection == ConnectionState::Connected
                {
                    vec![SessionAction::Send(ControlMessage::GenerateData)]
                } else {
                    vec![]
                }
            },
        }
    }

    fn begin_streaming(&mut self) -> Vec<SessionAction> {
        let mut actions = vec![SessionAction::Send(ControlMessage::StartStream)];
        actions.extend(self.enter_streaming());
        actions
    }

    fn enter_streaming(&mut self) -> Option<SessionAction> {
        self.start_pending = false;
        self.stream = StreamState::Streaming;

        if self.timer_running {
            return None;
        }
        self.timer_running = true;
        tracing::debug!(interval = ?self.config.tick_interval, "starting tick timer");
        Some(SessionAction::StartTimer { interval: self.config.tick_interval })
    }

    fn handle_opened(&mut self) -> Vec<SessionAction> {
        if self.connection != ConnectionState::Connecting {
            tracing::debug!(state = ?self.connection, "ignoring open for abandoned socket");
            return vec![];
        }

        tracing::info!(url = %self.config.url, "stream connected");
        self.connection = ConnectionState::Connected;
        self.last_error = None;

        let mut actions: Vec<_> = self.outbox.drain(..).map(SessionAction::Send).collect();
        if self.start_pending {
            actions.extend(self.enter_streaming());
        }
        actions
    }

    fn handle_connection_lost(&mut self, reason: String) -> Vec<SessionAction> {
        let error = match self.connection {
            ConnectionState::Disconnected => {
                tracing::debug!(%reason, "ignoring close for abandoned socket");
                return vec![];
            },
            ConnectionState::Connecting => ConnectionError::Failed { reason },
            ConnectionState::Connected => ConnectionError::Dropped { reason },
        };
        tracing::warn!(error = %error, "stream connection lost");

        self.connection = ConnectionState::Disconnected;
        self.stream = StreamState::Idle;
        self.start_pending = false;
        self.outbox.clear();
        self.last_error = Some(error);

        if self.timer_running {
            self.timer_running = false;
            vec![SessionAction::StopTimer]
        } else {
            vec![]
        }
    }

    fn handle_frame(&mut self, text: &str) {
        if self.connection != ConnectionState::Connected {
            tracing::debug!(state = ?self.connection, "dropping frame received without socket");
            return;
        }

        match InboundMessage::decode(text) {
            Ok(InboundMessage::EegData(frame)) => self.ingest(frame),
            Ok(InboundMessage::StreamStarted(notice)) => {
                tracing::debug!(message = ?notice.message, "backend started stream");
            },
            Ok(InboundMessage::StreamStopped(notice)) => {
                tracing::debug!(message = ?notice.message, "backend stopped stream");
            },
            Ok(InboundMessage::Unknown { kind }) => {
                tracing::trace!(%kind, "ignoring unhandled frame type");
            },
            Err(e) => {
                tracing::debug!(error = %e, syntax = e.is_syntax(), "dropping malformed frame");
            },
        }
    }

    fn ingest(&mut self, frame: EegFrame) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        let channel_samples = frame
            .data
            .into_iter()
            .filter(|(channel, _)| self.selected.contains(channel))
            .collect();

        let sample = Sample {
            sequence,
            server_timestamp: frame.timestamp,
            sample_rate: frame.sample_rate,
            channel_samples,
        };

        self.band_power = BandPowerSnapshot::derive(&sample, &self.selected);
        self.history.push(sample);
    }

    fn clear_buffers(&mut self) {
        self.history.clear();
        self.band_power.clear();
    }

    /// Current connection state.
    pub fn connection_state(&self) -> ConnectionState {
        self.connection
    }

    /// Current streaming state.
    pub fn stream_state(&self) -> StreamState {
        self.stream
    }

    /// Returns true if the socket is open.
    pub fn is_connected(&self) -> bool {
        self.connection == ConnectionState::Connected
    }

    /// Returns true if the tick timer is requesting data.
    pub fn is_streaming(&self) -> bool {
        self.stream == StreamState::Streaming
    }

    /// Returns true if the session believes a tick timer is running.
    pub fn is_timer_running(&self) -> bool {
        self.timer_running
    }

    /// Control messages waiting for the socket to open.
    pub fn queued_messages(&self) -> &[ControlMessage] {
        &self.outbox
    }

    /// Received samples, oldest first.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Band power derived from the latest sample.
    pub fn band_power(&self) -> &BandPowerSnapshot {
        &self.band_power
    }

    /// Displayed channels.
    pub fn selected_channels(&self) -> &SelectedChannels {
        &self.selected
    }

    /// Latest connection failure. Cleared when a socket opens.
    pub fn last_error(&self) -> Option<&ConnectionError> {
        self.last_error.as_ref()
    }

    /// Session configuration.
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }
}
