//! Model-based testing for the session state machine.
//!
//! [`SessionOp`] covers every input a session can see: user commands and
//! socket events. Sequences are generated by proptest or `arbitrary` and
//! applied both to a real [`StreamSession`] (via [`apply_op`]) and to
//! [`SessionModel`], a reference implementation small enough to be obviously
//! correct. The two must agree on [`ObservedState`] after every step.

use std::collections::BTreeMap;

use arbitrary::Arbitrary;
use neuroviz_core::{
    AVAILABLE_CHANNELS, ConnectionState, SessionAction, SessionEvent, StreamSession, StreamState,
};
use neuroviz_proto::{EegFrame, InboundMessage, StreamNotice};

/// Operations that can be applied to a session.
#[derive(Debug, Clone, Arbitrary)]
pub enum SessionOp {
    /// User pressed start.
    Start,
    /// User pressed stop.
    Stop,
    /// User disconnected.
    Disconnect,
    /// User cleared the buffers.
    Reset,
    /// Select `AVAILABLE_CHANNELS[index % 9]`.
    Select {
        /// Catalog index, wrapped.
        index: u8,
    },
    /// Deselect `AVAILABLE_CHANNELS[index % 9]`.
    Deselect {
        /// Catalog index, wrapped.
        index: u8,
    },
    /// The socket opened.
    Opened,
    /// The socket closed.
    Closed,
    /// The socket failed.
    Failed,
    /// The tick timer fired.
    Tick,
    /// An `eeg_data` frame arrived.
    DataFrame {
        /// Bit `i` includes `AVAILABLE_CHANNELS[i]`.
        channel_mask: u16,
        /// Readings, repeated for every included channel.
        readings: Vec<i8>,
    },
    /// A `stream_started` or `stream_stopped` notice arrived.
    Notice {
        /// `stream_started` if true.
        started: bool,
    },
    /// A frame that is not valid JSON arrived.
    Garbage {
        /// Frame body, lossily decoded.
        bytes: Vec<u8>,
    },
}

/// Channel name for a wrapped catalog index.
pub fn channel_at(index: u8) -> &'static str {
    AVAILABLE_CHANNELS[usize::from(index) % AVAILABLE_CHANNELS.len()]
}

impl SessionOp {
    /// Build the inbound frame text for frame-carrying operations.
    pub fn frame_text(&self) -> Option<String> {
        let message = match self {
            Self::DataFrame { channel_mask, readings } => {
                let values: Vec<f64> = readings.iter().map(|&r| f64::from(r) * 0.5).collect();
                let data: BTreeMap<String, Vec<f64>> = AVAILABLE_CHANNELS
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| channel_mask & (1 << i) != 0)
                    .map(|(_, &name)| (name.to_owned(), values.clone()))
                    .collect();
                InboundMessage::EegData(EegFrame {
                    timestamp: None,
                    sample_rate: Some(256),
                    channels: Some(data.keys().cloned().collect()),
                    data,
                })
            },
            Self::Notice { started } => {
                let notice = StreamNotice { timestamp: None, message: None };
                if *started {
                    InboundMessage::StreamStarted(notice)
                } else {
                    InboundMessage::StreamStopped(notice)
                }
            },
            // A leading '#' is never valid JSON
            Self::Garbage { bytes } => {
                return Some(format!("#{}", String::from_utf8_lossy(bytes)));
            },
            _ => return None,
        };
        message.encode().ok()
    }
}

/// Apply `op` to `session`, returning the actions it produced.
pub fn apply_op(session: &mut StreamSession, op: &SessionOp) -> Vec<SessionAction> {
    match op {
        SessionOp::Start => session.start(),
        SessionOp::Stop => session.stop(),
        SessionOp::Disconnect => session.disconnect(),
        SessionOp::Reset => {
            session.reset();
            vec![]
        },
        SessionOp::Select { index } => {
            // Catalog names always select
            let _ = session.select_channel(channel_at(*index));
            vec![]
        },
        SessionOp::Deselect { index } => {
            session.deselect_channel(channel_at(*index));
            vec![]
        },
        SessionOp::Opened => session.handle(SessionEvent::Opened),
        SessionOp::Closed => session.handle(SessionEvent::Closed { reason: "closed".to_owned() }),
        SessionOp::Failed => session.handle(SessionEvent::Failed { reason: "reset".to_owned() }),
        SessionOp::Tick => session.handle(SessionEvent::Tick),
        SessionOp::DataFrame { .. } | SessionOp::Notice { .. } | SessionOp::Garbage { .. } => {
            match op.frame_text() {
                Some(text) => session.handle(SessionEvent::FrameReceived(text)),
                None => vec![],
            }
        },
    }
}

/// State compared between the model and the real session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedState {
    /// Socket state.
    pub connection: ConnectionState,
    /// Streaming state.
    pub stream: StreamState,
    /// Samples in history.
    pub history_len: usize,
    /// Selected channels in display order.
    pub selected: Vec<String>,
}

impl ObservedState {
    /// Observe a real session.
    pub fn from_session(session: &StreamSession) -> Self {
        Self {
            connection: session.connection_state(),
            stream: session.stream_state(),
            history_len: session.history().len(),
            selected: session.selected_channels().as_slice().to_vec(),
        }
    }
}

/// Reference model of a session.
#[derive(Debug, Clone)]
pub struct SessionModel {
    connection: ConnectionState,
    stream: StreamState,
    start_pending: bool,
    history_len: usize,
    capacity: usize,
    selected: Vec<String>,
}

impl SessionModel {
    /// Model of a fresh session with `capacity` history and `selected`
    /// channels.
    pub fn new(capacity: usize, selected: &[String]) -> Self {
        Self {
            connection: ConnectionState::Disconnected,
            stream: StreamState::Idle,
            start_pending: false,
            history_len: 0,
            capacity,
            selected: selected.to_vec(),
        }
    }

    /// Whether a tick in the current state requests data.
    pub fn tick_requests_data(&self) -> bool {
        self.stream == StreamState::Streaming
    }

    /// Apply `op` to the model.
    pub fn apply(&mut self, op: &SessionOp) {
        match op {
            SessionOp::Start => match (self.connection, self.stream) {
                (_, StreamState::Streaming) => {},
                (ConnectionState::Disconnected, _) => {
                    self.connection = ConnectionState::Connecting;
                    self.start_pending = true;
                },
                (ConnectionState::Connecting, _) => self.start_pending = true,
                (ConnectionState::Connected, _) => self.stream = StreamState::Streaming,
            },
            SessionOp::Stop => {
                self.stream = StreamState::Idle;
                self.start_pending = false;
            },
            SessionOp::Disconnect => {
                self.connection = ConnectionState::Disconnected;
                self.stream = StreamState::Idle;
                self.start_pending = false;
                self.history_len = 0;
            },
            SessionOp::Reset => self.history_len = 0,
            SessionOp::Select { index } => {
                let name = channel_at(*index).to_owned();
                if !self.selected.contains(&name) {
                    self.selected.push(name);
                }
            },
            SessionOp::Deselect { index } => {
                let name = channel_at(*index);
                self.selected.retain(|s| s != name);
            },
            SessionOp::Opened => {
                if self.connection == ConnectionState::Connecting {
                    self.connection = ConnectionState::Connected;
                    if self.start_pending {
                        self.stream = StreamState::Streaming;
                        self.start_pending = false;
                    }
                }
            },
            SessionOp::Closed | SessionOp::Failed => {
                if self.connection != ConnectionState::Disconnected {
                    self.connection = ConnectionState::Disconnected;
                    self.stream = StreamState::Idle;
                    self.start_pending = false;
                }
            },
            SessionOp::DataFrame { .. } => {
                if self.connection == ConnectionState::Connected {
                    self.history_len = (self.history_len + 1).min(self.capacity);
                }
            },
            SessionOp::Tick | SessionOp::Notice { .. } | SessionOp::Garbage { .. } => {},
        }
    }

    /// Current model state.
    pub fn observe(&self) -> ObservedState {
        ObservedState {
            connection: self.connection,
            stream: self.stream,
            history_len: self.history_len,
            selected: self.selected.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use neuroviz_core::StreamConfig;

    use super::*;

    #[test]
    fn data_frame_carries_masked_channels() {
        let op = SessionOp::DataFrame { channel_mask: 0b101, readings: vec![2, -4] };
        let text = op.frame_text().unwrap();
        let InboundMessage::EegData(frame) = InboundMessage::decode(&text).unwrap() else {
            unreachable!("expected eeg_data");
        };
        assert_eq!(frame.data.keys().collect::<Vec<_>>(), ["Fz", "Pz"]);
        assert_eq!(frame.data["Fz"], vec![1.0, -2.0]);
    }

    #[test]
    fn garbage_never_decodes() {
        let op = SessionOp::Garbage { bytes: br#"{"type":"eeg_data","data":{}}"#.to_vec() };
        assert!(InboundMessage::decode(&op.frame_text().unwrap()).is_err());
    }

    #[test]
    fn model_tracks_start_through_open() {
        let mut session = StreamSession::new(StreamConfig::default());
        let mut model =
            SessionModel::new(session.history().capacity(), session.selected_channels().as_slice());

        for op in [SessionOp::Start, SessionOp::Start, SessionOp::Opened, SessionOp::Tick] {
            let _ = apply_op(&mut session, &op);
            model.apply(&op);
            assert_eq!(ObservedState::from_session(&session), model.observe(), "after {op:?}");
        }
        assert!(model.tick_requests_data());
    }
}
