//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` provides the same interface as the WebSocket driver but for
//! deterministic testing. It implements [`Driver`] so the same
//! [`neuroviz_app::Runtime`] orchestration code runs in both production and
//! simulation.
//!
//! A [`SimRemote`] plays the server side: it injects frames, drops or refuses
//! connections, and inspects what the client sent. Optionally the driver
//! answers control messages itself the way the streaming backend does.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use neuroviz_app::Driver;
use neuroviz_proto::{ControlMessage, EegFrame, InboundMessage, StreamNotice};
use tokio::sync::Notify;

use crate::SignalGenerator;

/// Error type for simulation driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimDriverError(pub String);

impl std::fmt::Display for SimDriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SimDriverError: {}", self.0)
    }
}

impl std::error::Error for SimDriverError {}

/// Something the server side put on the socket.
#[derive(Debug, Clone)]
enum Incoming {
    Text(String),
    Close,
    Error(String),
}

/// Shared state between driver and remote.
#[derive(Default)]
struct SharedState {
    connected: bool,
    refuse_next: Option<String>,
    refuse_send: Option<String>,
    connect_urls: Vec<String>,
    client_closes: usize,
    incoming: VecDeque<Incoming>,
    sent: Vec<String>,
    backend: Option<SignalGenerator>,
}

#[derive(Default)]
struct Shared {
    state: Mutex<SharedState>,
    wakeup: Notify,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, SharedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, incoming: Incoming) {
        self.lock().incoming.push_back(incoming);
        self.wakeup.notify_one();
    }
}

/// Simulation driver for deterministic testing.
///
/// Implements [`Driver`] so the same [`neuroviz_app::Runtime`] orchestration
/// code runs in both production and simulation tests.
pub struct SimDriver {
    shared: Arc<Shared>,
}

impl SimDriver {
    /// Create a driver and the remote that controls its server side.
    pub fn new() -> (Self, SimRemote) {
        let shared = Arc::new(Shared::default());
        (Self { shared: Arc::clone(&shared) }, SimRemote { shared })
    }

    /// Create a driver whose server answers control messages like the
    /// streaming backend, generating frames from `seed`.
    pub fn with_backend(seed: u64) -> (Self, SimRemote) {
        let (driver, remote) = Self::new();
        remote.shared.lock().backend = Some(SignalGenerator::new(seed));
        (driver, remote)
    }

    /// Backend reaction to a control message.
    fn respond(state: &mut SharedState, text: &str) {
        let Some(generator) = state.backend.as_mut() else {
            return;
        };
        let reply = match ControlMessage::decode(text) {
            Ok(ControlMessage::StartStream) => InboundMessage::StreamStarted(StreamNotice {
                timestamp: None,
                message: Some("EEG stream started".to_owned()),
            }),
            Ok(ControlMessage::StopStream) => InboundMessage::StreamStopped(StreamNotice {
                timestamp: None,
                message: Some("EEG stream stopped".to_owned()),
            }),
            Ok(ControlMessage::GenerateData) => InboundMessage::EegData(generator.next_frame()),
            Err(e) => {
                tracing::debug!(error = %e, "simulated backend ignoring frame");
                return;
            },
        };
        match reply.encode() {
            Ok(text) => state.incoming.push_back(Incoming::Text(text)),
            Err(e) => tracing::warn!(error = %e, "simulated backend failed to encode reply"),
        }
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;

    async fn connect(&mut self, url: &str) -> Result<(), Self::Error> {
        let mut state = self.shared.lock();
        state.connect_urls.push(url.to_owned());
        if let Some(reason) = state.refuse_next.take() {
            return Err(SimDriverError(reason));
        }
        state.connected = true;
        state.incoming.clear();
        Ok(())
    }

    async fn send_text(&mut self, text: String) -> Result<(), Self::Error> {
        let mut state = self.shared.lock();
        if !state.connected {
            return Err(SimDriverError("not connected".to_owned()));
        }
        if let Some(reason) = state.refuse_send.take() {
            state.connected = false;
            return Err(SimDriverError(reason));
        }
        Self::respond(&mut state, &text);
        state.sent.push(text);
        drop(state);
        self.shared.wakeup.notify_one();
        Ok(())
    }

    async fn recv_frame(&mut self) -> Option<Result<String, Self::Error>> {
        loop {
            {
                let mut state = self.shared.lock();
                if !state.connected {
                    return None;
                }
                match state.incoming.pop_front() {
                    Some(Incoming::Text(text)) => return Some(Ok(text)),
                    Some(Incoming::Close) => {
                        state.connected = false;
                        return None;
                    },
                    Some(Incoming::Error(reason)) => {
                        state.connected = false;
                        return Some(Err(SimDriverError(reason)));
                    },
                    None => {},
                }
            }
            self.shared.wakeup.notified().await;
        }
    }

    async fn close(&mut self) {
        let mut state = self.shared.lock();
        if state.connected {
            state.client_closes += 1;
        }
        state.connected = false;
        state.incoming.clear();
    }

    fn is_connected(&self) -> bool {
        self.shared.lock().connected
    }
}

/// Server side of a [`SimDriver`].
#[derive(Clone)]
pub struct SimRemote {
    shared: Arc<Shared>,
}

impl SimRemote {
    /// Deliver a text frame to the client.
    pub fn inject_text(&self, text: impl Into<String>) {
        self.shared.push(Incoming::Text(text.into()));
    }

    /// Deliver an `eeg_data` frame to the client.
    pub fn inject_frame(&self, frame: EegFrame) {
        if let Ok(text) = InboundMessage::EegData(frame).encode() {
            self.inject_text(text);
        }
    }

    /// Close the socket from the server side.
    pub fn close_connection(&self) {
        self.shared.push(Incoming::Close);
    }

    /// Kill the socket with an I/O error.
    pub fn fail_connection(&self, reason: impl Into<String>) {
        self.shared.push(Incoming::Error(reason.into()));
    }

    /// Make the next connection attempt fail.
    pub fn refuse_next_connect(&self, reason: impl Into<String>) {
        self.shared.lock().refuse_next = Some(reason.into());
    }

    /// Make the next send fail and kill the socket.
    pub fn fail_next_send(&self, reason: impl Into<String>) {
        self.shared.lock().refuse_send = Some(reason.into());
    }

    /// Every text frame the client sent, in order.
    pub fn sent(&self) -> Vec<String> {
        self.shared.lock().sent.clone()
    }

    /// Sent frames decoded as control messages.
    pub fn sent_messages(&self) -> Vec<ControlMessage> {
        self.sent().iter().filter_map(|text| ControlMessage::decode(text).ok()).collect()
    }

    /// Number of `generate_data` requests sent.
    pub fn data_requests(&self) -> usize {
        self.sent_messages().into_iter().filter(|m| *m == ControlMessage::GenerateData).count()
    }

    /// URLs of every connection attempt.
    pub fn connect_attempts(&self) -> Vec<String> {
        self.shared.lock().connect_urls.clone()
    }

    /// Number of sockets the client closed.
    pub fn client_closes(&self) -> usize {
        self.shared.lock().client_closes
    }

    /// Returns true if a socket is open.
    pub fn is_connected(&self) -> bool {
        self.shared.lock().connected
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn backend_answers_control_messages() {
        let (mut driver, remote) = SimDriver::with_backend(1);
        driver.connect("ws://sim/ws/stream").await.unwrap();
        driver.send_text(ControlMessage::GenerateData.encode().unwrap()).await.unwrap();

        let text = driver.recv_frame().await.unwrap().unwrap();
        assert!(matches!(InboundMessage::decode(&text), Ok(InboundMessage::EegData(_))));
        assert_eq!(remote.data_requests(), 1);
    }

    #[tokio::test]
    async fn server_close_ends_stream() {
        let (mut driver, remote) = SimDriver::new();
        driver.connect("ws://sim").await.unwrap();
        remote.inject_text("hello");
        remote.close_connection();

        assert_eq!(driver.recv_frame().await.unwrap().unwrap(), "hello");
        assert!(driver.recv_frame().await.is_none());
        assert!(!driver.is_connected());
        assert_eq!(remote.client_closes(), 0);
    }

    #[tokio::test]
    async fn refused_connect_reports_error() {
        let (mut driver, remote) = SimDriver::new();
        remote.refuse_next_connect("connection refused");

        assert!(driver.connect("ws://sim").await.is_err());
        assert!(!driver.is_connected());
        assert!(driver.connect("ws://sim").await.is_ok());
        assert_eq!(remote.connect_attempts().len(), 2);
    }
}
