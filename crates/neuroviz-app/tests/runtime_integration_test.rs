//! Runtime integration tests with a minimal in-test driver.
//!
//! # Oracle Pattern
//!
//! Tests end with checks on both sides of the driver: what the runtime
//! published through the handle and what it wrote to the socket.

use std::{
    future, io,
    sync::{Arc, Mutex},
    time::Duration,
};

use neuroviz_app::{Driver, Runtime, SessionView};
use neuroviz_core::{ConnectionState, StreamConfig, StreamSession};
use tokio::sync::mpsc;

/// Socket whose server side is an unbounded channel.
struct ChannelDriver {
    connected: bool,
    refuse: bool,
    sent: Arc<Mutex<Vec<String>>>,
    incoming: mpsc::UnboundedReceiver<String>,
}

impl Driver for ChannelDriver {
    type Error = io::Error;

    async fn connect(&mut self, _url: &str) -> Result<(), Self::Error> {
        if self.refuse {
            return Err(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"));
        }
        self.connected = true;
        Ok(())
    }

    async fn send_text(&mut self, text: String) -> Result<(), Self::Error> {
        self.sent.lock().unwrap().push(text);
        Ok(())
    }

    async fn recv_frame(&mut self) -> Option<Result<String, Self::Error>> {
        let frame = self.incoming.recv().await;
        if frame.is_none() {
            self.connected = false;
        }
        frame.map(Ok)
    }

    async fn close(&mut self) {
        self.connected = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

/// Socket whose handshake never completes.
#[derive(Default)]
struct StalledDriver {
    attempts: Arc<Mutex<usize>>,
}

impl Driver for StalledDriver {
    type Error = io::Error;

    async fn connect(&mut self, _url: &str) -> Result<(), Self::Error> {
        *self.attempts.lock().unwrap() += 1;
        future::pending().await
    }

    async fn send_text(&mut self, _text: String) -> Result<(), Self::Error> {
        Err(io::Error::new(io::ErrorKind::NotConnected, "no socket"))
    }

    async fn recv_frame(&mut self) -> Option<Result<String, Self::Error>> {
        None
    }

    async fn close(&mut self) {}

    fn is_connected(&self) -> bool {
        false
    }
}

fn stalled_session(connect_timeout: Duration) -> StreamSession {
    StreamSession::new(StreamConfig { connect_timeout, ..StreamConfig::default() })
}

fn driver(refuse: bool) -> (ChannelDriver, mpsc::UnboundedSender<String>, Arc<Mutex<Vec<String>>>) {
    let (tx, incoming) = mpsc::unbounded_channel();
    let sent = Arc::new(Mutex::new(Vec::new()));
    let driver = ChannelDriver { connected: false, refuse, sent: Arc::clone(&sent), incoming };
    (driver, tx, sent)
}

#[tokio::test(start_paused = true)]
async fn ticks_request_data_while_streaming() {
    let (driver, _server, sent) = driver(false);
    let (runtime, mut handle) = Runtime::new(driver, StreamSession::new(StreamConfig::default()));
    let task = tokio::spawn(runtime.run());

    handle.start().await.unwrap();
    handle.wait_for(SessionView::is_streaming).await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    handle.stop().await.unwrap();
    handle.wait_for(|v| !v.is_streaming()).await.unwrap();

    let sent = sent.lock().unwrap().clone();
    assert_eq!(sent.first().map(String::as_str), Some(r#"{"type":"start_stream"}"#));
    assert_eq!(sent.last().map(String::as_str), Some(r#"{"type":"stop_stream"}"#));
    let requests = sent.iter().filter(|s| s.contains("generate_data")).count();
    assert!((4..=5).contains(&requests), "{requests} data requests in 200ms");

    handle.shutdown().await.unwrap();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn frames_land_in_published_view() {
    let (driver, server, _sent) = driver(false);
    let (runtime, mut handle) = Runtime::new(driver, StreamSession::new(StreamConfig::default()));
    tokio::spawn(runtime.run());

    handle.start().await.unwrap();
    handle.wait_for(SessionView::is_streaming).await.unwrap();
    server.send(r#"{"type":"eeg_data","timestamp":12.0,"data":{"Fz":[3.0,-3.0]}}"#.to_owned()).unwrap();
    let view = handle.wait_for(|v| v.sample_count == 1).await.unwrap();

    assert_eq!(view.latest_timestamp, Some(12.0));
    assert_eq!(view.latest_sequence, Some(0));
    assert_eq!(view.band_power.len(), 1);
    assert!((view.band_power[0].1.total() - 9.0).abs() < 1e-9);
}

#[tokio::test(start_paused = true)]
async fn refused_connect_publishes_failure() {
    let (driver, _server, sent) = driver(true);
    let (runtime, mut handle) = Runtime::new(driver, StreamSession::new(StreamConfig::default()));
    tokio::spawn(runtime.run());

    handle.start().await.unwrap();
    let view = handle.wait_for(|v| v.last_error.is_some()).await.unwrap();

    assert_eq!(view.connection, ConnectionState::Disconnected);
    assert_eq!(view.last_error.as_deref(), Some("connection failed: refused"));
    assert!(sent.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn server_hangup_publishes_drop() {
    let (driver, server, _sent) = driver(false);
    let (runtime, mut handle) = Runtime::new(driver, StreamSession::new(StreamConfig::default()));
    let task = tokio::spawn(runtime.run());

    handle.start().await.unwrap();
    handle.wait_for(SessionView::is_streaming).await.unwrap();
    drop(server);
    let view = handle.wait_for(|v| !v.is_connected()).await.unwrap();

    assert!(!view.is_streaming());
    assert_eq!(view.last_error.as_deref(), Some("connection dropped: closed by server"));

    drop(handle);
    let session = task.await.unwrap();
    assert!(!session.is_timer_running());
}

#[tokio::test(start_paused = true)]
async fn disconnect_abandons_stalled_handshake() {
    let (runtime, mut handle) =
        Runtime::new(StalledDriver::default(), stalled_session(Duration::from_secs(3600)));
    let task = tokio::spawn(runtime.run());

    handle.start().await.unwrap();
    handle.wait_for(|v| v.connection == ConnectionState::Connecting).await.unwrap();

    // Commands are still served while the handshake hangs
    assert!(handle.select_channel("C3").await.unwrap());

    handle.disconnect().await.unwrap();
    let view = handle.wait_for(|v| v.connection == ConnectionState::Disconnected).await.unwrap();
    assert_eq!(view.last_error, None);
    assert!(view.selected.iter().any(|c| c == "C3"));

    handle.shutdown().await.unwrap();
    let session = tokio::time::timeout(Duration::from_secs(1), task).await.unwrap().unwrap();
    assert_eq!(session.connection_state(), ConnectionState::Disconnected);
}

#[tokio::test(start_paused = true)]
async fn shutdown_abandons_stalled_handshake() {
    let (runtime, mut handle) =
        Runtime::new(StalledDriver::default(), stalled_session(Duration::from_secs(3600)));
    let task = tokio::spawn(runtime.run());

    handle.start().await.unwrap();
    handle.wait_for(|v| v.connection == ConnectionState::Connecting).await.unwrap();
    handle.shutdown().await.unwrap();

    let session = tokio::time::timeout(Duration::from_secs(1), task).await.unwrap().unwrap();
    assert_eq!(session.connection_state(), ConnectionState::Disconnected);
    assert!(!session.is_timer_running());
}

#[tokio::test(start_paused = true)]
async fn dropped_handles_abandon_stalled_handshake() {
    let (runtime, mut handle) =
        Runtime::new(StalledDriver::default(), stalled_session(Duration::from_secs(3600)));
    let task = tokio::spawn(runtime.run());

    handle.start().await.unwrap();
    handle.wait_for(|v| v.connection == ConnectionState::Connecting).await.unwrap();
    drop(handle);

    let session = tokio::time::timeout(Duration::from_secs(1), task).await.unwrap().unwrap();
    assert_eq!(session.connection_state(), ConnectionState::Disconnected);
}

#[tokio::test(start_paused = true)]
async fn stalled_handshake_times_out_as_failure() {
    let driver = StalledDriver::default();
    let attempts = Arc::clone(&driver.attempts);
    let (runtime, mut handle) = Runtime::new(driver, stalled_session(Duration::from_secs(5)));
    let task = tokio::spawn(runtime.run());

    handle.start().await.unwrap();
    let view = handle.wait_for(|v| v.last_error.is_some()).await.unwrap();
    assert_eq!(view.connection, ConnectionState::Disconnected);
    assert!(!view.is_streaming());
    assert_eq!(view.last_error.as_deref(), Some("connection failed: handshake timed out after 5s"));

    // A failed attempt leaves the session ready for a retry
    handle.start().await.unwrap();
    handle.wait_for(|v| v.connection == ConnectionState::Connecting).await.unwrap();
    assert_eq!(*attempts.lock().unwrap(), 2);

    handle.shutdown().await.unwrap();
    task.await.unwrap();
}
