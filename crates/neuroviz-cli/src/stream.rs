//! `neuroviz stream`: drive a live session and log band power.

use std::{future, time::Duration};

use neuroviz_app::{Runtime, SessionHandle, SessionView, WsDriver};
use neuroviz_core::{
    BandPower, ConnectionState, DEFAULT_HISTORY_CAPACITY, SelectedChannels, StreamConfig,
    StreamSession,
};
use serde::Serialize;
use tokio::time::Instant;

use crate::{error::CliError, output::write_json_line};

/// Stream command options.
#[derive(Debug, Clone)]
pub struct StreamOptions {
    /// WebSocket endpoint.
    pub url: String,
    /// Channels to display.
    pub channels: Vec<String>,
    /// Data request period.
    pub tick: Duration,
    /// Socket handshake deadline.
    pub connect_timeout: Duration,
    /// Stop after this long.
    pub duration: Option<Duration>,
    /// Stop after this many samples.
    pub samples: Option<usize>,
}

/// Latest sample of a published view.
///
/// Views are coalesced, so samples that arrived between two lines are not
/// written; `skipped` counts them.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SampleLine<'a> {
    sequence: u64,
    skipped: u64,
    timestamp: Option<f64>,
    band_power: &'a [(String, BandPower)],
}

/// Line for `view` if it carries a sample newer than `last_sequence`.
fn sample_line(view: &SessionView, last_sequence: Option<u64>) -> Option<SampleLine<'_>> {
    let sequence = view.latest_sequence.filter(|&s| Some(s) != last_sequence)?;
    let skipped = last_sequence.map_or(sequence, |last| sequence.saturating_sub(last + 1));
    Some(SampleLine {
        sequence,
        skipped,
        timestamp: view.latest_timestamp,
        band_power: &view.band_power,
    })
}

/// Run a session until the limits are reached, Ctrl-C, or the connection
/// drops.
pub async fn run(options: StreamOptions) -> Result<(), CliError> {
    let config = StreamConfig {
        url: options.url,
        tick_interval: options.tick,
        history_capacity: DEFAULT_HISTORY_CAPACITY,
        connect_timeout: options.connect_timeout,
    };
    config.validate()?;
    let selected = SelectedChannels::from_names(&options.channels)?;

    let (runtime, mut handle) =
        Runtime::new(WsDriver::new(), StreamSession::with_channels(config, selected));
    let task = tokio::spawn(runtime.run());

    handle.start().await?;
    let deadline = options.duration.map(|d| Instant::now() + d);
    let result = follow(&mut handle, deadline, options.samples).await;

    if let Err(e) = handle.disconnect().await {
        tracing::debug!(error = %e, "runtime gone before disconnect");
    }
    if let Err(e) = handle.shutdown().await {
        tracing::debug!(error = %e, "runtime gone before shutdown");
    }
    let session = task.await?;
    tracing::info!(samples = session.history().len(), "stream closed");
    result
}

async fn follow(
    handle: &mut SessionHandle,
    deadline: Option<Instant>,
    limit: Option<usize>,
) -> Result<(), CliError> {
    let mut written = 0usize;
    let mut last_sequence = None;
    let mut was_connected = false;

    loop {
        let view = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted");
                return Ok(());
            },
            () = until(deadline) => {
                tracing::info!("duration reached");
                return Ok(());
            },
            view = handle.changed() => view?,
        };

        if view.connection == ConnectionState::Connected {
            was_connected = true;
        }
        if let Some(reason) = lost_connection(&view, was_connected) {
            return Err(CliError::StreamLost(reason));
        }

        if let Some(line) = sample_line(&view, last_sequence) {
            last_sequence = Some(line.sequence);
            write_json_line(&line)?;
            written += 1;
            if limit.is_some_and(|limit| written >= limit) {
                return Ok(());
            }
        }
    }
}

/// Failure reason if the socket is gone without the user asking.
fn lost_connection(view: &SessionView, was_connected: bool) -> Option<String> {
    if view.connection != ConnectionState::Disconnected {
        return None;
    }
    match &view.last_error {
        Some(error) => Some(error.clone()),
        None if was_connected => Some("connection closed".to_owned()),
        None => None,
    }
}

async fn until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => future::pending().await,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn view_at(sequence: Option<u64>) -> SessionView {
        SessionView { latest_sequence: sequence, ..SessionView::default() }
    }

    #[test]
    fn coalesced_samples_are_counted_as_skipped() {
        let view = view_at(Some(7));
        let line = sample_line(&view, Some(3)).unwrap();
        assert_eq!((line.sequence, line.skipped), (7, 3));

        let view = view_at(Some(4));
        let line = sample_line(&view, Some(3)).unwrap();
        assert_eq!(line.skipped, 0);
    }

    #[test]
    fn first_line_counts_earlier_samples() {
        let view = view_at(Some(2));
        let line = sample_line(&view, None).unwrap();
        assert_eq!(line.skipped, 2);
        assert_eq!(serde_json::to_value(&line).unwrap()["skipped"], 2);
    }

    #[test]
    fn unchanged_or_empty_view_writes_nothing() {
        assert!(sample_line(&view_at(Some(5)), Some(5)).is_none());
        assert!(sample_line(&view_at(None), Some(5)).is_none());
    }

    #[test]
    fn failure_before_open_is_reported() {
        let view = SessionView {
            last_error: Some("connection failed: refused".to_owned()),
            ..SessionView::default()
        };
        assert_eq!(lost_connection(&view, false).as_deref(), Some("connection failed: refused"));
    }

    #[test]
    fn initial_disconnected_view_is_not_a_failure() {
        assert_eq!(lost_connection(&SessionView::default(), false), None);
    }

    #[test]
    fn open_view_is_not_a_failure() {
        let view = SessionView { connection: ConnectionState::Connected, ..SessionView::default() };
        assert_eq!(lost_connection(&view, true), None);
    }
}
