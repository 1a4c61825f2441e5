//! Standard invariant checks.
//!
//! These invariants capture behavioral properties that must always hold.
//! They verify WHAT must be true, not specific test scenarios.

use std::collections::BTreeSet;

use neuroviz_core::{Band, ConnectionState, StreamState};

use super::{Invariant, InvariantResult, SessionSnapshot};

/// History never holds more samples than its capacity.
pub struct HistoryBounded;

impl Invariant for HistoryBounded {
    fn name(&self) -> &'static str {
        "HistoryBounded"
    }

    fn check(&self, state: &SessionSnapshot) -> InvariantResult {
        if state.history_len > state.history_capacity {
            return Err(self.violation(format!(
                "history holds {} samples, capacity {}",
                state.history_len, state.history_capacity
            )));
        }
        Ok(())
    }
}

/// History is in arrival order: sequence numbers strictly increase.
pub struct SequencesIncreasing;

impl Invariant for SequencesIncreasing {
    fn name(&self) -> &'static str {
        "SequencesIncreasing"
    }

    fn check(&self, state: &SessionSnapshot) -> InvariantResult {
        for window in state.sequences.windows(2) {
            if window[1] <= window[0] {
                return Err(self.violation(format!(
                    "sequence {} follows {}",
                    window[1], window[0]
                )));
            }
        }
        Ok(())
    }
}

/// Streaming requires an open socket.
pub struct StreamingImpliesConnected;

impl Invariant for StreamingImpliesConnected {
    fn name(&self) -> &'static str {
        "StreamingImpliesConnected"
    }

    fn check(&self, state: &SessionSnapshot) -> InvariantResult {
        if state.stream == StreamState::Streaming && state.connection != ConnectionState::Connected
        {
            return Err(self.violation(format!("streaming while {:?}", state.connection)));
        }
        Ok(())
    }
}

/// A tick timer runs exactly while streaming.
///
/// A timer while idle would keep requesting data after stop; no timer while
/// streaming would stall the stream.
pub struct TimerTracksStreaming;

impl Invariant for TimerTracksStreaming {
    fn name(&self) -> &'static str {
        "TimerTracksStreaming"
    }

    fn check(&self, state: &SessionSnapshot) -> InvariantResult {
        let streaming = state.stream == StreamState::Streaming;
        if state.timer_running != streaming {
            return Err(self.violation(format!(
                "timer_running={} while {:?}",
                state.timer_running, state.stream
            )));
        }
        Ok(())
    }
}

/// Queued control messages only exist while a socket is being opened.
pub struct OutboxOnlyWhileConnecting;

impl Invariant for OutboxOnlyWhileConnecting {
    fn name(&self) -> &'static str {
        "OutboxOnlyWhileConnecting"
    }

    fn check(&self, state: &SessionSnapshot) -> InvariantResult {
        if state.queued_messages > 0 && state.connection != ConnectionState::Connecting {
            return Err(self.violation(format!(
                "{} queued messages while {:?}",
                state.queued_messages, state.connection
            )));
        }
        Ok(())
    }
}

/// Band power only covers channels the latest sample carried, once each.
///
/// Samples are filtered to the selection when they arrive, so this also means
/// every key was selected at arrival time.
pub struct SnapshotWithinSelection;

impl Invariant for SnapshotWithinSelection {
    fn name(&self) -> &'static str {
        "SnapshotWithinSelection"
    }

    fn check(&self, state: &SessionSnapshot) -> InvariantResult {
        if state.history_len == 0 && !state.band_power.is_empty() {
            return Err(self.violation("band power without any sample".to_owned()));
        }

        let carried: BTreeSet<&str> = state.latest_channels.iter().map(String::as_str).collect();
        let mut seen = BTreeSet::new();
        for (channel, _) in &state.band_power {
            if !carried.contains(channel.as_str()) {
                return Err(self.violation(format!(
                    "band power for {channel}, latest sample carried {carried:?}"
                )));
            }
            if !seen.insert(channel.as_str()) {
                return Err(self.violation(format!("duplicate band power entry for {channel}")));
            }
        }
        Ok(())
    }
}

/// Band power values are never negative or NaN.
pub struct BandsNonNegative;

impl Invariant for BandsNonNegative {
    fn name(&self) -> &'static str {
        "BandsNonNegative"
    }

    fn check(&self, state: &SessionSnapshot) -> InvariantResult {
        for (channel, power) in &state.band_power {
            for band in Band::ALL {
                let value = power.get(band);
                if value.is_nan() || value < 0.0 {
                    return Err(self.violation(format!(
                        "{channel} {}: {value}",
                        band.name()
                    )));
                }
            }
        }
        Ok(())
    }
}
