//! Property-based tests for the stream session.
//!
//! Drives `StreamSession` through its event interface with generated frames
//! and checks the buffer and derivation guarantees hold for every input.

use neuroviz_core::{
    AVAILABLE_CHANNELS, BAND_WEIGHTS, BandPower, ConnectionState, SelectedChannels,
    SessionEvent, StreamConfig, StreamSession, StreamState,
};
use proptest::prelude::*;

fn frame(sequence: usize, channels: &[(String, Vec<f64>)]) -> String {
    let data: serde_json::Map<String, serde_json::Value> = channels
        .iter()
        .map(|(name, readings)| (name.clone(), serde_json::json!(readings)))
        .collect();
    serde_json::json!({ "type": "eeg_data", "timestamp": sequence, "data": data }).to_string()
}

fn connected(config: StreamConfig, selected: SelectedChannels) -> StreamSession {
    let mut session = StreamSession::with_channels(config, selected);
    let _ = session.start();
    let _ = session.handle(SessionEvent::Opened);
    session
}

fn catalog_subset() -> impl Strategy<Value = Vec<String>> {
    proptest::sample::subsequence(AVAILABLE_CHANNELS.to_vec(), 0..=AVAILABLE_CHANNELS.len())
        .prop_map(|names| names.into_iter().map(str::to_owned).collect())
}

proptest! {
    /// History keeps exactly the last `cap` samples in arrival order.
    #[test]
    fn history_is_bounded(cap in 1usize..40, count in 0usize..120) {
        let config = StreamConfig { history_capacity: cap, ..StreamConfig::default() };
        let mut session = connected(config, SelectedChannels::default());

        for i in 1..=count {
            let channels = vec![("Fz".to_owned(), vec![i as f64])];
            let _ = session.handle(SessionEvent::FrameReceived(frame(i, &channels)));
        }

        let history = session.history();
        prop_assert_eq!(history.len(), count.min(cap));

        // Oracle: the surviving leading values are the tail of 1..=count
        let kept: Vec<f64> = history.iter().filter_map(|s| s.leading_value("Fz")).collect();
        let expected: Vec<f64> = (count.saturating_sub(cap) + 1..=count).map(|i| i as f64).collect();
        prop_assert_eq!(kept, expected);
    }

    /// Band power splits the mean-square power without loss.
    #[test]
    fn band_power_sums_to_power(power in 0.0f64..1e6) {
        let split = BandPower::from_power(power);
        prop_assert!((split.total() - power).abs() <= 1e-9 * power.max(1.0));
    }

    /// Snapshot keys are exactly the selected channels present in the sample.
    #[test]
    fn snapshot_is_scoped_to_selection(
        selected in catalog_subset(),
        present in catalog_subset(),
        value in -100.0f64..100.0,
    ) {
        let selection = SelectedChannels::from_names(selected.iter().map(String::as_str)).unwrap();
        let mut session = connected(StreamConfig::default(), selection);

        let channels: Vec<(String, Vec<f64>)> =
            present.iter().map(|name| (name.clone(), vec![value, value / 2.0])).collect();
        let _ = session.handle(SessionEvent::FrameReceived(frame(1, &channels)));

        let keys: Vec<&str> = session.band_power().channels().collect();
        let expected: Vec<&str> =
            selected.iter().map(String::as_str).filter(|name| present.iter().any(|p| p == name)).collect();
        prop_assert_eq!(keys, expected);
    }

    /// Garbage never reaches the buffers.
    #[test]
    fn arbitrary_text_never_corrupts_buffers(texts in prop::collection::vec(".*", 0..20)) {
        let mut session = connected(StreamConfig::default(), SelectedChannels::default());
        let channels = vec![("Cz".to_owned(), vec![1.5])];
        let _ = session.handle(SessionEvent::FrameReceived(frame(0, &channels)));
        let power = session.band_power().clone();

        for text in texts {
            let _ = session.handle(SessionEvent::FrameReceived(text));
        }

        prop_assert_eq!(session.history().len(), 1);
        prop_assert_eq!(session.band_power(), &power);
        prop_assert_eq!(session.connection_state(), ConnectionState::Connected);
        prop_assert_eq!(session.stream_state(), StreamState::Streaming);
    }
}

#[test]
fn weights_are_fixed() {
    assert_eq!(BAND_WEIGHTS, [0.20, 0.15, 0.30, 0.25, 0.10]);
    assert!((BAND_WEIGHTS.iter().sum::<f64>() - 1.0).abs() < 1e-12);
}

#[test]
fn hundred_and_fifty_samples_keep_the_last_hundred() {
    let mut session = connected(StreamConfig::default(), SelectedChannels::default());
    for i in 1..=150 {
        let channels = vec![("Pz".to_owned(), vec![i as f64])];
        let _ = session.handle(SessionEvent::FrameReceived(frame(i, &channels)));
    }

    let history = session.history();
    assert_eq!(history.len(), 100);
    assert_eq!(history.iter().next().and_then(|s| s.leading_value("Pz")), Some(51.0));
    assert_eq!(history.latest().and_then(|s| s.leading_value("Pz")), Some(150.0));
}
