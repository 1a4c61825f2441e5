//! Property-based tests for inbound frame decoding.
//!
//! Decoding must never panic, must preserve readings exactly for well-formed
//! data frames, and must reject data frames without readings no matter what
//! else they carry.

use std::collections::BTreeMap;

use neuroviz_proto::{EegFrame, InboundMessage, ProtocolError};
use proptest::prelude::*;

fn channel_name() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Fz".to_owned()),
        Just("Cz".to_owned()),
        Just("Pz".to_owned()),
        Just("C3".to_owned()),
        Just("C4".to_owned()),
        "[A-Z][a-z0-9]{0,3}",
    ]
}

fn readings() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1.0e6f64..1.0e6, 0..32)
}

fn eeg_frame() -> impl Strategy<Value = EegFrame> {
    (
        prop::collection::btree_map(channel_name(), readings(), 0..6),
        prop::option::of(0u64..4_000_000_000_000),
        prop::option::of(1u32..10_000),
    )
        .prop_map(|(data, timestamp, sample_rate)| EegFrame {
            timestamp: timestamp.map(|t| t as f64),
            sample_rate,
            channels: Some(data.keys().cloned().collect()),
            data,
        })
}

proptest! {
    #[test]
    fn prop_decode_never_panics(text in ".{0,256}") {
        let _ = InboundMessage::decode(&text);
    }

    #[test]
    fn prop_decode_never_panics_on_json_like_input(
        text in r#"\{("[a-z]{1,6}": ?("[a-z_]{0,10}"|[0-9]{1,4}|null|\[\]|\{\}),?){0,4}\}"#
    ) {
        let _ = InboundMessage::decode(&text);
    }

    #[test]
    fn prop_data_frames_survive_the_wire(frame in eeg_frame()) {
        let encoded = InboundMessage::EegData(frame.clone()).encode().unwrap();
        let decoded = InboundMessage::decode(&encoded).unwrap();

        prop_assert_eq!(decoded, InboundMessage::EegData(frame));
    }

    #[test]
    fn prop_data_frames_without_readings_are_rejected(
        timestamp in any::<u32>(),
        message in "[a-z ]{0,16}",
    ) {
        let text = format!(r#"{{"type":"eeg_data","timestamp":{timestamp},"message":"{message}"}}"#);
        prop_assert!(matches!(InboundMessage::decode(&text), Err(ProtocolError::MissingData)));
    }
}

#[test]
fn backend_generated_frame_decodes() {
    // Shape produced by the reference backend: five channels, 25 readings each.
    let mut data = BTreeMap::new();
    for channel in ["Fz", "Cz", "Pz", "C3", "C4"] {
        data.insert(channel.to_owned(), (0..25).map(|i| f64::from(i) * 0.01).collect::<Vec<_>>());
    }
    let text = serde_json::json!({
        "timestamp": 1_700_000_000_123_u64,
        "sampleRate": 250,
        "channels": ["Fz", "Cz", "Pz", "C3", "C4"],
        "data": data,
        "type": "eeg_data",
    })
    .to_string();

    let InboundMessage::EegData(frame) = InboundMessage::decode(&text).unwrap() else {
        panic!("expected eeg_data");
    };
    assert_eq!(frame.data.len(), 5);
    assert!(frame.data.values().all(|r| r.len() == 25));
}
