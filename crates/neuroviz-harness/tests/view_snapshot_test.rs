//! Snapshot tests for what renderers and invariant checks observe.

use neuroviz_app::SessionView;
use neuroviz_core::{SelectedChannels, SessionEvent, StreamConfig, StreamSession};
use neuroviz_harness::SessionSnapshot;

fn streaming_session(channels: &[&str]) -> StreamSession {
    let selected = SelectedChannels::from_names(channels).unwrap();
    let mut session = StreamSession::with_channels(StreamConfig::default(), selected);
    let _ = session.start();
    let _ = session.handle(SessionEvent::Opened);
    session
}

#[test]
fn view_after_one_frame() {
    let mut session = streaming_session(&["Fz"]);
    let _ = session.handle(SessionEvent::FrameReceived(
        r#"{"type":"eeg_data","timestamp":1700.0,"data":{"Fz":[2.0,-2.0],"Cz":[5.0]}}"#
            .to_owned(),
    ));

    insta::assert_debug_snapshot!(SessionView::from_session(&session), @r#"
    SessionView {
        connection: Connected,
        stream: Streaming,
        sample_count: 1,
        latest_sequence: Some(
            0,
        ),
        latest_timestamp: Some(
            1700.0,
        ),
        traces: [
            ChannelTrace {
                channel: "Fz",
                points: [
                    (
                        0,
                        2.0,
                    ),
                ],
            },
        ],
        band_power: [
            (
                "Fz",
                BandPower {
                    delta: 0.8,
                    theta: 0.6,
                    alpha: 1.2,
                    beta: 1.0,
                    gamma: 0.4,
                },
            ),
        ],
        selected: [
            "Fz",
        ],
        last_error: None,
    }
    "#);
}

#[test]
fn snapshot_of_connecting_session() {
    let mut session = StreamSession::new(StreamConfig::default());
    let _ = session.start();

    insta::assert_json_snapshot!(SessionSnapshot::from_session(&session), @r#"
    {
      "connection": "Connecting",
      "stream": "Idle",
      "timer_running": false,
      "queued_messages": 1,
      "history_len": 0,
      "history_capacity": 100,
      "sequences": [],
      "latest_channels": [],
      "band_power": [],
      "selected": [
        "Fz",
        "Cz",
        "Pz"
      ]
    }
    "#);
}

#[test]
fn dropped_connection_is_reported_in_view() {
    let mut session = streaming_session(&["Cz"]);
    let _ = session.handle(SessionEvent::Closed { reason: "going away".to_owned() });

    let view = SessionView::from_session(&session);
    assert_eq!(view.last_error.as_deref(), Some("connection dropped: going away"));
    assert!(!view.is_connected());
    assert!(!view.is_streaming());
}
