//! Model-based property tests.
//!
//! Random operation sequences are applied to a real `StreamSession` and to the
//! reference `SessionModel`. After every step the observable state must agree
//! and every standard invariant must hold.

use neuroviz_core::{SessionAction, StreamConfig, StreamSession};
use neuroviz_harness::{
    InvariantRegistry, ObservedState, SessionModel, SessionOp, SessionSnapshot, apply_op,
};
use neuroviz_proto::ControlMessage;
use proptest::prelude::*;

fn op() -> impl Strategy<Value = SessionOp> {
    prop_oneof![
        3 => Just(SessionOp::Start),
        1 => Just(SessionOp::Stop),
        1 => Just(SessionOp::Disconnect),
        1 => Just(SessionOp::Reset),
        1 => any::<u8>().prop_map(|index| SessionOp::Select { index }),
        1 => any::<u8>().prop_map(|index| SessionOp::Deselect { index }),
        3 => Just(SessionOp::Opened),
        1 => Just(SessionOp::Closed),
        1 => Just(SessionOp::Failed),
        3 => Just(SessionOp::Tick),
        5 => (any::<u16>(), prop::collection::vec(any::<i8>(), 0..6))
            .prop_map(|(channel_mask, readings)| SessionOp::DataFrame { channel_mask, readings }),
        1 => any::<bool>().prop_map(|started| SessionOp::Notice { started }),
        1 => prop::collection::vec(any::<u8>(), 0..16).prop_map(|bytes| SessionOp::Garbage { bytes }),
    ]
}

fn session(capacity: usize) -> StreamSession {
    let config = StreamConfig { history_capacity: capacity, ..StreamConfig::default() };
    StreamSession::new(config)
}

proptest! {
    #[test]
    fn session_matches_model(ops in prop::collection::vec(op(), 0..120), capacity in 1usize..12) {
        let registry = InvariantRegistry::standard();
        let mut session = session(capacity);
        let mut model = SessionModel::new(capacity, session.selected_channels().as_slice());

        for (step, op) in ops.iter().enumerate() {
            let actions = apply_op(&mut session, op);
            let tick_requests = model.tick_requests_data();
            model.apply(op);

            prop_assert_eq!(ObservedState::from_session(&session), model.observe(), "step {} {:?}", step, op);
            registry.assert_all(&SessionSnapshot::from_session(&session), &format!("step {step} {op:?}"));

            if matches!(op, SessionOp::Tick) {
                let expected = if tick_requests {
                    vec![SessionAction::Send(ControlMessage::GenerateData)]
                } else {
                    vec![]
                };
                prop_assert_eq!(actions, expected);
            }
        }
    }

    #[test]
    fn timer_actions_balance(ops in prop::collection::vec(op(), 0..120)) {
        let mut session = session(8);
        let mut running = 0i32;

        for op in &ops {
            for action in apply_op(&mut session, op) {
                match action {
                    SessionAction::StartTimer { .. } => running += 1,
                    SessionAction::StopTimer => running -= 1,
                    _ => {},
                }
                prop_assert!((0..=1).contains(&running), "{} timers after {:?}", running, op);
            }
        }
        prop_assert_eq!(running == 1, session.is_timer_running());
    }

    #[test]
    fn teardown_releases_everything(ops in prop::collection::vec(op(), 0..60)) {
        let mut session = session(8);
        for op in &ops {
            let _ = apply_op(&mut session, op);
        }
        let was_timing = session.is_timer_running();
        let was_open = session.connection_state() != neuroviz_core::ConnectionState::Disconnected;

        let actions = session.teardown();

        prop_assert_eq!(actions.contains(&SessionAction::StopTimer), was_timing);
        prop_assert_eq!(actions.contains(&SessionAction::Close), was_open);
        prop_assert!(!actions.iter().any(|a| matches!(a, SessionAction::Send(_))));
        prop_assert!(!session.is_timer_running());
        prop_assert!(!session.is_streaming());
    }

    #[test]
    fn connect_happens_once_per_disconnected_start(ops in prop::collection::vec(op(), 0..120)) {
        let mut session = session(8);
        for op in &ops {
            let disconnected =
                session.connection_state() == neuroviz_core::ConnectionState::Disconnected;
            let connects = apply_op(&mut session, op)
                .iter()
                .filter(|a| matches!(a, SessionAction::Connect { .. }))
                .count();
            let expected = usize::from(matches!(op, SessionOp::Start) && disconnected);
            prop_assert_eq!(connects, expected, "{:?}", op);
        }
    }
}
