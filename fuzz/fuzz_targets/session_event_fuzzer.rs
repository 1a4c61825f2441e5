//! Fuzz target for the StreamSession state machine
//!
//! Drives a session with arbitrary interleavings of user commands, socket
//! events, timer ticks and inbound frames (valid, notices and garbage).
//!
//! # Invariants
//!
//! - Every standard invariant holds after every step: bounded history,
//!   increasing sequences, streaming only while connected, a timer exactly
//!   while streaming, no outbox outside connecting, band power scoped to the
//!   latest sample and never negative
//! - Teardown always leaves the session idle with no timer

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use neuroviz_core::{StreamConfig, StreamSession};
use neuroviz_harness::{InvariantRegistry, SessionOp, SessionSnapshot, apply_op};

#[derive(Debug, Arbitrary)]
struct Input {
    capacity: u8,
    ops: Vec<SessionOp>,
}

fuzz_target!(|input: Input| {
    let config = StreamConfig {
        history_capacity: usize::from(input.capacity % 16) + 1,
        ..StreamConfig::default()
    };
    let mut session = StreamSession::new(config);
    let registry = InvariantRegistry::standard();

    for (step, op) in input.ops.iter().enumerate() {
        let _ = apply_op(&mut session, op);
        registry.assert_all(&SessionSnapshot::from_session(&session), &format!("step {step} {op:?}"));
    }

    let _ = session.teardown();
    assert!(!session.is_streaming());
    assert!(!session.is_timer_running());
});
