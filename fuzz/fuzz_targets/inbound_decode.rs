//! Fuzz target for InboundMessage::decode
//!
//! Arbitrary text as a socket frame. Decoding must never panic: invalid JSON,
//! wrong field types and unknown tags all return `Ok(Unknown)` or `Err`.
//!
//! # Invariants
//!
//! - NEVER panic on malformed input
//! - A decoded message re-encodes, and the encoding decodes to the same value

#![no_main]

use libfuzzer_sys::fuzz_target;
use neuroviz_proto::InboundMessage;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(message) = InboundMessage::decode(text) else {
        return;
    };

    let encoded = message.encode().expect("decoded message must encode");
    let again = InboundMessage::decode(&encoded).expect("encoding must decode");
    assert_eq!(again, message, "re-decoded message differs");
});
