//! Outbound control messages.

use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Commands sent from the client to the streaming backend.
///
/// Serialized as `{"type": "<tag>"}` with no other fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlMessage {
    /// Ask the backend to begin a stream.
    StartStream,
    /// Ask the backend for the next batch of samples. Sent on every tick.
    GenerateData,
    /// Ask the backend to end the stream. The socket stays open.
    StopStream,
}

impl ControlMessage {
    /// Wire tag for this message.
    pub fn tag(self) -> &'static str {
        match self {
            Self::StartStream => "start_stream",
            Self::GenerateData => "generate_data",
            Self::StopStream => "stop_stream",
        }
    }

    /// Encode as a JSON text frame.
    pub fn encode(self) -> Result<String> {
        Ok(serde_json::to_string(&self)?)
    }

    /// Decode a JSON text frame. Used by simulated backends.
    pub fn decode(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

impl std::fmt::Display for ControlMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}
