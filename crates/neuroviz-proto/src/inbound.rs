//! Inbound server messages.
//!
//! The backend tags every frame with `type`. Only `eeg_data` carries readings;
//! `stream_started` and `stream_stopped` acknowledge control messages, and any
//! other tag is accepted as [`InboundMessage::Unknown`] so newer servers do not
//! break older clients.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{ProtocolError, Result};

/// Wire tag of data frames.
pub const EEG_DATA: &str = "eeg_data";
/// Wire tag of the stream start acknowledgement.
pub const STREAM_STARTED: &str = "stream_started";
/// Wire tag of the stream stop acknowledgement.
pub const STREAM_STOPPED: &str = "stream_stopped";

/// One decoded server frame.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// Signal readings for one or more channels.
    EegData(EegFrame),
    /// Backend acknowledged `start_stream`.
    StreamStarted(StreamNotice),
    /// Backend acknowledged `stop_stream`.
    StreamStopped(StreamNotice),
    /// Well-formed frame with a tag this client does not handle.
    Unknown {
        /// The unrecognised `type` value.
        kind: String,
    },
}

/// Payload of an `eeg_data` frame.
///
/// `data` maps channel names to readings in raw amplitude units, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EegFrame {
    /// Server clock in milliseconds. Informational only; arrival order wins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
    /// Acquisition rate in Hz, when the server reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
    /// Channel names the server is producing, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<Vec<String>>,
    /// Readings per channel.
    pub data: BTreeMap<String, Vec<f64>>,
}

impl EegFrame {
    /// Frame with readings only.
    pub fn new(data: BTreeMap<String, Vec<f64>>) -> Self {
        Self { timestamp: None, sample_rate: None, channels: None, data }
    }
}

/// Payload of a stream lifecycle acknowledgement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamNotice {
    /// Server clock in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
    /// Human-readable status text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl InboundMessage {
    /// Decode a JSON text frame.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::Malformed` if the text is not JSON or the payload does
    ///   not match its tag
    /// - `ProtocolError::MissingType` if there is no string `type` field
    /// - `ProtocolError::MissingData` if an `eeg_data` frame has no `data`
    pub fn decode(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        let kind = value.get("type").and_then(Value::as_str).ok_or(ProtocolError::MissingType)?;

        match kind {
            EEG_DATA => {
                if value.get("data").is_none_or(Value::is_null) {
                    return Err(ProtocolError::MissingData);
                }
                Ok(Self::EegData(serde_json::from_value(value)?))
            },
            STREAM_STARTED => Ok(Self::StreamStarted(serde_json::from_value(value)?)),
            STREAM_STOPPED => Ok(Self::StreamStopped(serde_json::from_value(value)?)),
            other => Ok(Self::Unknown { kind: other.to_owned() }),
        }
    }

    /// Encode as a JSON text frame. Used by simulated backends.
    pub fn encode(&self) -> Result<String> {
        let mut value = match self {
            Self::EegData(frame) => serde_json::to_value(frame)?,
            Self::StreamStarted(notice) | Self::StreamStopped(notice) => {
                serde_json::to_value(notice)?
            },
            Self::Unknown { .. } => Value::Object(serde_json::Map::new()),
        };

        if let Value::Object(map) = &mut value {
            map.insert("type".to_owned(), Value::from(self.kind()));
        }

        Ok(serde_json::to_string(&value)?)
    }

    /// Wire tag of this message.
    pub fn kind(&self) -> &str {
        match self {
            Self::EegData(_) => EEG_DATA,
            Self::StreamStarted(_) => STREAM_STARTED,
            Self::StreamStopped(_) => STREAM_STOPPED,
            Self::Unknown { kind } => kind,
        }
    }
}
