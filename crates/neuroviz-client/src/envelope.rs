//! Response envelopes.
//!
//! Most endpoints wrap their payload as `{success, message, data}`. List
//! endpoints return Spring-style pages, sometimes bare and sometimes inside
//! the envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ApiError;

/// Uniform response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the backend handled the request.
    pub success: bool,
    /// Human-readable status.
    #[serde(default)]
    pub message: Option<String>,
    /// Payload. Absent on failure.
    #[serde(default)]
    pub data: Option<T>,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page.
    pub content: Vec<T>,
    /// Items across all pages.
    pub total_elements: u64,
    /// Number of pages.
    pub total_pages: u32,
    /// Zero-based page index.
    #[serde(default)]
    pub number: u32,
    /// Requested page size.
    #[serde(default)]
    pub size: u32,
    /// Whether this is the first page.
    #[serde(default)]
    pub first: bool,
    /// Whether this is the last page.
    #[serde(default)]
    pub last: bool,
    /// Items on this page.
    #[serde(default)]
    pub number_of_elements: u32,
}

/// How a response body carries its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Framing {
    /// Always inside the envelope.
    Enveloped,
    /// Inside the envelope or bare.
    MaybeEnveloped,
    /// Always bare.
    Bare,
}

impl Framing {
    /// Extract the payload from a 2xx body.
    pub(crate) fn open(self, body: &[u8]) -> Result<Value, ApiError> {
        let value: Value = serde_json::from_slice(body)?;
        let enveloped = match self {
            Self::Enveloped => true,
            Self::MaybeEnveloped => is_envelope(&value),
            Self::Bare => false,
        };
        if !enveloped {
            return Ok(value);
        }

        let envelope: ApiResponse<Value> = serde_json::from_value(value)?;
        if !envelope.success {
            return Err(ApiError::Rejected {
                message: envelope.message.unwrap_or_else(|| "request failed".to_owned()),
            });
        }
        Ok(envelope.data.unwrap_or(Value::Null))
    }
}

fn is_envelope(value: &Value) -> bool {
    value.get("success").is_some_and(Value::is_boolean)
}

/// Best-effort message from an error body.
pub(crate) fn error_message(body: &[u8]) -> String {
    if let Ok(value) = serde_json::from_slice::<Value>(body) {
        for field in ["message", "error", "detail"] {
            if let Some(message) = value.get(field).and_then(Value::as_str) {
                return message.to_owned();
            }
        }
    }
    String::from_utf8_lossy(body).into_owned()
}
