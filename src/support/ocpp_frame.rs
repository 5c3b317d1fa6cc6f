//! OCPP-J message decoding for logging
//!
//! Webhook callers forward the raw text of every frame a station exchanged
//! with its central system. Two array shapes are accepted:
//!
//! - **Call**               `[2, "<uniqueId>", "<action>", {<payload>}]`
//! - **CallResult / Error** `[3 | 4, "<uniqueId>", {<payload>}]`
//!
//! Decoding is lenient on purpose: any type code is classified (unknown codes
//! become [`MessageKind::Unknown`]) and the unique id is taken as-is. Only
//! the JSON syntax, the top-level array and its length are checked.

use serde_json::Value;
use std::fmt;

use super::errors::DecodeError;

// ── Message-type constants ─────────────────────────────────────

const MSG_TYPE_CALL: i64 = 2;
const MSG_TYPE_CALL_RESULT: i64 = 3;
const MSG_TYPE_CALL_ERROR: i64 = 4;

const MIN_ELEMENTS: usize = 3;
const MAX_ELEMENTS: usize = 4;

// ── MessageKind ────────────────────────────────────────────────

/// Classification of a frame by its leading type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Request,
    Response,
    Error,
    Unknown,
}

impl MessageKind {
    /// Map a type code to a kind. Total: anything outside `{2, 3, 4}`,
    /// including non-numbers, is `Unknown`.
    pub fn from_type_code(code: &Value) -> Self {
        let code = code
            .as_f64()
            .filter(|c| c.fract() == 0.0)
            .map(|c| c as i64);

        match code {
            Some(MSG_TYPE_CALL) => Self::Request,
            Some(MSG_TYPE_CALL_RESULT) => Self::Response,
            Some(MSG_TYPE_CALL_ERROR) => Self::Error,
            _ => Self::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Request => "REQUEST",
            Self::Response => "RESPONSE",
            Self::Error => "ERROR",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── OcppMessage ────────────────────────────────────────────────

/// A decoded frame.
///
/// `action` is always the third element. `payload` is the fourth element
/// when it is present and truthy, otherwise the third one, so for
/// `[3, id, payload]` both fields hold the same value.
#[derive(Debug, Clone, PartialEq)]
pub struct OcppMessage {
    pub kind: MessageKind,
    pub message_id: Value,
    pub action: Value,
    pub payload: Value,
}

impl OcppMessage {
    /// Decode raw frame text.
    pub fn decode(raw: &str) -> Result<Self, DecodeError> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| DecodeError::InvalidJson(e.to_string()))?;

        let Value::Array(mut arr) = value else {
            return Err(DecodeError::NotAnArray);
        };

        if !(MIN_ELEMENTS..=MAX_ELEMENTS).contains(&arr.len()) {
            return Err(DecodeError::WrongLength(arr.len()));
        }

        let fourth = if arr.len() == MAX_ELEMENTS {
            arr.pop().filter(is_truthy)
        } else {
            None
        };
        let action = arr.pop().unwrap_or(Value::Null);
        let message_id = arr.pop().unwrap_or(Value::Null);
        let kind = arr
            .pop()
            .map(|code| MessageKind::from_type_code(&code))
            .unwrap_or(MessageKind::Unknown);

        let payload = fourth.unwrap_or_else(|| action.clone());

        Ok(Self {
            kind,
            message_id,
            action,
            payload,
        })
    }

    // ── Helpers ────────────────────────────────────────────

    /// Whether the `Action:` line should be shown.
    pub fn has_action(&self) -> bool {
        is_truthy(&self.action)
    }

    /// `payload.status` when it is a string (e.g. `"Accepted"`).
    pub fn payload_status(&self) -> Option<&str> {
        self.payload.get("status").and_then(Value::as_str)
    }
}

/// JSON truthiness: `null`, `false`, `0` and `""` are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
