//! # Lookup Outcomes & Response Classification
//!
//! The tagged outcome of one resolution and the policy that derives it from
//! a raw HTTP response.
//!
//! ## Classification Rules (applied in order)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Response Classification Matrix                         │
//! │                                                                         │
//! │                    │  body parses as JSON   │  body is not JSON        │
//! │  ──────────────────┼────────────────────────┼──────────────────────    │
//! │  2xx status        │  Success(value)        │  Success({"raw": body})  │
//! │                    │  (rule 3)              │  (rule 6 - never drop    │
//! │                    │                        │   a 2xx body)            │
//! │  ──────────────────┼────────────────────────┼──────────────────────    │
//! │  non-2xx status    │  Failure(message       │  Failure(body text)      │
//! │                    │  field, else body)     │  (rule 5)                │
//! │                    │  (rule 4)              │                          │
//! │  ──────────────────┴────────────────────────┴──────────────────────    │
//! │  transport fault (no response at all): Failure(fault description),     │
//! │  handled by the resolution client before this function is reached      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why Pure
//! The resolution client reads the body and the status off the wire; the
//! decision table above runs here, on plain values, so every cell of the
//! matrix is covered by unit tests without a server.

use serde_json::Value;

use crate::RAW_BODY_FIELD;

// =============================================================================
// Lookup Outcome
// =============================================================================

/// The outcome of one resolution submission.
///
/// At most one non-Loading outcome is current at a time; a newer submission
/// supersedes (never merges with) the previous one. The supersession
/// discipline itself lives in the controller's sequence guard.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    /// A resolution is in flight.
    Loading,

    /// The remote service answered with a structured payload.
    ///
    /// The payload is an opaque JSON value - the remote shape is not under
    /// our control, so no fixed schema type exists for it.
    Success(Value),

    /// The lookup failed; the message is short and user-displayable.
    Failure(String),
}

impl LookupOutcome {
    /// Returns true while the resolution is in flight.
    pub fn is_loading(&self) -> bool {
        matches!(self, LookupOutcome::Loading)
    }

    /// Returns the success payload, if any.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            LookupOutcome::Success(v) => Some(v),
            _ => None,
        }
    }
}

// =============================================================================
// Response Classification
// =============================================================================

/// Classifies a complete HTTP response into a [`LookupOutcome`].
///
/// `status_success` is the transport's verdict (2xx or not); `body` is the
/// full response text. Total: every (status, body) combination maps to an
/// outcome, never an error.
pub fn classify_response(status_success: bool, body: &str) -> LookupOutcome {
    match serde_json::from_str::<Value>(body) {
        Ok(value) if status_success => LookupOutcome::Success(value),
        Ok(value) => LookupOutcome::Failure(failure_message(&value, body)),
        Err(_) if status_success => {
            // A 2xx body that is not valid JSON is still an answer -
            // surface it under the fallback field instead of discarding it.
            let mut wrapped = serde_json::Map::new();
            wrapped.insert(RAW_BODY_FIELD.to_string(), Value::String(body.to_string()));
            LookupOutcome::Success(Value::Object(wrapped))
        }
        Err(_) => LookupOutcome::Failure(body.to_string()),
    }
}

/// Extracts the conventional `"message"` field from an error payload,
/// falling back to the raw body text.
fn failure_message(value: &Value, body: &str) -> String {
    match value.get("message") {
        Some(Value::String(msg)) => msg.clone(),
        _ => body.to_string(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
