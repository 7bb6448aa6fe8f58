//! Error value normalization
//!
//! Turns any [`RawFailure`] into a [`NormalizedError`] whose message is always
//! readable text. The rules, first match wins:
//!
//! 1. Native exceptions pass through untouched.
//! 2. Text becomes the message verbatim.
//! 3. Structured values: the first usable field among [`MESSAGE_KEYS`] is the
//!    message; otherwise the whole value is serialized. The serialized text is
//!    kept as [`NormalizedError::original_value`].
//! 4. Anything else is rendered as its literal text (`500`, `true`, `null`).
//!
//! ```rust
//! use serde_json::json;
//! use wechat_mp_sentry::normalize::normalize;
//!
//! let record = normalize(json!({"errMsg": "request:fail timeout", "errno": 600001}));
//! assert_eq!(record.message(), "request:fail timeout");
//! assert!(record.original_value().unwrap().contains("600001"));
//! ```

mod serializer;

pub use serializer::{serialize, to_json, CIRCULAR_MARKER, MAX_DEPTH, MAX_DEPTH_MARKER};

use std::fmt;

use log::debug;
use serde::Serialize;

use crate::types::value::number_text;
use crate::types::{
    Composite, FailureValue, NativeException, ObjectRef, RawFailure, DEFAULT_EXCEPTION_KIND,
};

/// Keys probed for a message, in priority order.
pub const MESSAGE_KEYS: [&str; 4] = ["message", "errMsg", "msg", "error"];

/// A failure value reduced to a reportable shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedError {
    kind: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    stack: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    original_value: Option<String>,
    is_native_exception: bool,
}

impl NormalizedError {
    fn native(exception: NativeException) -> Self {
        Self {
            kind: exception.kind().to_string(),
            message: exception.message().to_string(),
            stack: exception.stack().map(str::to_string),
            original_value: None,
            is_native_exception: true,
        }
    }

    fn wrapped(message: String, original_value: Option<String>) -> Self {
        Self {
            kind: DEFAULT_EXCEPTION_KIND.to_string(),
            message,
            stack: None,
            original_value,
            is_native_exception: false,
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn stack(&self) -> Option<&str> {
        self.stack.as_deref()
    }

    /// Serialized text of the structured input, if there was one.
    pub fn original_value(&self) -> Option<&str> {
        self.original_value.as_deref()
    }

    pub fn is_native_exception(&self) -> bool {
        self.is_native_exception
    }
}

impl fmt::Display for NormalizedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Normalize any failure value. Never fails.
pub fn normalize(value: impl Into<RawFailure>) -> NormalizedError {
    match value.into() {
        RawFailure::Exception(exception) => NormalizedError::native(exception),
        RawFailure::Text(text) => NormalizedError::wrapped(text, None),
        RawFailure::Structured(composite) => normalize_structured(&composite),
        RawFailure::Other(value) => match value {
            FailureValue::String(_) | FailureValue::Array(_) | FailureValue::Object(_) => {
                normalize(RawFailure::from(value))
            }
            scalar => NormalizedError::wrapped(literal_text(&scalar), None),
        },
    }
}

fn normalize_structured(composite: &Composite) -> NormalizedError {
    let probed = match composite {
        Composite::Object(object) => probe_message(object),
        Composite::Array(_) => None,
    };

    match (probed, serialize(&composite.to_value())) {
        (Some(message), Ok(text)) => NormalizedError::wrapped(message, Some(text)),
        (Some(message), Err(err)) => {
            debug!("[SentryMp] original value dropped: {}", err);
            NormalizedError::wrapped(message, None)
        }
        (None, Ok(text)) => NormalizedError::wrapped(text.clone(), Some(text)),
        (None, Err(err)) => {
            debug!("[SentryMp] falling back to shape message: {}", err);
            NormalizedError::wrapped(
                format!("unserializable error value: {}", composite.shape()),
                None,
            )
        }
    }
}

/// First usable message among [`MESSAGE_KEYS`].
pub fn probe_message(object: &ObjectRef) -> Option<String> {
    MESSAGE_KEYS
        .iter()
        .find_map(|key| object.get(key).and_then(|value| usable_text(&value)))
}

fn usable_text(value: &FailureValue) -> Option<String> {
    match value {
        FailureValue::String(s) if !s.is_empty() => Some(s.clone()),
        FailureValue::Number(n) if n.as_f64().map_or(true, |f| f != 0.0) => Some(number_text(n)),
        FailureValue::Bool(true) => Some("true".to_string()),
        FailureValue::BigInt(digits) if digits.trim_start_matches('-') != "0" => {
            Some(digits.clone())
        }
        _ => None,
    }
}

fn literal_text(value: &FailureValue) -> String {
    match value {
        FailureValue::Undefined => "undefined".to_string(),
        FailureValue::Null => "null".to_string(),
        FailureValue::Bool(b) => b.to_string(),
        FailureValue::Number(n) => number_text(n),
        FailureValue::String(s) => s.clone(),
        FailureValue::BigInt(digits) => digits.clone(),
        FailureValue::Function(Some(name)) => format!("function {}", name),
        FailureValue::Function(None) => "function".to_string(),
        FailureValue::Array(_) | FailureValue::Object(_) => value.type_name().to_string(),
    }
}
