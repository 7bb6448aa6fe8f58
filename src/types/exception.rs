use std::fmt;

use serde::{Deserialize, Serialize};

/// Type name used for values that were wrapped into an exception.
pub const DEFAULT_EXCEPTION_KIND: &str = "Error";

/// An exception-like value: a type marker plus a message and optional stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeException {
    kind: String,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    stack: Option<String>,
}

impl NativeException {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            stack: None,
        }
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// Capture a Rust error: its short type name, its display text, and the
    /// `source()` chain rendered as the stack.
    pub fn from_error<E: std::error::Error>(err: &E) -> Self {
        let mut causes = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            causes.push(format!("Caused by: {}", cause));
            source = cause.source();
        }

        let exception = Self::new(short_type_name::<E>(), err.to_string());
        if causes.is_empty() {
            exception
        } else {
            exception.with_stack(causes.join("\n"))
        }
    }

    /// Parse the text the host passes to its global error hook: the first
    /// line is the message, the remaining lines are the stack.
    pub fn from_host_text(text: &str) -> Self {
        match text.split_once('\n') {
            Some((message, stack)) if !stack.trim().is_empty() => {
                Self::new(DEFAULT_EXCEPTION_KIND, message.trim_end()).with_stack(stack)
            }
            _ => Self::new(DEFAULT_EXCEPTION_KIND, text.trim_end()),
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
}

impl fmt::Display for NativeException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

fn short_type_name<T>() -> &'static str {
    short_name(std::any::type_name::<T>())
}

/// Last path segment of a type name, looking through smart pointers to the
/// pointee. `Box<dyn Error + Send>` yields `Error`.
fn short_name(full: &str) -> &str {
    let mut name = full;
    loop {
        let (base, inner) = match name.split_once('<') {
            Some((base, rest)) => (base, rest.strip_suffix('>')),
            None => (name, None),
        };
        let short = base.rsplit("::").next().unwrap_or(base);
        match (short, inner) {
            ("Box" | "Arc" | "Rc", Some(inner)) => {
                let inner = inner.trim_start_matches("dyn ");
                name = inner.split(" + ").next().unwrap_or(inner);
            }
            ("", _) => return DEFAULT_EXCEPTION_KIND,
            _ => return short,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ReporterError, SerializationError};

    #[test]
    fn test_from_error_uses_type_name() {
        let err = ReporterError::Config("dsn is required".to_string());
        let exception = NativeException::from_error(&err);

        assert_eq!(exception.kind(), "ReporterError");
        assert_eq!(exception.message(), "Configuration error: dsn is required");
        assert!(exception.stack().is_none());
    }

    #[test]
    fn test_from_error_renders_source_chain() {
        let err = ReporterError::from(SerializationError::Unencodable("bigint"));
        let exception = NativeException::from_error(&err);

        assert_eq!(
            exception.stack(),
            Some("Caused by: value of type bigint cannot be encoded")
        );
    }

    #[test]
    fn test_from_error_looks_through_pointers() {
        let boxed = Box::new(ReporterError::Backend("offline".to_string()));
        assert_eq!(NativeException::from_error(&boxed).kind(), "ReporterError");

        let shared: std::sync::Arc<dyn std::error::Error + Send + Sync> =
            std::sync::Arc::new(ReporterError::Backend("offline".to_string()));
        let exception = NativeException::from_error(&shared);
        assert_eq!(exception.kind(), DEFAULT_EXCEPTION_KIND);
        assert_eq!(exception.message(), "Backend error: offline");
    }

    #[test]
    fn test_short_name() {
        assert_eq!(short_name("my_app::errors::PayError"), "PayError");
        assert_eq!(short_name("alloc::boxed::Box<my_app::PayError>"), "PayError");
        assert_eq!(
            short_name("alloc::sync::Arc<dyn core::error::Error + core::marker::Send>"),
            "Error"
        );
        assert_eq!(
            short_name("alloc::boxed::Box<my_app::Wrapped<u32>>"),
            "Wrapped"
        );
        assert_eq!(short_name("my_app::Wrapped<alloc::string::String>"), "Wrapped");
    }

    #[test]
    fn test_from_host_text_splits_stack() {
        let text = "TypeError: x is undefined\n    at onLoad (pages/index.js:10:5)";
        let exception = NativeException::from_host_text(text);

        assert_eq!(exception.kind(), "Error");
        assert_eq!(exception.message(), "TypeError: x is undefined");
        assert_eq!(exception.stack(), Some("    at onLoad (pages/index.js:10:5)"));
    }

    #[test]
    fn test_from_host_text_single_line() {
        let exception = NativeException::from_host_text("boom\n");
        assert_eq!(exception.message(), "boom");
        assert!(exception.stack().is_none());
    }

    #[test]
    fn test_display() {
        let exception = NativeException::new("RangeError", "out of range");
        assert_eq!(exception.to_string(), "RangeError: out of range");
    }
}
