use serde_json::Value;

use super::exception::NativeException;
use super::host::HostApiFailure;
use super::value::{ArrayRef, FailureValue, ObjectRef};

/// A composite failure value: a keyed mapping or a sequence.
#[derive(Debug, Clone)]
pub enum Composite {
    Object(ObjectRef),
    Array(ArrayRef),
}

impl Composite {
    /// `"object"` or `"array"`.
    pub fn shape(&self) -> &'static str {
        match self {
            Composite::Object(_) => "object",
            Composite::Array(_) => "array",
        }
    }

    pub fn to_value(&self) -> FailureValue {
        match self {
            Composite::Object(o) => FailureValue::Object(o.clone()),
            Composite::Array(a) => FailureValue::Array(a.clone()),
        }
    }
}

/// A failure value classified once at the host boundary.
///
/// Conversions from host values pick the variant, so the normalizer never
/// inspects runtime types itself.
#[derive(Debug, Clone)]
pub enum RawFailure {
    Exception(NativeException),
    Text(String),
    Structured(Composite),
    Other(FailureValue),
}

impl From<FailureValue> for RawFailure {
    fn from(value: FailureValue) -> Self {
        match value {
            FailureValue::String(s) => RawFailure::Text(s),
            FailureValue::Object(o) => RawFailure::Structured(Composite::Object(o)),
            FailureValue::Array(a) => RawFailure::Structured(Composite::Array(a)),
            other => RawFailure::Other(other),
        }
    }
}

impl From<NativeException> for RawFailure {
    fn from(exception: NativeException) -> Self {
        RawFailure::Exception(exception)
    }
}

impl From<&str> for RawFailure {
    fn from(text: &str) -> Self {
        RawFailure::Text(text.to_string())
    }
}

impl From<String> for RawFailure {
    fn from(text: String) -> Self {
        RawFailure::Text(text)
    }
}

impl From<ObjectRef> for RawFailure {
    fn from(object: ObjectRef) -> Self {
        RawFailure::Structured(Composite::Object(object))
    }
}

impl From<ArrayRef> for RawFailure {
    fn from(array: ArrayRef) -> Self {
        RawFailure::Structured(Composite::Array(array))
    }
}

impl From<Value> for RawFailure {
    fn from(value: Value) -> Self {
        FailureValue::from(value).into()
    }
}

impl From<HostApiFailure> for RawFailure {
    fn from(failure: HostApiFailure) -> Self {
        FailureValue::from(failure).into()
    }
}
