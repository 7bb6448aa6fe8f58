//! Dynamic failure value graph
//!
//! Host runtimes hand over failure values that are weakly typed and may be
//! self-referential. [`FailureValue`] models them; composite nodes live behind
//! shared handles ([`ObjectRef`], [`ArrayRef`]) so a node can appear in its own
//! subtree.
//!
//! ```rust
//! use wechat_mp_sentry::types::{FailureValue, ObjectRef};
//!
//! let o = ObjectRef::new();
//! o.insert("name", "test");
//! o.insert("self", o.clone());
//!
//! let value = FailureValue::from(o.clone());
//! assert!(value.is_composite());
//! assert!(o.get("self").unwrap().as_object().unwrap().ptr_eq(&o));
//! ```
//!
//! Handles are reference counted, so a graph containing a cycle is never
//! freed. That matches the lifetime of host error values, which are captured
//! once and then dropped by the host.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use serde_json::{Number, Value};

/// Identity of a composite node (its allocation address).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// A weakly typed value handed over by the host environment.
#[derive(Debug, Clone, Default)]
pub enum FailureValue {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    /// Arbitrary precision integer, kept as its decimal digits.
    BigInt(String),
    /// A callable; carries the function name when the host knows it.
    Function(Option<String>),
    Array(ArrayRef),
    Object(ObjectRef),
}

impl FailureValue {
    /// Convert any serializable value through its JSON form.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Self::from)
    }

    /// Host-style type name (`"object"`, `"array"`, `"string"`, ...).
    pub fn type_name(&self) -> &'static str {
        match self {
            FailureValue::Undefined => "undefined",
            FailureValue::Null => "null",
            FailureValue::Bool(_) => "boolean",
            FailureValue::Number(_) => "number",
            FailureValue::String(_) => "string",
            FailureValue::BigInt(_) => "bigint",
            FailureValue::Function(_) => "function",
            FailureValue::Array(_) => "array",
            FailureValue::Object(_) => "object",
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, FailureValue::Array(_) | FailureValue::Object(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FailureValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            FailureValue::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            FailureValue::Array(a) => Some(a),
            _ => None,
        }
    }
}

/// Render a number the way the host runtime prints it: integral values carry
/// no fractional part.
pub(crate) fn number_text(number: &Number) -> String {
    if number.is_i64() || number.is_u64() {
        return number.to_string();
    }
    match number.as_f64() {
        Some(f) if f == 0.0 => "0".to_string(),
        Some(f) if f.abs() >= 1e21 => format!("{:e}", f).replacen('e', "e+", 1),
        Some(f) if f.abs() < 1e-6 => format!("{:e}", f),
        Some(f) if f.fract() == 0.0 => format!("{:.0}", f),
        Some(f) => f.to_string(),
        None => number.to_string(),
    }
}

fn number_value(f: f64) -> FailureValue {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        return FailureValue::Number(Number::from(f as i64));
    }
    Number::from_f64(f)
        .map(FailureValue::Number)
        .unwrap_or(FailureValue::Null)
}

/// Shared handle to an ordered key/value node.
///
/// Keys are unique: inserting an existing key replaces the value in place.
#[derive(Clone, Default)]
pub struct ObjectRef(Arc<RwLock<Vec<(String, FailureValue)>>>);

impl ObjectRef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&self) -> NodeId {
        NodeId(Arc::as_ptr(&self.0) as *const () as usize)
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Insert or replace `key`, returning the previous value.
    pub fn insert(
        &self,
        key: impl Into<String>,
        value: impl Into<FailureValue>,
    ) -> Option<FailureValue> {
        let key = key.into();
        let value = value.into();
        let mut entries = self.write();
        match entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<FailureValue> {
        self.read()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    pub fn remove(&self, key: &str) -> Option<FailureValue> {
        let mut entries = self.write();
        let index = entries.iter().position(|(k, _)| k == key)?;
        Some(entries.remove(index).1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.read().iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Snapshot of the entries in insertion order.
    pub fn entries(&self) -> Vec<(String, FailureValue)> {
        self.read().clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<(String, FailureValue)>> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<(String, FailureValue)>> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<String> = self.read().iter().map(|(k, _)| k.clone()).collect();
        f.debug_struct("ObjectRef")
            .field("id", &self.id())
            .field("keys", &keys)
            .finish()
    }
}

impl<K, V> FromIterator<(K, V)> for ObjectRef
where
    K: Into<String>,
    V: Into<FailureValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let object = ObjectRef::new();
        for (key, value) in iter {
            object.insert(key, value);
        }
        object
    }
}

/// Shared handle to an ordered sequence node.
#[derive(Clone, Default)]
pub struct ArrayRef(Arc<RwLock<Vec<FailureValue>>>);

impl ArrayRef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&self) -> NodeId {
        NodeId(Arc::as_ptr(&self.0) as *const () as usize)
    }

    pub fn ptr_eq(&self, other: &ArrayRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn push(&self, value: impl Into<FailureValue>) {
        self.write().push(value.into());
    }

    pub fn get(&self, index: usize) -> Option<FailureValue> {
        self.read().get(index).cloned()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Snapshot of the items.
    pub fn values(&self) -> Vec<FailureValue> {
        self.read().clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<FailureValue>> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<FailureValue>> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for ArrayRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayRef")
            .field("id", &self.id())
            .field("len", &self.len())
            .finish()
    }
}

impl<V: Into<FailureValue>> FromIterator<V> for ArrayRef {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        ArrayRef(Arc::new(RwLock::new(
            iter.into_iter().map(Into::into).collect(),
        )))
    }
}

impl From<Value> for FailureValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => FailureValue::Null,
            Value::Bool(b) => FailureValue::Bool(b),
            Value::Number(n) => match n.as_f64() {
                Some(f) if !(n.is_i64() || n.is_u64()) => number_value(f),
                _ => FailureValue::Number(n),
            },
            Value::String(s) => FailureValue::String(s),
            Value::Array(items) => FailureValue::Array(items.into_iter().collect()),
            Value::Object(map) => FailureValue::Object(map.into_iter().collect()),
        }
    }
}

impl From<ObjectRef> for FailureValue {
    fn from(object: ObjectRef) -> Self {
        FailureValue::Object(object)
    }
}

impl From<ArrayRef> for FailureValue {
    fn from(array: ArrayRef) -> Self {
        FailureValue::Array(array)
    }
}

impl From<&str> for FailureValue {
    fn from(s: &str) -> Self {
        FailureValue::String(s.to_string())
    }
}

impl From<String> for FailureValue {
    fn from(s: String) -> Self {
        FailureValue::String(s)
    }
}

impl From<bool> for FailureValue {
    fn from(b: bool) -> Self {
        FailureValue::Bool(b)
    }
}

impl From<f64> for FailureValue {
    fn from(f: f64) -> Self {
        number_value(f)
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for FailureValue {
                fn from(n: $ty) -> Self {
                    FailureValue::Number(Number::from(n))
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl<T: Into<FailureValue>> From<Option<T>> for FailureValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FailureValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_replaces_in_place() {
        let o = ObjectRef::new();
        o.insert("a", 1);
        o.insert("b", 2);
        let previous = o.insert("a", "x");

        assert!(matches!(previous, Some(FailureValue::Number(_))));
        let keys: Vec<String> = o.entries().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(o.get("a").unwrap().as_str(), Some("x"));
    }

    #[test]
    fn test_remove_and_contains() {
        let o: ObjectRef = [("a", 1), ("b", 2)].into_iter().collect();
        assert!(o.contains_key("a"));
        assert!(o.remove("a").is_some());
        assert!(!o.contains_key("a"));
        assert_eq!(o.len(), 1);
        assert!(o.remove("missing").is_none());
    }

    #[test]
    fn test_clone_shares_identity() {
        let o = ObjectRef::new();
        let alias = o.clone();
        alias.insert("k", true);

        assert!(o.ptr_eq(&alias));
        assert_eq!(o.id(), alias.id());
        assert!(o.contains_key("k"));
        assert_ne!(o.id(), ObjectRef::new().id());
    }

    #[test]
    fn test_self_reference_debug_terminates() {
        let o = ObjectRef::new();
        o.insert("self", o.clone());
        let rendered = format!("{:?}", FailureValue::from(o));
        assert!(rendered.contains("self"));
    }

    #[test]
    fn test_from_json_value() {
        let value = FailureValue::from(json!({
            "code": 500,
            "tags": ["a", null],
            "nested": {"ok": false}
        }));

        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 3);
        assert_eq!(object.get("tags").unwrap().as_array().unwrap().len(), 2);
        assert_eq!(object.get("nested").unwrap().type_name(), "object");
    }

    #[test]
    fn test_from_serialize() {
        #[derive(Serialize)]
        struct Failure {
            code: u32,
            reason: &'static str,
        }

        let value = FailureValue::from_serialize(&Failure {
            code: 7,
            reason: "boom",
        })
        .unwrap();
        assert_eq!(
            value.as_object().unwrap().get("reason").unwrap().as_str(),
            Some("boom")
        );
    }

    #[test]
    fn test_integral_floats_fold_to_integers() {
        match FailureValue::from(500.0) {
            FailureValue::Number(n) => assert!(n.is_i64()),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(FailureValue::from(f64::NAN), FailureValue::Null));
    }

    #[test]
    fn test_number_text() {
        assert_eq!(number_text(&Number::from(500)), "500");
        assert_eq!(number_text(&Number::from_f64(1.5).unwrap()), "1.5");
        assert_eq!(number_text(&Number::from_f64(-0.0).unwrap()), "0");
        assert_eq!(number_text(&Number::from_f64(1e300).unwrap()), "1e+300");
        assert_eq!(number_text(&Number::from_f64(1e-7).unwrap()), "1e-7");
    }

    #[test]
    fn test_type_names() {
        assert_eq!(FailureValue::Undefined.type_name(), "undefined");
        assert_eq!(FailureValue::from(None::<i32>).type_name(), "null");
        assert_eq!(FailureValue::Function(None).type_name(), "function");
        assert_eq!(ArrayRef::new().len(), 0);
        assert_eq!(FailureValue::from(ArrayRef::new()).type_name(), "array");
    }
}
