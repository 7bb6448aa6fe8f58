//! Cycle-safe serializer
//!
//! Renders a [`FailureValue`] graph as indented JSON text. A composite node
//! that is already on the current recursion path is replaced by
//! [`CIRCULAR_MARKER`]; the same node reached through a sibling branch is
//! rendered in full. Composites nested below [`MAX_DEPTH`] levels are replaced
//! by [`MAX_DEPTH_MARKER`].

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::error::SerializationError;
use crate::types::{FailureValue, NodeId};

/// Placeholder emitted for a back-reference to an ancestor node.
pub const CIRCULAR_MARKER: &str = "[Circular]";

/// Placeholder emitted for a composite nested deeper than [`MAX_DEPTH`].
pub const MAX_DEPTH_MARKER: &str = "[MaxDepth]";

/// Deepest composite nesting rendered in full.
pub const MAX_DEPTH: usize = 128;

/// Serialize a value as 2-space indented JSON text.
///
/// ```rust
/// use wechat_mp_sentry::normalize::serialize;
/// use wechat_mp_sentry::types::{FailureValue, ObjectRef};
///
/// let o = ObjectRef::new();
/// o.insert("name", "test");
/// o.insert("self", o.clone());
///
/// let text = serialize(&FailureValue::from(o)).unwrap();
/// assert!(text.contains(r#""name": "test""#));
/// assert!(text.contains(r#""self": "[Circular]""#));
/// ```
pub fn serialize(value: &FailureValue) -> Result<String, SerializationError> {
    let json = to_json(value)?;
    Ok(serde_json::to_string_pretty(&json)?)
}

/// Convert a value graph into a tree-shaped JSON value.
///
/// `undefined` and function members are dropped from objects and become
/// `null` inside arrays. At the root they cannot be encoded.
pub fn to_json(value: &FailureValue) -> Result<Value, SerializationError> {
    let mut path = AncestorPath::default();
    encode(value, &mut path)?.ok_or(SerializationError::Unencodable(value.type_name()))
}

#[derive(Default)]
struct AncestorPath {
    nodes: HashSet<NodeId>,
}

enum Visit {
    Entered,
    Circular,
    TooDeep,
}

impl AncestorPath {
    fn enter(&mut self, id: NodeId) -> Visit {
        if self.nodes.contains(&id) {
            return Visit::Circular;
        }
        if self.nodes.len() >= MAX_DEPTH {
            return Visit::TooDeep;
        }
        self.nodes.insert(id);
        Visit::Entered
    }

    fn leave(&mut self, id: NodeId) {
        self.nodes.remove(&id);
    }
}

fn encode(value: &FailureValue, path: &mut AncestorPath) -> Result<Option<Value>, SerializationError> {
    let json = match value {
        FailureValue::Undefined | FailureValue::Function(_) => return Ok(None),
        FailureValue::BigInt(_) => return Err(SerializationError::Unencodable("bigint")),
        FailureValue::Null => Value::Null,
        FailureValue::Bool(b) => Value::Bool(*b),
        FailureValue::Number(n) => Value::Number(n.clone()),
        FailureValue::String(s) => Value::String(s.clone()),
        FailureValue::Array(array) => {
            let id = array.id();
            if let Some(marker) = path.enter(id).marker() {
                return Ok(Some(marker));
            }
            let values = array.values();
            let mut items = Vec::with_capacity(values.len());
            for item in &values {
                items.push(encode(item, path)?.unwrap_or(Value::Null));
            }
            path.leave(id);
            Value::Array(items)
        }
        FailureValue::Object(object) => {
            let id = object.id();
            if let Some(marker) = path.enter(id).marker() {
                return Ok(Some(marker));
            }
            let mut map = Map::new();
            for (key, member) in object.entries() {
                if let Some(json) = encode(&member, path)? {
                    map.insert(key, json);
                }
            }
            path.leave(id);
            Value::Object(map)
        }
    };
    Ok(Some(json))
}

impl Visit {
    /// Placeholder to emit instead of descending, if any.
    fn marker(self) -> Option<Value> {
        match self {
            Visit::Entered => None,
            Visit::Circular => Some(Value::String(CIRCULAR_MARKER.to_string())),
            Visit::TooDeep => Some(Value::String(MAX_DEPTH_MARKER.to_string())),
        }
    }
}
