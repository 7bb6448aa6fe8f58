use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::normalize::NormalizedError;
use crate::types::{Breadcrumb, EventId, Level, UserInfo};

/// Exception payload of an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExceptionInfo {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stacktrace: Option<String>,
    /// `true` when the exception was synthesized from a non-exception value
    #[serde(default)]
    pub synthetic: bool,
}

/// An event handed to a [`ReportingBackend`](super::ReportingBackend)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_id: EventId,
    pub level: Level,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception: Option<ExceptionInfo>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub contexts: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub breadcrumbs: Vec<Breadcrumb>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    /// Seconds since the Unix epoch
    pub timestamp: f64,
}

impl Event {
    fn empty(level: Level) -> Self {
        Self {
            event_id: EventId::new(),
            level,
            message: None,
            exception: None,
            extra: Map::new(),
            tags: BTreeMap::new(),
            contexts: Map::new(),
            user: None,
            breadcrumbs: Vec::new(),
            release: None,
            environment: None,
            timestamp: unix_timestamp(),
        }
    }

    /// Error-level event carrying a normalized error as its exception.
    pub fn from_error(error: &NormalizedError) -> Self {
        let mut event = Self::empty(Level::Error);
        event.exception = Some(ExceptionInfo {
            kind: error.kind().to_string(),
            value: error.message().to_string(),
            stacktrace: error.stack().map(str::to_string),
            synthetic: !error.is_native_exception(),
        });
        event
    }

    pub fn message(message: impl Into<String>, level: Level) -> Self {
        let mut event = Self::empty(level);
        event.message = Some(message.into());
        event
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

pub(crate) fn unix_timestamp() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}
