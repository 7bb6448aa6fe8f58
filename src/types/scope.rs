use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Event and breadcrumb severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
    Fatal,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
            Level::Fatal => "fatal",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A trail entry recorded ahead of an event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Breadcrumb {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    /// Seconds since the Unix epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
}

impl Breadcrumb {
    pub fn new(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, ty: impl Into<String>) -> Self {
        self.ty = Some(ty.into());
        self
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = Some(data);
        self
    }
}

/// User attached to subsequent events
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openid: Option<String>,
    /// Free-form fields, flattened next to the known ones. Keys in
    /// [`UserInfo::RESERVED_KEYS`] must not be stored here or the serialized
    /// user carries them twice; [`UserInfo::with_field`] routes them instead.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserInfo {
    /// Numeric ids are accepted and stored as text.
    pub fn new(id: impl ToString) -> Self {
        Self {
            id: id.to_string(),
            ..Default::default()
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_openid(mut self, openid: impl Into<String>) -> Self {
        self.openid = Some(openid.into());
        self
    }

    /// Keys that name a dedicated field.
    pub const RESERVED_KEYS: [&'static str; 4] = ["id", "username", "phone", "openid"];

    /// Add a free-form field. A reserved key sets the dedicated field instead;
    /// string and number values are kept as text, anything else is ignored.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        let value = value.into();
        if !Self::RESERVED_KEYS.contains(&key.as_str()) {
            self.extra.insert(key, value);
            return self;
        }

        let text = match value {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            _ => return self,
        };
        match key.as_str() {
            "id" => self.id = text,
            "username" => self.username = Some(text),
            "phone" => self.phone = Some(text),
            _ => self.openid = Some(text),
        }
        self
    }
}

/// A single mutation of the reporting scope
#[derive(Debug, Clone, PartialEq)]
pub enum ScopeUpdate {
    SetUser(Option<UserInfo>),
    SetTag(String, String),
    SetContext(String, Value),
    SetExtra(String, Value),
}

/// Batch of scope mutations collected by
/// [`SentryMp::configure_scope`](crate::client::SentryMp::configure_scope).
#[derive(Debug, Default)]
pub struct Scope {
    updates: Vec<ScopeUpdate>,
}

impl Scope {
    pub fn set_user(&mut self, user: Option<UserInfo>) {
        self.updates.push(ScopeUpdate::SetUser(user));
    }

    pub fn set_tag(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.updates
            .push(ScopeUpdate::SetTag(key.into(), value.into()));
    }

    pub fn set_tags<K, V>(&mut self, tags: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in tags {
            self.set_tag(key, value);
        }
    }

    pub fn set_context(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.updates
            .push(ScopeUpdate::SetContext(key.into(), value.into()));
    }

    pub fn set_extra(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.updates
            .push(ScopeUpdate::SetExtra(key.into(), value.into()));
    }

    pub fn into_updates(self) -> Vec<ScopeUpdate> {
        self.updates
    }
}

/// Scope state as a backend accumulates it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScopeState {
    pub user: Option<UserInfo>,
    pub tags: BTreeMap<String, String>,
    pub contexts: Map<String, Value>,
    pub extra: Map<String, Value>,
}

impl ScopeState {
    pub fn apply(&mut self, update: ScopeUpdate) {
        match update {
            ScopeUpdate::SetUser(user) => self.user = user,
            ScopeUpdate::SetTag(key, value) => {
                self.tags.insert(key, value);
            }
            ScopeUpdate::SetContext(key, value) => {
                self.contexts.insert(key, value);
            }
            ScopeUpdate::SetExtra(key, value) => {
                self.extra.insert(key, value);
            }
        }
    }
}
