//! Breadcrumb and user helpers
//!
//! Thin conveniences over [`SentryMp`] for the events a Mini Program records
//! most often: page visits, network requests, user actions and business logs.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::client::SentryMp;
use crate::types::{Breadcrumb, UserInfo};

/// Fallback user id when the WeChat profile carries neither uid nor openid.
pub const UNKNOWN_USER_ID: &str = "unknown";

/// User profile as returned by the Mini Program login flow
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WechatUser {
    #[serde(default, deserialize_with = "string_or_number")]
    pub basic_uid: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub pure_phone_number: Option<String>,
    #[serde(default)]
    pub openid: Option<String>,
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

impl From<&WechatUser> for UserInfo {
    fn from(user: &WechatUser) -> Self {
        let id = user
            .basic_uid
            .clone()
            .or_else(|| user.openid.clone())
            .unwrap_or_else(|| UNKNOWN_USER_ID.to_string());
        UserInfo {
            id,
            username: user.nickname.clone(),
            phone: user.pure_phone_number.clone(),
            openid: user.openid.clone(),
            extra: Map::new(),
        }
    }
}

pub fn set_user_from_wechat(client: &SentryMp, user: &WechatUser) {
    client.set_user(UserInfo::from(user));
}

/// Clear the user on logout.
pub fn clear_user_info(client: &SentryMp) {
    client.clear_user();
}

pub fn log_page_view(client: &SentryMp, page_path: &str, params: Option<Map<String, Value>>) {
    let mut crumb =
        Breadcrumb::new("page", format!("visit page: {}", page_path)).with_type("navigation");
    crumb.data = params;
    client.add_breadcrumb(crumb);
}

/// Record a finished request. `duration_ms` is the round trip in milliseconds.
pub fn log_request(
    client: &SentryMp,
    url: &str,
    method: &str,
    status_code: Option<u16>,
    duration_ms: Option<u64>,
) {
    let mut data = Map::new();
    data.insert("url".to_string(), Value::from(url));
    data.insert("method".to_string(), Value::from(method));
    data.insert("status_code".to_string(), Value::from(status_code));
    data.insert("duration".to_string(), Value::from(duration_ms));

    client.add_breadcrumb(
        Breadcrumb::new("request", format!("{} {}", method, url))
            .with_type("http")
            .with_data(data),
    );
}

pub fn log_user_action(client: &SentryMp, action: &str, data: Option<Map<String, Value>>) {
    let mut crumb = Breadcrumb::new("action", action).with_type("user");
    crumb.data = data;
    client.add_breadcrumb(crumb);
}

pub fn log_business(client: &SentryMp, message: &str, data: Option<Map<String, Value>>) {
    let mut crumb = Breadcrumb::new("business", message).with_type("default");
    crumb.data = data;
    client.add_breadcrumb(crumb);
}
