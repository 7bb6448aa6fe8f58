//! Host API failure shape
//!
//! Mini Program host APIs (`wx.request`, `wx.login`, ...) report failures
//! through their `fail` callback with an object carrying `errMsg` and,
//! depending on the base library version, `errno` or `errCode`.
//!
//! ## Usage
//!
//! ```rust
//! use wechat_mp_sentry::types::HostApiFailure;
//!
//! let json = r#"{"errMsg": "request:fail timeout", "errno": 600001}"#;
//! let failure: HostApiFailure = serde_json::from_str(json).unwrap();
//! assert_eq!(failure.api_name(), Some("request"));
//! assert_eq!(failure.reason(), Some("timeout"));
//! ```

use serde::{Deserialize, Serialize};

use super::value::{FailureValue, ObjectRef};

/// Failure object passed to a host API `fail` callback.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostApiFailure {
    /// Failure text, formatted as `<api>:fail <reason>`
    #[serde(default)]
    pub err_msg: String,
    /// Unified error number (base library 2.24.0+)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errno: Option<i64>,
    /// Legacy per-API error code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err_code: Option<i64>,
}

impl HostApiFailure {
    pub fn new(err_msg: impl Into<String>) -> Self {
        Self {
            err_msg: err_msg.into(),
            errno: None,
            err_code: None,
        }
    }

    pub fn with_errno(mut self, errno: i64) -> Self {
        self.errno = Some(errno);
        self
    }

    pub fn with_err_code(mut self, err_code: i64) -> Self {
        self.err_code = Some(err_code);
        self
    }

    /// API name before the `:` (`"request"` for `"request:fail timeout"`).
    pub fn api_name(&self) -> Option<&str> {
        self.err_msg
            .split_once(':')
            .map(|(api, _)| api)
            .filter(|api| !api.is_empty())
    }

    /// Text after `fail`, trimmed.
    pub fn reason(&self) -> Option<&str> {
        let (_, rest) = self.err_msg.split_once(":fail")?;
        let reason = rest.trim();
        (!reason.is_empty()).then_some(reason)
    }
}

impl From<HostApiFailure> for FailureValue {
    fn from(failure: HostApiFailure) -> Self {
        let object = ObjectRef::new();
        object.insert("errMsg", failure.err_msg);
        if let Some(errno) = failure.errno {
            object.insert("errno", errno);
        }
        if let Some(err_code) = failure.err_code {
            object.insert("errCode", err_code);
        }
        FailureValue::Object(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_err_code_variant() {
        let json = r#"{"errMsg": "login:fail auth deny", "errCode": -1}"#;
        let failure: HostApiFailure = serde_json::from_str(json).unwrap();
        assert_eq!(failure.err_code, Some(-1));
        assert!(failure.errno.is_none());
        assert_eq!(failure.api_name(), Some("login"));
        assert_eq!(failure.reason(), Some("auth deny"));
    }

    #[test]
    fn test_reason_missing() {
        let failure = HostApiFailure::new("getLocation:fail");
        assert_eq!(failure.api_name(), Some("getLocation"));
        assert!(failure.reason().is_none());

        let failure = HostApiFailure::new("something broke");
        assert!(failure.api_name().is_none());
        assert!(failure.reason().is_none());
    }

    #[test]
    fn test_into_failure_value_keeps_host_keys() {
        let value = FailureValue::from(HostApiFailure::new("request:fail timeout").with_errno(600001));
        let object = value.as_object().unwrap();
        assert_eq!(object.get("errMsg").unwrap().as_str(), Some("request:fail timeout"));
        assert!(object.contains_key("errno"));
        assert!(!object.contains_key("errCode"));
    }

    #[test]
    fn test_serialize_skips_absent_codes() {
        let json = serde_json::to_string(&HostApiFailure::new("x:fail")).unwrap();
        assert_eq!(json, r#"{"errMsg":"x:fail"}"#);
    }
}
