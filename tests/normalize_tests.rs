//! Normalization Tests
//!
//! Exercise the normalization rules and the documented host failure shapes
//! through the public API.

use serde_json::json;
use wechat_mp_sentry::normalize::{normalize, serialize, CIRCULAR_MARKER, MAX_DEPTH_MARKER};
use wechat_mp_sentry::types::{
    ArrayRef, FailureValue, HostApiFailure, NativeException, ObjectRef, RawFailure,
};

const OBJECT_OBJECT: &str = "[object Object]";

#[test]
fn test_native_exception_is_untouched() {
    let cases = [
        NativeException::new("Error", "这是一个标准错误"),
        NativeException::new("TypeError", "").with_stack("at page.js:3"),
        NativeException::new("RangeError", "  padded  "),
    ];

    for exception in cases {
        let record = normalize(exception.clone());
        assert!(record.is_native_exception());
        assert_eq!(record.message(), exception.message());
        assert_eq!(record.kind(), exception.kind());
        assert_eq!(record.stack(), exception.stack());
        assert!(record.original_value().is_none());
    }
}

#[test]
fn test_rust_error_is_native() {
    let err = std::io::Error::new(std::io::ErrorKind::NotFound, "config missing");
    let record = normalize(NativeException::from_error(&err));

    assert!(record.is_native_exception());
    assert_eq!(record.kind(), "Error");
    assert_eq!(record.message(), "config missing");
}

#[test]
fn test_strings_are_identity() {
    for s in ["network down", "", "  spaced  ", "多字节 ✓", "{\"looks\": \"like json\"}"] {
        let record = normalize(s);
        assert_eq!(record.message(), s);
        assert!(!record.is_native_exception());
        assert!(record.original_value().is_none());
    }
}

#[test]
fn test_message_field_beats_err_msg() {
    let record = normalize(json!({"errMsg": "from errMsg", "message": "from message"}));
    assert_eq!(record.message(), "from message");
}

#[test]
fn test_fallback_contains_fields() {
    let record = normalize(json!({"code": 500, "status": "error"}));
    assert!(!record.message().is_empty());
    assert!(record.message().contains("\"code\""));
    assert!(record.message().contains("500"));
    assert!(record.message().contains("\"status\": \"error\""));
}

#[test]
fn test_self_reference_serializes_once_marked() {
    let o = ObjectRef::new();
    o.insert("name", "test");
    o.insert("self", o.clone());

    let text = serialize(&FailureValue::from(o)).unwrap();
    assert!(text.contains("\"name\": \"test\""));
    assert!(text.contains("\"self\": \"[Circular]\""));
    assert_eq!(text.matches(CIRCULAR_MARKER).count(), 1);
}

#[test]
fn test_composites_never_leak_default_stringification() {
    let cyclic = ObjectRef::new();
    cyclic.insert("self", cyclic.clone());

    let nested_message = ObjectRef::new();
    nested_message.insert("message", ObjectRef::new());

    let unencodable = ObjectRef::new();
    unencodable.insert("amount", FailureValue::BigInt("1".into()));

    let inputs: Vec<RawFailure> = vec![
        json!({}).into(),
        json!([]).into(),
        json!({"a": {"b": {"c": 1}}}).into(),
        json!({"error": {"code": 1}}).into(),
        cyclic.into(),
        nested_message.into(),
        unencodable.into(),
        ArrayRef::new().into(),
    ];

    for input in inputs {
        let record = normalize(input);
        assert_ne!(record.message(), OBJECT_OBJECT);
        assert!(!record.message().contains(OBJECT_OBJECT));
        assert!(!record.message().is_empty());
    }
}

#[test]
fn test_deeply_nested_value_keeps_upper_levels() {
    let root = ObjectRef::new();
    root.insert("code", 500);
    let mut current = root.clone();
    for _ in 0..200 {
        let next = ObjectRef::new();
        current.insert("next", next.clone());
        current = next;
    }

    let record = normalize(root);
    assert!(record.message().contains("\"code\": 500"));
    assert_eq!(record.message().matches(MAX_DEPTH_MARKER).count(), 1);
    assert_eq!(record.original_value(), Some(record.message()));
}

#[test]
fn test_error_field_extraction() {
    let record = normalize(json!({
        "error": "支付失败",
        "details": {
            "code": "PAYMENT_TIMEOUT",
            "orderId": "123456",
            "amount": 99.99
        }
    }));
    assert_eq!(record.message(), "支付失败");
    assert!(record.original_value().unwrap().contains("PAYMENT_TIMEOUT"));
}

#[test]
fn test_scenario_plain_string() {
    let record = normalize("network down");
    assert_eq!(record.message(), "network down");
    assert!(!record.is_native_exception());
}

#[test]
fn test_scenario_host_api_failure() {
    let record = normalize(json!({"errMsg": "request:fail timeout", "errno": 600001}));
    assert_eq!(record.message(), "request:fail timeout");
    let original = record.original_value().unwrap();
    assert!(original.contains("\"errno\": 600001"));

    let typed = normalize(HostApiFailure::new("request:fail timeout").with_errno(600001));
    assert_eq!(typed, record);
}

#[test]
fn test_scenario_business_error() {
    let record = normalize(json!({"code": 1001, "message": "用户未登录", "data": null}));
    assert_eq!(record.message(), "用户未登录");
}

#[test]
fn test_scenario_cyclic_direct_serialize() {
    let o = ObjectRef::new();
    o.insert("name", "test");
    o.insert("self", o.clone());

    let text = serialize(&FailureValue::from(o.clone())).unwrap();
    assert!(text.contains("\"name\": \"test\""));
    assert!(text.contains(CIRCULAR_MARKER));

    let record = normalize(o);
    assert!(record.message().contains("\"name\": \"test\""));
}

#[test]
fn test_normalize_is_safe_across_threads() {
    let shared = ObjectRef::new();
    shared.insert("msg", "shared failure");
    shared.insert("self", shared.clone());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let value = shared.clone();
            std::thread::spawn(move || normalize(value))
        })
        .collect();

    for handle in handles {
        let record = handle.join().unwrap();
        assert_eq!(record.message(), "shared failure");
        assert_eq!(
            record.original_value().unwrap().matches(CIRCULAR_MARKER).count(),
            1
        );
    }
}

#[test]
fn test_record_serializes_for_transmission() {
    let record = normalize(json!({"msg": "x", "code": 2}));
    let json = serde_json::to_value(&record).unwrap();

    assert_eq!(json["kind"], "Error");
    assert_eq!(json["message"], "x");
    assert_eq!(json["is_native_exception"], false);
    assert!(json["original_value"].as_str().unwrap().contains("\"code\": 2"));
    assert!(json.get("stack").is_none());
}
