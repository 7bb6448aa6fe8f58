//! Error normalization example for wechat-mp-sentry
//!
//! Shows the message produced for each kind of failure a Mini Program raises.
//!
//! Run with: cargo run --example error_handling

use serde_json::json;
use wechat_mp_sentry::{
    backend::MemoryBackend,
    normalize,
    types::{FailureValue, HostApiFailure, NativeException, ObjectRef, RawFailure},
    SentryConfig, SentryMp,
};

#[derive(Debug, thiserror::Error)]
#[error("inventory for sku {0} is exhausted")]
struct OutOfStock(String);

async fn reserve(sku: &str) -> Result<(), OutOfStock> {
    Err(OutOfStock(sku.to_string()))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cyclic = ObjectRef::new();
    cyclic.insert("name", "test");
    cyclic.insert("self", cyclic.clone());

    let failures: Vec<(&str, RawFailure)> = vec![
        ("exception", NativeException::new("TypeError", "x is undefined").into()),
        ("text", "network down".into()),
        ("host api", HostApiFailure::new("request:fail timeout").with_errno(600001).into()),
        ("business", json!({"code": 1001, "message": "用户未登录"}).into()),
        ("no message", json!({"code": 500, "status": "error"}).into()),
        ("cyclic", cyclic.into()),
        ("number", FailureValue::from(404).into()),
    ];

    for (label, failure) in failures {
        let record = normalize(failure);
        println!("[{}] {}", label, record);
        if let Some(original) = record.original_value() {
            println!("    original: {}", original.replace('\n', "\n    "));
        }
    }

    let backend = MemoryBackend::new();
    let sentry = SentryMp::new(backend.clone());
    sentry.init(
        SentryConfig::builder()
            .dsn("https://public_key@sentry.example.com/42")
            .build()?,
    )?;

    if let Err(e) = sentry.wrap_async(reserve("A-100")).await {
        println!("reserve failed and was reported: {}", e);
    }
    println!("events recorded: {}", backend.events().len());

    Ok(())
}
