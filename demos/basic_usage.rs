//! Basic usage example for wechat-mp-sentry
//!
//! Run with: cargo run --example basic_usage

use serde_json::json;
use wechat_mp_sentry::{
    backend::MemoryBackend, helpers::log_page_view, types::Level, SentryConfig, SentryMp,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let backend = MemoryBackend::new();
    let sentry = SentryMp::new(backend.clone());
    sentry.init(
        SentryConfig::builder()
            .dsn("https://public_key@sentry.example.com/42")
            .release("1.0.0")
            .environment("development")
            .tag("platform", "wechat-miniprogram")
            .build()?,
    )?;

    log_page_view(&sentry, "pages/index/index", None);
    sentry.capture_exception(json!({"errMsg": "request:fail timeout", "errno": 600001}));
    sentry.capture_message("app launched", Level::Info);

    for event in backend.events() {
        println!("{}", serde_json::to_string_pretty(&event)?);
    }

    sentry.close();
    Ok(())
}
