//! Sentry error reporting for WeChat Mini Programs
//!
//! Forwards failures raised inside a Mini Program host to a Sentry-compatible
//! backend. Host failures are weakly typed: plain strings, `fail` callback
//! objects like `{errMsg, errno}`, business payloads, even self-referencing
//! object graphs. Every one of them is normalized into a readable message
//! before it is reported, so no event ever reads `[object Object]`.
//!
//! ## Normalization
//!
//! | Input | Message | Original value kept |
//! |-------|---------|---------------------|
//! | Native exception | its own message | no |
//! | Text | the text | no |
//! | Object with `message` / `errMsg` / `msg` / `error` | that field | yes |
//! | Other object or array | indented JSON of the value | yes |
//! | Number, boolean, null | literal text | no |
//!
//! Cycles are rendered as `"[Circular]"`.
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use wechat_mp_sentry::{backend::MemoryBackend, SentryConfig, SentryMp};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = SentryMp::new(MemoryBackend::new());
//! client.init(
//!     SentryConfig::builder()
//!         .dsn("https://public_key@sentry.example.com/42")
//!         .environment("production")
//!         .release("1.0.0")
//!         .build()?,
//! )?;
//!
//! // wx.request fail callback payload
//! let event_id = client.capture_exception(json!({
//!     "errMsg": "request:fail timeout",
//!     "errno": 600001
//! }));
//! assert!(event_id.is_some());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`normalize`] - Error normalization and the cycle-safe serializer
//! - [`client`] - The reporting client handle
//! - [`backend`] - Backend trait and the in-memory backend
//! - [`config`] - Init options, DSN parsing and hooks
//! - [`helpers`] - Breadcrumb and user helpers
//! - [`types`] - Failure values, exceptions and scope types
//! - [`error`] - Error types
//!
//! ## Error Handling
//!
//! Normalization never fails. Configuration and backend setup return
//! [`ReporterError`]:
//!
//! ```rust
//! use wechat_mp_sentry::{ReporterError, SentryConfig};
//!
//! match SentryConfig::builder().dsn("YOUR_SENTRY_DSN").build() {
//!     Ok(_) => unreachable!(),
//!     Err(ReporterError::Dsn(reason)) => eprintln!("bad DSN: {}", reason),
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

pub mod backend;
pub mod client;
pub mod config;
pub mod error;
pub mod helpers;
pub mod normalize;
pub mod types;
mod utils;

pub use client::SentryMp;
pub use config::SentryConfig;
pub use error::{ReporterError, SerializationError};
pub use normalize::{normalize, serialize, NormalizedError};
