//! Reporter configuration
//!
//! [`SentryConfig`] is built through [`SentryConfig::builder`] and validated
//! once in [`SentryConfigBuilder::build`]. At init time it is turned into the
//! [`BackendOptions`](crate::backend::BackendOptions) handed to the backend.

mod builder;
mod dsn;

pub use builder::SentryConfigBuilder;
pub use dsn::Dsn;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::backend::{BackendOptions, Event};
use crate::types::Breadcrumb;

pub(crate) const DEFAULT_SAMPLE_RATE: f32 = 1.0;

/// Rewrites backend options right before the backend is initialized.
pub type BeforeInit = Arc<dyn Fn(BackendOptions) -> BackendOptions + Send + Sync>;
/// Inspects or drops an event before it is sent.
pub type BeforeSend = Arc<dyn Fn(Event) -> Option<Event> + Send + Sync>;
/// Inspects or drops a breadcrumb before it is recorded.
pub type BeforeBreadcrumb = Arc<dyn Fn(Breadcrumb) -> Option<Breadcrumb> + Send + Sync>;

/// Breadcrumb categories recorded automatically. All enabled by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreadcrumbOptions {
    pub console: bool,
    pub request: bool,
    pub navigation: bool,
    pub api: bool,
    pub lifecycle: bool,
    pub unhandled_error: bool,
}

impl Default for BreadcrumbOptions {
    fn default() -> Self {
        Self {
            console: true,
            request: true,
            navigation: true,
            api: true,
            lifecycle: true,
            unhandled_error: true,
        }
    }
}

impl BreadcrumbOptions {
    /// Whether `breadcrumb` belongs to an enabled category.
    ///
    /// The breadcrumb type is checked first, then its category. Types and
    /// categories outside the known set are always permitted.
    pub fn permits(&self, breadcrumb: &Breadcrumb) -> bool {
        [breadcrumb.ty.as_deref(), breadcrumb.category.as_deref()]
            .into_iter()
            .flatten()
            .find_map(|name| self.toggle_for(name))
            .unwrap_or(true)
    }

    fn toggle_for(&self, name: &str) -> Option<bool> {
        match name {
            "console" => Some(self.console),
            "http" | "request" => Some(self.request),
            "navigation" | "page" => Some(self.navigation),
            "api" => Some(self.api),
            "lifecycle" => Some(self.lifecycle),
            "error" | "unhandled-error" => Some(self.unhandled_error),
            _ => None,
        }
    }
}

/// Initialization options for [`SentryMp::init`](crate::client::SentryMp::init).
#[derive(Clone)]
pub struct SentryConfig {
    pub(crate) dsn: Dsn,
    pub(crate) release: Option<String>,
    pub(crate) environment: Option<String>,
    pub(crate) enabled: bool,
    pub(crate) sample_rate: f32,
    pub(crate) breadcrumbs: BreadcrumbOptions,
    pub(crate) tags: BTreeMap<String, String>,
    pub(crate) before_init: Option<BeforeInit>,
    pub(crate) before_send: Option<BeforeSend>,
    pub(crate) before_breadcrumb: Option<BeforeBreadcrumb>,
}

impl std::fmt::Debug for SentryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentryConfig")
            .field("dsn", &self.dsn)
            .field("release", &self.release)
            .field("environment", &self.environment)
            .field("enabled", &self.enabled)
            .field("sample_rate", &self.sample_rate)
            .field("breadcrumbs", &self.breadcrumbs)
            .field("tags", &self.tags)
            .field("before_init", &self.before_init.as_ref().map(|_| ".."))
            .field("before_send", &self.before_send.as_ref().map(|_| ".."))
            .field(
                "before_breadcrumb",
                &self.before_breadcrumb.as_ref().map(|_| ".."),
            )
            .finish()
    }
}

impl SentryConfig {
    pub fn builder() -> SentryConfigBuilder {
        SentryConfigBuilder::default()
    }

    pub fn dsn(&self) -> &Dsn {
        &self.dsn
    }

    pub fn release(&self) -> Option<&str> {
        self.release.as_deref()
    }

    pub fn environment(&self) -> Option<&str> {
        self.environment.as_deref()
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn breadcrumbs(&self) -> &BreadcrumbOptions {
        &self.breadcrumbs
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    /// Backend options derived from this config, before `before_init` runs.
    pub fn backend_options(&self) -> BackendOptions {
        BackendOptions {
            dsn: self.dsn.clone(),
            release: self.release.clone(),
            environment: self.environment.clone(),
            sample_rate: self.sample_rate,
            breadcrumbs: self.breadcrumbs,
            before_send: self.before_send.clone(),
            before_breadcrumb: self.before_breadcrumb.clone(),
        }
    }

    pub(crate) fn before_init(&self) -> Option<&BeforeInit> {
        self.before_init.as_ref()
    }
}
