//! Reporting backend seam
//!
//! The client never talks to an error-reporting service directly; it hands
//! events, breadcrumbs and scope updates to a [`ReportingBackend`]. Transport
//! and batching are the backend's concern.
//!
//! [`MemoryBackend`] keeps everything in memory and is what the tests and
//! demos run against.

mod event;
mod memory;

pub use event::{Event, ExceptionInfo};
pub use memory::MemoryBackend;

use crate::config::{BeforeBreadcrumb, BeforeSend, BreadcrumbOptions, Dsn};
use crate::error::ReporterError;
use crate::types::{Breadcrumb, EventId, ScopeUpdate};

/// Options a backend is initialized with
#[derive(Clone)]
pub struct BackendOptions {
    pub dsn: Dsn,
    pub release: Option<String>,
    pub environment: Option<String>,
    pub sample_rate: f32,
    pub breadcrumbs: BreadcrumbOptions,
    pub before_send: Option<BeforeSend>,
    pub before_breadcrumb: Option<BeforeBreadcrumb>,
}

impl std::fmt::Debug for BackendOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendOptions")
            .field("dsn", &self.dsn)
            .field("release", &self.release)
            .field("environment", &self.environment)
            .field("sample_rate", &self.sample_rate)
            .field("breadcrumbs", &self.breadcrumbs)
            .field("before_send", &self.before_send.as_ref().map(|_| ".."))
            .field(
                "before_breadcrumb",
                &self.before_breadcrumb.as_ref().map(|_| ".."),
            )
            .finish()
    }
}

/// An error-reporting service the client forwards to.
pub trait ReportingBackend: Send + Sync {
    fn init(&self, options: BackendOptions) -> Result<(), ReporterError>;

    /// Submit an event. Returns its id even when the backend drops it.
    fn capture_event(&self, event: Event) -> EventId;

    fn add_breadcrumb(&self, breadcrumb: Breadcrumb);

    fn update_scope(&self, update: ScopeUpdate);

    /// Deliver anything still buffered.
    fn flush(&self) {}
}
