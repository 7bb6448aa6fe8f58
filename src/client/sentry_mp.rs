//! Reporting client handle
//!
//! [`SentryMp`] wraps a [`ReportingBackend`] with an explicit lifecycle:
//! create it with a backend, [`init`](SentryMp::init) it once, share it by
//! cloning, and [`close`](SentryMp::close) it on shutdown. Calls made while the
//! handle is not initialized are no-ops that log a warning.

use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, error, info, warn};
use serde_json::{Map, Value};

use crate::backend::{Event, ReportingBackend};
use crate::config::SentryConfig;
use crate::error::ReporterError;
use crate::normalize::{normalize, to_json, NormalizedError};
use crate::types::{
    Breadcrumb, EventId, FailureValue, Level, NativeException, RawFailure, Scope, ScopeUpdate,
    UserInfo,
};

/// Extra key holding the structured form of a non-exception failure value.
pub const ORIGINAL_ERROR_EXTRA: &str = "originalErrorData";
/// Extra key holding caller context passed to [`SentryMp::capture_error`].
pub const ERROR_CONTEXT_EXTRA: &str = "errorContext";
/// Extra key holding the reason of an unhandled promise rejection.
pub const UNHANDLED_REJECTION_EXTRA: &str = "unhandledRejection";
/// Message reported for a rejection that carried no reason.
pub const UNHANDLED_REJECTION_MESSAGE: &str = "unhandled promise rejection";

struct ClientInner {
    backend: Arc<dyn ReportingBackend>,
    config: RwLock<Option<SentryConfig>>,
}

/// Client handle forwarding failures to a reporting backend.
#[derive(Clone)]
pub struct SentryMp {
    inner: Arc<ClientInner>,
}

impl std::fmt::Debug for SentryMp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentryMp")
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}

impl SentryMp {
    pub fn new<B: ReportingBackend + 'static>(backend: B) -> Self {
        Self::with_backend(Arc::new(backend))
    }

    pub fn with_backend(backend: Arc<dyn ReportingBackend>) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                backend,
                config: RwLock::new(None),
            }),
        }
    }

    /// Initialize the backend.
    ///
    /// A disabled config leaves the handle uninitialized. A second call on an
    /// initialized handle is ignored with a warning.
    ///
    /// The `before_init` hook and the backend run without the handle locked,
    /// so either may call back into this handle. Until `init` returns, the
    /// handle still reports itself as uninitialized.
    pub fn init(&self, config: SentryConfig) -> Result<(), ReporterError> {
        if self.is_initialized() {
            warn!("[SentryMp] already initialized, ignoring repeated init");
            return Ok(());
        }
        if !config.enabled() {
            info!("[SentryMp] reporting disabled by config");
            return Ok(());
        }

        let mut options = config.backend_options();
        if let Some(hook) = config.before_init() {
            options = hook(options);
        }
        self.inner.backend.init(options)?;

        let tags = config.tags().clone();
        {
            let mut state = self.write_config();
            if state.is_some() {
                warn!("[SentryMp] initialized concurrently, keeping the first config");
                return Ok(());
            }
            info!(
                "[SentryMp] initialized (environment={}, release={})",
                config.environment().unwrap_or("-"),
                config.release().unwrap_or("-")
            );
            *state = Some(config);
        }

        for (key, value) in tags {
            self.inner
                .backend
                .update_scope(ScopeUpdate::SetTag(key, value));
        }
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.read_config().is_some()
    }

    /// The active config, if initialized.
    pub fn config(&self) -> Option<SentryConfig> {
        self.read_config().clone()
    }

    /// Flush the backend and return to the uninitialized state.
    pub fn close(&self) {
        let closed = self.write_config().take();
        if closed.is_some() {
            self.inner.backend.flush();
            info!("[SentryMp] closed");
        }
    }

    /// Normalize `value` and report it as an exception.
    ///
    /// Returns `None` when the handle is not initialized.
    pub fn capture_exception(&self, value: impl Into<RawFailure>) -> Option<EventId> {
        self.capture_with_extras(value.into(), Vec::new())
    }

    /// [`capture_exception`](Self::capture_exception) with caller context
    /// attached to the same event under [`ERROR_CONTEXT_EXTRA`].
    pub fn capture_error(
        &self,
        value: impl Into<RawFailure>,
        context: Map<String, Value>,
    ) -> Option<EventId> {
        let extras = vec![(ERROR_CONTEXT_EXTRA.to_string(), Value::Object(context))];
        self.capture_with_extras(value.into(), extras)
    }

    pub fn capture_message(&self, message: impl Into<String>, level: Level) -> Option<EventId> {
        if !self.ensure_initialized() {
            return None;
        }
        let event_id = self
            .inner
            .backend
            .capture_event(Event::message(message, level));
        debug!("[SentryMp] captured message {}", event_id);
        Some(event_id)
    }

    pub fn add_breadcrumb(&self, breadcrumb: Breadcrumb) {
        if self.ensure_initialized() {
            self.inner.backend.add_breadcrumb(breadcrumb);
        }
    }

    pub fn set_user(&self, user: UserInfo) {
        if self.ensure_initialized() {
            info!("[SentryMp] user set (id={})", user.id);
            self.inner
                .backend
                .update_scope(ScopeUpdate::SetUser(Some(user)));
        }
    }

    /// Forget the current user (on logout).
    pub fn clear_user(&self) {
        if self.ensure_initialized() {
            self.inner.backend.update_scope(ScopeUpdate::SetUser(None));
            info!("[SentryMp] user cleared");
        }
    }

    pub fn set_tag(&self, key: impl Into<String>, value: impl Into<String>) {
        if self.ensure_initialized() {
            self.inner
                .backend
                .update_scope(ScopeUpdate::SetTag(key.into(), value.into()));
        }
    }

    pub fn set_tags<K, V>(&self, tags: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.configure_scope(|scope| scope.set_tags(tags));
    }

    pub fn set_context(&self, key: impl Into<String>, value: impl Into<Value>) {
        if self.ensure_initialized() {
            self.inner
                .backend
                .update_scope(ScopeUpdate::SetContext(key.into(), value.into()));
        }
    }

    pub fn set_extra(&self, key: impl Into<String>, value: impl Into<Value>) {
        if self.ensure_initialized() {
            self.inner
                .backend
                .update_scope(ScopeUpdate::SetExtra(key.into(), value.into()));
        }
    }

    /// Collect several scope updates and apply them in order.
    pub fn configure_scope<F>(&self, f: F)
    where
        F: FnOnce(&mut Scope),
    {
        if !self.ensure_initialized() {
            return;
        }
        let mut scope = Scope::default();
        f(&mut scope);
        for update in scope.into_updates() {
            self.inner.backend.update_scope(update);
        }
    }

    /// Run `f`, reporting its error before handing it back.
    pub fn wrap_sync<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: std::error::Error,
    {
        f().map_err(|err| {
            self.capture_exception(NativeException::from_error(&err));
            err
        })
    }

    /// Await `future`, reporting its error before handing it back.
    pub async fn wrap_async<T, E, Fut>(&self, future: Fut) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
        E: std::error::Error,
    {
        future.await.map_err(|err| {
            self.capture_exception(NativeException::from_error(&err));
            err
        })
    }

    /// Host global error hook: the host passes the error text with its stack.
    pub fn on_app_error(&self, error: &str) -> Option<EventId> {
        self.capture_exception(NativeException::from_host_text(error))
    }

    /// Host unhandled promise rejection hook.
    pub fn on_unhandled_rejection(&self, reason: Option<FailureValue>) -> Option<EventId> {
        match reason {
            Some(reason) => {
                error!(
                    "[SentryMp] unhandled promise rejection ({})",
                    reason.type_name()
                );
                let detail = to_json(&reason).unwrap_or_else(|_| Value::Null);
                let extras = vec![(
                    UNHANDLED_REJECTION_EXTRA.to_string(),
                    serde_json::json!({ "reason": detail }),
                )];
                self.capture_with_extras(reason.into(), extras)
            }
            None => {
                error!("[SentryMp] unhandled promise rejection without reason");
                self.capture_exception(UNHANDLED_REJECTION_MESSAGE)
            }
        }
    }

    /// Host page-not-found hook.
    pub fn on_page_not_found(&self, path: &str) -> Option<EventId> {
        self.capture_message(format!("page not found: {}", path), Level::Warning)
    }

    fn capture_with_extras(
        &self,
        raw: RawFailure,
        extras: Vec<(String, Value)>,
    ) -> Option<EventId> {
        if !self.ensure_initialized() {
            return None;
        }

        let record = normalize(raw);
        let mut event = Event::from_error(&record);
        if let Some(original) = original_extra(&record) {
            event.extra.insert(ORIGINAL_ERROR_EXTRA.to_string(), original);
        }
        event.extra.extend(extras);

        let event_id = self.inner.backend.capture_event(event);
        debug!("[SentryMp] captured exception {} ({})", event_id, record);
        Some(event_id)
    }

    fn ensure_initialized(&self) -> bool {
        if self.is_initialized() {
            return true;
        }
        warn!("[SentryMp] not initialized, call init() first");
        false
    }

    fn read_config(&self) -> RwLockReadGuard<'_, Option<SentryConfig>> {
        self.inner
            .config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_config(&self) -> RwLockWriteGuard<'_, Option<SentryConfig>> {
        self.inner
            .config
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// The serialized original value re-read as structured data.
fn original_extra(record: &NormalizedError) -> Option<Value> {
    let text = record.original_value()?;
    Some(serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string())))
}
