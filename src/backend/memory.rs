use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::debug;

use super::{event::unix_timestamp, BackendOptions, Event, ReportingBackend};
use crate::error::ReporterError;
use crate::types::{Breadcrumb, EventId, ScopeState, ScopeUpdate};
use crate::utils::sample;

/// Breadcrumbs kept before the oldest is evicted.
pub const MAX_BREADCRUMBS: usize = 100;

#[derive(Default)]
struct MemoryState {
    options: Option<BackendOptions>,
    events: Vec<Event>,
    breadcrumbs: VecDeque<Breadcrumb>,
    scope: ScopeState,
    dropped: usize,
    flushes: usize,
}

/// In-memory backend that records everything it receives.
///
/// Applies the same pipeline a real backend would: sampling, scope merge,
/// `before_send`, breadcrumb category filtering and `before_breadcrumb`.
/// Clones share the same storage, so a clone kept by the caller can inspect
/// what the client sent.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
}

impl std::fmt::Debug for MemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("MemoryBackend")
            .field("initialized", &state.options.is_some())
            .field("events", &state.events.len())
            .field("breadcrumbs", &state.breadcrumbs.len())
            .finish_non_exhaustive()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.lock().options.is_some()
    }

    pub fn options(&self) -> Option<BackendOptions> {
        self.lock().options.clone()
    }

    /// Events accepted so far, oldest first.
    pub fn events(&self) -> Vec<Event> {
        self.lock().events.clone()
    }

    pub fn last_event(&self) -> Option<Event> {
        self.lock().events.last().cloned()
    }

    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        self.lock().breadcrumbs.iter().cloned().collect()
    }

    pub fn scope(&self) -> ScopeState {
        self.lock().scope.clone()
    }

    /// Events discarded by sampling, `before_send`, or for lack of `init`.
    pub fn dropped_count(&self) -> usize {
        self.lock().dropped
    }

    pub fn flush_count(&self) -> usize {
        self.lock().flushes
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ReportingBackend for MemoryBackend {
    fn init(&self, options: BackendOptions) -> Result<(), ReporterError> {
        let mut state = self.lock();
        if state.options.is_some() {
            debug!("[SentryMp] memory backend re-initialized");
        }
        state.options = Some(options);
        Ok(())
    }

    fn capture_event(&self, mut event: Event) -> EventId {
        let event_id = event.event_id;

        let before_send = {
            let mut state = self.lock();
            let Some(options) = state.options.as_ref() else {
                state.dropped += 1;
                return event_id;
            };
            if !sample(options.sample_rate) {
                debug!("[SentryMp] event {} dropped by sampling", event_id);
                state.dropped += 1;
                return event_id;
            }

            if event.release.is_none() {
                event.release = options.release.clone();
            }
            if event.environment.is_none() {
                event.environment = options.environment.clone();
            }
            let before_send = options.before_send.clone();

            let scope = &state.scope;
            for (key, value) in &scope.tags {
                event.tags.entry(key.clone()).or_insert_with(|| value.clone());
            }
            for (key, value) in &scope.extra {
                event.extra.entry(key.clone()).or_insert_with(|| value.clone());
            }
            for (key, value) in &scope.contexts {
                event
                    .contexts
                    .entry(key.clone())
                    .or_insert_with(|| value.clone());
            }
            if event.user.is_none() {
                event.user = scope.user.clone();
            }
            event.breadcrumbs = state.breadcrumbs.iter().cloned().collect();
            before_send
        };

        let event = match before_send {
            Some(hook) => match hook(event) {
                Some(event) => event,
                None => {
                    debug!("[SentryMp] event {} dropped by before_send", event_id);
                    self.lock().dropped += 1;
                    return event_id;
                }
            },
            None => event,
        };

        self.lock().events.push(event);
        event_id
    }

    fn add_breadcrumb(&self, mut breadcrumb: Breadcrumb) {
        let before_breadcrumb = {
            let state = self.lock();
            let Some(options) = state.options.as_ref() else {
                return;
            };
            if !options.breadcrumbs.permits(&breadcrumb) {
                return;
            }
            options.before_breadcrumb.clone()
        };

        if breadcrumb.timestamp.is_none() {
            breadcrumb.timestamp = Some(unix_timestamp());
        }
        let breadcrumb = match before_breadcrumb {
            Some(hook) => match hook(breadcrumb) {
                Some(breadcrumb) => breadcrumb,
                None => return,
            },
            None => breadcrumb,
        };

        let mut state = self.lock();
        if state.breadcrumbs.len() == MAX_BREADCRUMBS {
            state.breadcrumbs.pop_front();
        }
        state.breadcrumbs.push_back(breadcrumb);
    }

    fn update_scope(&self, update: ScopeUpdate) {
        self.lock().scope.apply(update);
    }

    fn flush(&self) {
        let mut state = self.lock();
        state.flushes += 1;
        debug!("[SentryMp] flushed {} events", state.events.len());
    }
}
