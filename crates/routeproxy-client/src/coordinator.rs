//! Debounced, cancellable request coordination for the two address fields.

use std::sync::Arc;
use std::time::Duration;

use futures::future::{AbortHandle, Abortable};
use parking_lot::Mutex;
use routeproxy_core::models::{LngLat, PlaceSuggestion, MIN_QUERY_CHARS};
use tokio::sync::watch;

use crate::api::ProxyApi;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::state::{Field, Notice, Phase, RouteView, UiState};

/// Coordinator tuning
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Quiet period after the last edit before suggestions are requested
    pub debounce: Duration,

    /// Proximity hint sent with suggestion requests; the proxy default
    /// applies when unset
    pub proximity: Option<LngLat>,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            debounce: ClientConfig::DEFAULT_DEBOUNCE,
            proximity: None,
        }
    }
}

impl From<&ClientConfig> for CoordinatorConfig {
    fn from(config: &ClientConfig) -> Self {
        Self {
            debounce: config.debounce,
            ..Default::default()
        }
    }
}

struct Shared {
    ui: UiState,
    /// Pending debounce or in-flight request per field
    tasks: [Option<AbortHandle>; 2],
    /// Identifies the most recent route request
    route_ticket: u64,
}

impl Shared {
    fn cancel(&mut self, field: Field) {
        if let Some(handle) = self.tasks[field.index()].take() {
            handle.abort();
        }
    }
}

struct Inner {
    api: Arc<dyn ProxyApi>,
    config: CoordinatorConfig,
    shared: Mutex<Shared>,
    updates: watch::Sender<UiState>,
}

impl Inner {
    fn publish(&self, shared: &Shared) {
        self.updates.send_replace(shared.ui.clone());
    }

    /// Wait out the debounce, then fetch suggestions for the field's text
    ///
    /// Every state mutation re-checks `handle` under the lock: once the
    /// handle is aborted the task may still be running, but it no longer
    /// owns the field.
    async fn debounced_fetch(self: Arc<Self>, field: Field, handle: AbortHandle) {
        tokio::time::sleep(self.config.debounce).await;

        let query = {
            let mut shared = self.shared.lock();
            if handle.is_aborted() {
                return;
            }

            let state = shared.ui.field_mut(field);
            let text = state.text.trim().to_string();

            if text.chars().count() < MIN_QUERY_CHARS {
                state.clear_suggestions();
                shared.tasks[field.index()] = None;
                self.publish(&shared);
                return;
            }

            if !state.focused {
                tracing::debug!(field = %field, "Field not focused, skipping suggestions");
                shared.tasks[field.index()] = None;
                return;
            }

            state.phase = Phase::AwaitingSuggestions;
            self.publish(&shared);
            text
        };

        tracing::debug!(field = %field, query = %query, "Requesting suggestions");
        let result = self.api.suggestions(&query, self.config.proximity).await;

        let mut shared = self.shared.lock();
        if handle.is_aborted() {
            tracing::debug!(field = %field, query = %query, "Discarding superseded suggestions");
            return;
        }
        shared.tasks[field.index()] = None;

        match result {
            Ok(suggestions) => {
                let state = shared.ui.field_mut(field);
                state.suggestions = suggestions;
                state.suggestions_for = Some(query);
            }
            Err(e) => {
                tracing::warn!(field = %field, error = %e, "Suggestion request failed");
                let state = shared.ui.field_mut(field);
                state.clear_suggestions();
                state.phase = Phase::Idle;
                shared.ui.notices.push(Notice::SuggestionsUnavailable(field));
            }
        }
        self.publish(&shared);
    }
}

/// Owner of [`UiState`] and of every request issued on its behalf
///
/// Must be used from within a tokio runtime: edits spawn the debounce task.
pub struct RequestCoordinator {
    inner: Arc<Inner>,
}

impl RequestCoordinator {
    pub fn new(api: Arc<dyn ProxyApi>, config: CoordinatorConfig) -> Self {
        let (updates, _) = watch::channel(UiState::default());
        let shared = Shared {
            ui: UiState::default(),
            tasks: [None, None],
            route_ticket: 0,
        };

        Self {
            inner: Arc::new(Inner {
                api,
                config,
                shared: Mutex::new(shared),
                updates,
            }),
        }
    }

    /// Receive a snapshot after every state change
    pub fn subscribe(&self) -> watch::Receiver<UiState> {
        self.inner.updates.subscribe()
    }

    pub fn snapshot(&self) -> UiState {
        self.inner.shared.lock().ui.clone()
    }

    /// Drain pending notices
    pub fn take_notices(&self) -> Vec<Notice> {
        let mut shared = self.inner.shared.lock();
        let notices = std::mem::take(&mut shared.ui.notices);
        if !notices.is_empty() {
            self.inner.publish(&shared);
        }
        notices
    }

    /// Give input focus to `field`; the other field loses it
    pub fn focus(&self, field: Field) {
        let mut shared = self.inner.shared.lock();
        for f in Field::ALL {
            shared.ui.field_mut(f).focused = f == field;
        }
        self.inner.publish(&shared);
    }

    pub fn blur(&self, field: Field) {
        let mut shared = self.inner.shared.lock();
        shared.ui.field_mut(field).focused = false;
        self.inner.publish(&shared);
    }

    /// Record a keystroke
    ///
    /// Clears the field's coordinates, cancels its pending debounce and any
    /// in-flight request, and restarts the debounce.
    pub fn edit(&self, field: Field, text: impl Into<String>) {
        let (handle, registration) = AbortHandle::new_pair();

        {
            let mut shared = self.inner.shared.lock();
            shared.cancel(field);

            let state = shared.ui.field_mut(field);
            state.text = text.into();
            state.coords = None;
            state.phase = Phase::Typing;

            shared.tasks[field.index()] = Some(handle.clone());
            self.inner.publish(&shared);
        }

        let inner = self.inner.clone();
        tokio::spawn(Abortable::new(inner.debounced_fetch(field, handle), registration));
    }

    /// Pick the suggestion at `index` for `field`
    ///
    /// Records its coordinates and place name, clears the list and cancels
    /// outstanding work. No further suggestions are fetched for the field
    /// until it is edited again.
    pub fn select(&self, field: Field, index: usize) -> Result<PlaceSuggestion> {
        let mut shared = self.inner.shared.lock();

        let suggestions = &shared.ui.field(field).suggestions;
        let chosen = suggestions.get(index).cloned().ok_or(ClientError::NoSuchSuggestion {
            field,
            index,
            available: suggestions.len(),
        })?;

        shared.cancel(field);

        let state = shared.ui.field_mut(field);
        state.text = chosen.place_name.clone();
        state.coords = Some(chosen.center);
        state.clear_suggestions();
        state.phase = Phase::Resolved;

        self.inner.publish(&shared);
        Ok(chosen)
    }

    /// Exchange the start and end fields
    ///
    /// Outstanding work for both fields is cancelled; unresolved fields fall
    /// back to `Typing` with no suggestions. Focus stays where it was.
    pub fn swap(&self) {
        let mut shared = self.inner.shared.lock();
        for field in Field::ALL {
            shared.cancel(field);
        }

        let ui = &mut shared.ui;
        std::mem::swap(&mut ui.start, &mut ui.end);
        std::mem::swap(&mut ui.start.focused, &mut ui.end.focused);

        for field in Field::ALL {
            let state = ui.field_mut(field);
            if state.phase != Phase::Resolved {
                state.clear_suggestions();
                state.phase = if state.text.is_empty() {
                    Phase::Idle
                } else {
                    Phase::Typing
                };
            }
        }
        ui.route = None;

        self.inner.publish(&shared);
    }

    pub fn clear_route(&self) {
        let mut shared = self.inner.shared.lock();
        shared.ui.route = None;
        self.inner.publish(&shared);
    }

    /// Request a route between the two resolved fields
    ///
    /// Without both coordinates this raises [`Notice::MissingCoordinates`]
    /// and makes no network call. A failure raises [`Notice::RouteFailed`]
    /// and keeps the previous route. A response is dropped with
    /// [`ClientError::Superseded`] when either field changed or a newer route
    /// request was issued while it was in flight. `is_loading` is cleared
    /// even if the returned future is dropped before completing.
    pub async fn compute_route(&self) -> Result<RouteView> {
        let (ticket, start, end) = {
            let mut shared = self.inner.shared.lock();
            let Some((start, end)) = shared.ui.endpoints() else {
                shared.ui.notices.push(Notice::MissingCoordinates);
                self.inner.publish(&shared);
                return Err(ClientError::MissingCoordinates);
            };

            shared.route_ticket += 1;
            shared.ui.is_loading = true;
            self.inner.publish(&shared);
            (shared.route_ticket, start, end)
        };
        let loading = LoadingGuard {
            inner: &self.inner,
            ticket,
            armed: true,
        };

        tracing::debug!(start = %start, end = %end, "Requesting route");
        let result = self.inner.api.route(start, end).await;

        let mut shared = self.inner.shared.lock();
        loading.release(&mut shared);

        let current = shared.route_ticket == ticket && shared.ui.endpoints() == Some((start, end));
        let outcome = match result {
            _ if !current => {
                tracing::debug!(start = %start, end = %end, "Discarding superseded route");
                Err(ClientError::Superseded)
            }
            Ok(summary) => {
                let view = RouteView::new(summary, start, end);
                shared.ui.route = Some(view.clone());
                Ok(view)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Route request failed");
                shared.ui.notices.push(Notice::RouteFailed);
                Err(e)
            }
        };

        self.inner.publish(&shared);
        outcome
    }
}

/// Clears `is_loading` for a route request, including when the request's
/// future is dropped mid-flight
struct LoadingGuard<'a> {
    inner: &'a Inner,
    ticket: u64,
    armed: bool,
}

impl LoadingGuard<'_> {
    /// Clear the flag under a lock the caller already holds
    fn release(mut self, shared: &mut Shared) {
        if shared.route_ticket == self.ticket {
            shared.ui.is_loading = false;
        }
        self.armed = false;
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut shared = self.inner.shared.lock();
        if shared.route_ticket == self.ticket {
            shared.ui.is_loading = false;
            self.inner.publish(&shared);
        }
    }
}

impl Drop for RequestCoordinator {
    fn drop(&mut self) {
        let mut shared = self.inner.shared.lock();
        for field in Field::ALL {
            shared.cancel(field);
        }
    }
}
