//! Capped, newest-first toast queue with per-toast expiry timers.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use agrimarket_domain::{
    AUTH_ERROR_TITLE, ApiFailure, Toast, ToastId, ToastKind, ToastOptions, ToastPosition,
    ToastSpec, auth_error_message,
};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};


/// Queue settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationQueueConfig {
    /// Maximum number of toasts displayed at once. Values below one are
    /// raised to one.
    pub max_toasts: usize,
    /// Lifetime of toasts created without an explicit duration.
    pub default_duration: Duration,
    /// Lifetime of authentication error toasts.
    pub auth_error_duration: Duration,
    /// Anchor of toasts created without an explicit position.
    pub default_position: ToastPosition,
}

impl Default for NotificationQueueConfig {
    fn default() -> Self {
        Self {
            max_toasts: 5,
            default_duration: Duration::from_millis(5000),
            auth_error_duration: Duration::from_millis(7000),
            default_position: ToastPosition::TopRight,
        }
    }
}

#[derive(Default)]
struct QueueState {
    toasts: VecDeque<Toast>,
    timers: HashMap<ToastId, JoinHandle<()>>,
}

impl QueueState {
    fn dismiss(&mut self, id: ToastId) -> bool {
        if let Some(timer) = self.timers.remove(&id) {
            timer.abort();
        }

        let before = self.toasts.len();
        self.toasts.retain(|toast| toast.id() != id);
        self.toasts.len() != before
    }

    fn expire(&mut self, id: ToastId) {
        self.timers.remove(&id);
        self.toasts.retain(|toast| toast.id() != id);
    }
}

impl Drop for QueueState {
    fn drop(&mut self) {
        for (_, timer) in self.timers.drain() {
            timer.abort();
        }
    }
}

/// Toast queue shared by every screen.
///
/// Cloning yields another handle to the same queue. Auto-dismiss timers run
/// on the ambient Tokio runtime; without one, toasts stay until removed.
#[derive(Clone)]
pub struct NotificationQueue {
    config: NotificationQueueConfig,
    state: Arc<Mutex<QueueState>>,
}

impl NotificationQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new(config: NotificationQueueConfig) -> Self {
        Self {
            config: NotificationQueueConfig {
                max_toasts: config.max_toasts.max(1),
                ..config
            },
            state: Arc::new(Mutex::new(QueueState::default())),
        }
    }

    /// Returns the effective configuration.
    #[must_use]
    pub fn config(&self) -> &NotificationQueueConfig {
        &self.config
    }

    /// Shows a toast and returns its identifier.
    ///
    /// The toast goes to the front; the oldest toasts beyond the cap are
    /// dropped together with their timers.
    pub fn add(&self, spec: ToastSpec) -> ToastId {
        let toast = Toast::from_spec(
            spec,
            self.config.default_duration,
            self.config.default_position,
        );
        let id = toast.id();
        let expiry = toast.auto_dismisses().then(|| toast.duration());

        let mut state = self.lock();
        state.toasts.push_front(toast);
        while state.toasts.len() > self.config.max_toasts {
            if let Some(evicted) = state.toasts.pop_back() {
                if let Some(timer) = state.timers.remove(&evicted.id()) {
                    timer.abort();
                }
                debug!(toast_id = %evicted.id(), "evicted toast over capacity");
            }
        }

        if let Some(duration) = expiry {
            match Handle::try_current() {
                Ok(handle) => {
                    let timer =
                        handle.spawn(expire_after(Arc::downgrade(&self.state), id, duration));
                    state.timers.insert(id, timer);
                }
                Err(_) => {
                    warn!(toast_id = %id, "no async runtime, toast will not auto-dismiss");
                }
            }
        }

        id
    }

    /// Removes a toast. Removing an unknown or already removed id is a no-op.
    pub fn remove(&self, id: ToastId) {
        if self.lock().dismiss(id) {
            debug!(toast_id = %id, "removed toast");
        }
    }

    /// Removes every toast and cancels every timer.
    pub fn clear_all(&self) {
        let mut state = self.lock();
        for (_, timer) in state.timers.drain() {
            timer.abort();
        }
        state.toasts.clear();
    }

    /// Returns the displayed toasts, newest first.
    #[must_use]
    pub fn toasts(&self) -> Vec<Toast> {
        self.lock().toasts.iter().cloned().collect()
    }

    /// Returns one displayed toast.
    #[must_use]
    pub fn get(&self, id: ToastId) -> Option<Toast> {
        self.lock()
            .toasts
            .iter()
            .find(|toast| toast.id() == id)
            .cloned()
    }

    /// Returns the number of displayed toasts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().toasts.len()
    }

    /// Returns whether no toast is displayed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().toasts.is_empty()
    }

    /// Shows a success toast.
    pub fn success(&self, message: impl Into<String>, options: ToastOptions) -> ToastId {
        self.add(ToastSpec::new(ToastKind::Success, message).with_options(options))
    }

    /// Shows an error toast.
    pub fn error(&self, message: impl Into<String>, options: ToastOptions) -> ToastId {
        self.add(ToastSpec::new(ToastKind::Error, message).with_options(options))
    }

    /// Shows a warning toast.
    pub fn warning(&self, message: impl Into<String>, options: ToastOptions) -> ToastId {
        self.add(ToastSpec::new(ToastKind::Warning, message).with_options(options))
    }

    /// Shows an info toast.
    pub fn info(&self, message: impl Into<String>, options: ToastOptions) -> ToastId {
        self.add(ToastSpec::new(ToastKind::Info, message).with_options(options))
    }

    /// Shows a loading toast. It never expires; remove it explicitly.
    pub fn loading(&self, message: impl Into<String>, options: ToastOptions) -> ToastId {
        self.add(
            ToastSpec::new(ToastKind::Loading, message).with_options(ToastOptions {
                duration: Some(Duration::ZERO),
                ..options
            }),
        )
    }

    /// Shows the error toast for a failed sign-in or sign-up.
    pub fn show_auth_error(&self, failure: &ApiFailure) -> ToastId {
        self.error(
            auth_error_message(failure),
            ToastOptions::default()
                .title(AUTH_ERROR_TITLE)
                .duration(self.config.auth_error_duration),
        )
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new(NotificationQueueConfig::default())
    }
}

impl std::fmt::Debug for NotificationQueue {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("NotificationQueue")
            .field("config", &self.config)
            .field("len", &self.len())
            .finish()
    }
}

async fn expire_after(state: Weak<Mutex<QueueState>>, id: ToastId, duration: Duration) {
    tokio::time::sleep(duration).await;

    let Some(state) = state.upgrade() else {
        return;
    };
    state
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .expire(id);
    debug!(toast_id = %id, "toast expired");
}
