use std::sync::Arc;

use tokio::sync::watch;

use crate::config::ToastConfig;

use super::store::ToastStore;
use super::timers::DismissTimers;
use super::types::{NewToast, Toast, ToastId, ToastLevel, ToastOptions};
use super::ToastError;

struct ToasterInner {
    config: ToastConfig,
    store: ToastStore,
    timers: DismissTimers,
}

/// Notification façade used by the rest of the app.
///
/// Owns the toast queue together with one auto-dismiss timer per toast. Any
/// path that removes a toast (dismissal, action, eviction, clear) cancels its
/// timer. Construct it inside a tokio runtime; without one, toasts stay until
/// dismissed.
#[derive(Clone)]
pub struct Toaster {
    inner: Arc<ToasterInner>,
}

impl Toaster {
    pub fn new(config: ToastConfig) -> Self {
        Self {
            inner: Arc::new(ToasterInner {
                store: ToastStore::new(config.capacity),
                timers: DismissTimers::new(),
                config,
            }),
        }
    }

    pub fn success(&self, options: ToastOptions) -> ToastId {
        self.notify(ToastLevel::Success, options)
    }

    pub fn error(&self, options: ToastOptions) -> ToastId {
        self.notify(ToastLevel::Error, options)
    }

    pub fn warning(&self, options: ToastOptions) -> ToastId {
        self.notify(ToastLevel::Warning, options)
    }

    pub fn info(&self, options: ToastOptions) -> ToastId {
        self.notify(ToastLevel::Info, options)
    }

    /// Queue a toast at `level`, scheduling its dismissal when it has a
    /// non-zero duration.
    pub fn notify(&self, level: ToastLevel, options: ToastOptions) -> ToastId {
        let duration_ms = options
            .duration_ms
            .unwrap_or_else(|| self.inner.config.default_duration_ms(level));

        let added = self.inner.store.add_toast(NewToast {
            level,
            title: options.title,
            message: options.message,
            actions: options.actions,
            details: options.details,
            duration_ms,
        });

        for evicted in &added.evicted {
            self.inner.timers.cancel(&evicted.id);
        }

        let id = added.toast.id.clone();
        if let Some(after) = added.toast.auto_dismiss_after() {
            let inner = Arc::downgrade(&self.inner);
            let expired = id.clone();
            self.inner.timers.schedule(id.clone(), after, move || {
                if let Some(inner) = inner.upgrade() {
                    inner.timers.finish(&expired);
                    if inner.store.remove_toast(&expired).is_some() {
                        tracing::debug!(id = %expired, "toast auto-dismissed");
                    }
                }
            });
        }

        tracing::debug!(%id, %level, duration_ms, "toast queued");
        id
    }

    /// Remove a toast and cancel its timer. Unknown ids are ignored.
    pub fn dismiss(&self, id: &ToastId) -> bool {
        self.inner.timers.cancel(id);
        self.inner.store.remove_toast(id).is_some()
    }

    pub fn clear(&self) {
        let cancelled = self.inner.timers.cancel_all();
        let removed = self.inner.store.clear_toasts();
        tracing::debug!(removed = removed.len(), cancelled, "toasts cleared");
    }

    /// Run the action at `index` on toast `id`, then dismiss the toast.
    pub fn invoke_action(&self, id: &ToastId, index: usize) -> Result<(), ToastError> {
        let toast = self
            .inner
            .store
            .get(id)
            .ok_or_else(|| ToastError::NotFound(id.to_string()))?;
        let action = toast
            .actions
            .get(index)
            .ok_or_else(|| ToastError::NoSuchAction {
                id: id.to_string(),
                index,
            })?;

        action.run();
        self.dismiss(id);
        Ok(())
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.inner.store.toasts()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Toast>> {
        self.inner.store.subscribe()
    }

    pub fn store(&self) -> &ToastStore {
        &self.inner.store
    }

    pub fn config(&self) -> &ToastConfig {
        &self.inner.config
    }

    /// Number of auto-dismiss timers still waiting to fire.
    pub fn pending_timers(&self) -> usize {
        self.inner.timers.pending()
    }
}

impl Default for Toaster {
    fn default() -> Self {
        Self::new(ToastConfig::default())
    }
}
