use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use super::types::ToastId;

/// Pending auto-dismiss tasks, one per toast.
pub(crate) struct DismissTimers {
    runtime: Option<Handle>,
    pending: Mutex<HashMap<ToastId, JoinHandle<()>>>,
}

impl DismissTimers {
    pub(crate) fn new() -> Self {
        let runtime = Handle::try_current().ok();
        if runtime.is_none() {
            tracing::warn!("no tokio runtime; toasts will stay until dismissed");
        }
        Self {
            runtime,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Run `on_expire` after `after` unless cancelled first.
    ///
    /// The handle is recorded before the lock is released, so an expiry
    /// racing this call always finds its own entry in `finish`.
    pub(crate) fn schedule<F>(&self, id: ToastId, after: Duration, on_expire: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        let Some(runtime) = self.runtime.as_ref() else {
            return false;
        };

        let mut pending = self.lock();
        let handle = runtime.spawn(async move {
            tokio::time::sleep(after).await;
            on_expire();
        });
        if let Some(previous) = pending.insert(id, handle) {
            previous.abort();
        }
        true
    }

    /// Abort the pending timer for `id`. Returns false when none was pending.
    pub(crate) fn cancel(&self, id: &ToastId) -> bool {
        match self.lock().remove(id) {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    pub(crate) fn cancel_all(&self) -> usize {
        let drained: Vec<JoinHandle<()>> = self.lock().drain().map(|(_, handle)| handle).collect();
        for handle in &drained {
            handle.abort();
        }
        drained.len()
    }

    /// Forget the entry for a timer that fired on its own.
    pub(crate) fn finish(&self, id: &ToastId) {
        self.lock().remove(id);
    }

    pub(crate) fn pending(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ToastId, JoinHandle<()>>> {
        self.pending.lock().expect("toast timer mutex poisoned")
    }
}

impl Drop for DismissTimers {
    fn drop(&mut self) {
        if let Ok(pending) = self.pending.get_mut() {
            for (_, handle) in pending.drain() {
                handle.abort();
            }
        }
    }
}
