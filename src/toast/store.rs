use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use tokio::sync::watch;

use super::types::{NewToast, Toast, ToastId};

/// Result of [`ToastStore::add_toast`].
#[derive(Debug, Clone)]
pub struct Added {
    pub toast: Toast,
    /// Oldest entries pushed out to stay within capacity.
    pub evicted: Vec<Toast>,
}

/// Bounded FIFO queue of toasts.
///
/// Every mutation is one transition under one lock, after which the new
/// snapshot is published to [`subscribe`](Self::subscribe) receivers.
pub struct ToastStore {
    capacity: usize,
    queue: Mutex<VecDeque<Toast>>,
    tx: watch::Sender<Vec<Toast>>,
}

impl ToastStore {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _) = watch::channel(Vec::new());
        Self {
            capacity,
            queue: Mutex::new(VecDeque::with_capacity(capacity + 1)),
            tx,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Assign a fresh id, append, then evict from the head until the queue
    /// is back within capacity.
    pub fn add_toast(&self, new: NewToast) -> Added {
        let toast = Toast::from_new(ToastId::generate(), new);
        let mut queue = self.lock();
        queue.push_back(toast.clone());

        let mut evicted = Vec::new();
        while queue.len() > self.capacity {
            if let Some(oldest) = queue.pop_front() {
                evicted.push(oldest);
            }
        }
        self.publish(&queue);

        for toast in &evicted {
            tracing::debug!(id = %toast.id, "toast evicted at capacity");
        }
        Added { toast, evicted }
    }

    /// Remove the toast with `id`. Missing ids are ignored.
    pub fn remove_toast(&self, id: &ToastId) -> Option<Toast> {
        let mut queue = self.lock();
        let position = queue.iter().position(|toast| &toast.id == id)?;
        let removed = queue.remove(position);
        self.publish(&queue);
        removed
    }

    pub fn clear_toasts(&self) -> Vec<Toast> {
        let mut queue = self.lock();
        if queue.is_empty() {
            return Vec::new();
        }
        let drained: Vec<Toast> = queue.drain(..).collect();
        self.publish(&queue);
        drained
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.lock().iter().cloned().collect()
    }

    pub fn get(&self, id: &ToastId) -> Option<Toast> {
        self.lock().iter().find(|toast| &toast.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Receiver that always holds the current queue, oldest first.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Toast>> {
        self.tx.subscribe()
    }

    fn publish(&self, queue: &VecDeque<Toast>) {
        self.tx.send_replace(queue.iter().cloned().collect());
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Toast>> {
        self.queue.lock().expect("toast store mutex poisoned")
    }
}

impl Default for ToastStore {
    fn default() -> Self {
        Self::new(super::DEFAULT_CAPACITY)
    }
}
