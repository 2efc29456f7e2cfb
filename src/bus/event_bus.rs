use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use super::event_types::{CanvasEvent, EventKind, EVENT_KIND_COUNT};

/// Shared callback for one event kind. Identity is the `Arc` allocation, so
/// registering the same `Arc` twice is a no-op.
pub type Listener<P> = Arc<dyn Fn(&P) + Send + Sync>;

struct Registration {
    id: u64,
    identity: usize,
    // Always a `Listener<K::Payload>` for the kind owning the slot.
    callback: Box<dyn Any + Send + Sync>,
}

#[derive(Default)]
struct ListenerTable {
    slots: [Vec<Registration>; EVENT_KIND_COUNT],
}

impl ListenerTable {
    fn remove(&mut self, kind: EventKind, id: u64) -> bool {
        let slot = &mut self.slots[kind.index()];
        let before = slot.len();
        slot.retain(|registration| registration.id != id);
        slot.len() != before
    }
}

/// Synchronous, typed fan-out for canvas UI intents.
///
/// Cloning is cheap and every clone dispatches to the same listeners.
#[derive(Clone)]
pub struct EventBus {
    table: Arc<Mutex<ListenerTable>>,
    next_id: Arc<AtomicU64>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            table: Arc::new(Mutex::new(ListenerTable::default())),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Register `listener` for `K`.
    ///
    /// The returned [`Subscription`] removes exactly this registration when
    /// cancelled. Re-registering an `Arc` that is already present keeps the
    /// original position and returns a handle to that registration.
    pub fn on<K: CanvasEvent>(&self, listener: Listener<K::Payload>) -> Subscription {
        let identity = identity_of(&listener);
        let mut table = self.lock();
        let slot = &mut table.slots[K::KIND.index()];

        if let Some(existing) = slot.iter().find(|r| r.identity == identity) {
            tracing::debug!(event = %K::KIND, "listener already registered; ignoring duplicate");
            return Subscription::new(&self.table, K::KIND, existing.id);
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        slot.push(Registration {
            id,
            identity,
            callback: Box::new(listener),
        });
        Subscription::new(&self.table, K::KIND, id)
    }

    /// Convenience: wrap a closure in a fresh [`Listener`] and register it.
    pub fn listen<K, F>(&self, callback: F) -> Subscription
    where
        K: CanvasEvent,
        F: Fn(&K::Payload) + Send + Sync + 'static,
    {
        self.on::<K>(Arc::new(callback))
    }

    /// Invoke every listener registered for `K`, in registration order.
    ///
    /// The listener list is captured before dispatch and no lock is held while
    /// callbacks run, so listeners may emit, subscribe or unsubscribe
    /// re-entrantly. A panicking listener is logged and skipped.
    pub fn emit<K: CanvasEvent>(&self, payload: &K::Payload) {
        let listeners: Vec<Listener<K::Payload>> = {
            let table = self.lock();
            table.slots[K::KIND.index()]
                .iter()
                .filter_map(|r| r.callback.downcast_ref::<Listener<K::Payload>>().cloned())
                .collect()
        };

        if listeners.is_empty() {
            tracing::trace!(event = %K::KIND, "no listeners; event dropped");
            return;
        }

        tracing::debug!(event = %K::KIND, listeners = listeners.len(), "dispatching canvas event");
        for (position, listener) in listeners.iter().enumerate() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| listener(payload)));
            if let Err(panic_err) = outcome {
                tracing::error!(
                    event = %K::KIND,
                    position,
                    "canvas event listener panicked: {}",
                    panic_message(panic_err.as_ref())
                );
            }
        }
    }

    /// Remove one listener for `K`, or every listener for `K` when `listener`
    /// is `None`. Returns how many registrations were removed.
    pub fn off<K: CanvasEvent>(&self, listener: Option<&Listener<K::Payload>>) -> usize {
        let mut table = self.lock();
        let slot = &mut table.slots[K::KIND.index()];
        let before = slot.len();
        match listener {
            Some(listener) => {
                let identity = identity_of(listener);
                slot.retain(|r| r.identity != identity);
            }
            None => slot.clear(),
        }
        before - slot.len()
    }

    /// Drop every listener of every kind.
    pub fn clear(&self) {
        let mut table = self.lock();
        for slot in table.slots.iter_mut() {
            slot.clear();
        }
        tracing::debug!("canvas event bus cleared");
    }

    pub fn listener_count<K: CanvasEvent>(&self) -> usize {
        self.lock().slots[K::KIND.index()].len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().slots.iter().all(Vec::is_empty)
    }

    fn lock(&self) -> MutexGuard<'_, ListenerTable> {
        self.table.lock().expect("event bus mutex poisoned")
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.lock();
        let mut map = f.debug_map();
        for kind in EventKind::all() {
            map.entry(&kind.as_str(), &table.slots[kind.index()].len());
        }
        map.finish()
    }
}

/// Cancel handle returned by [`EventBus::on`].
///
/// Dropping it leaves the listener registered; call [`cancel`](Self::cancel).
#[derive(Debug)]
#[must_use = "dropping a Subscription does not unsubscribe; keep it to cancel later"]
pub struct Subscription {
    table: Weak<Mutex<ListenerTable>>,
    kind: EventKind,
    id: u64,
    cancelled: AtomicBool,
}

impl Subscription {
    fn new(table: &Arc<Mutex<ListenerTable>>, kind: EventKind, id: u64) -> Self {
        Self {
            table: Arc::downgrade(table),
            kind,
            id,
            cancelled: AtomicBool::new(false),
        }
    }

    /// Remove the registration. Only the first call has an effect.
    pub fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }
        let Some(table) = self.table.upgrade() else {
            return;
        };
        let removed = table
            .lock()
            .expect("event bus mutex poisoned")
            .remove(self.kind, self.id);
        if !removed {
            tracing::trace!(event = %self.kind, "subscription already removed from bus");
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

fn identity_of<P>(listener: &Listener<P>) -> usize {
    Arc::as_ptr(listener) as *const () as usize
}

fn panic_message(panic_err: &(dyn Any + Send)) -> String {
    if let Some(message) = panic_err.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic_err.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
