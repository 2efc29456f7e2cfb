//! Toast notifications.
//!
//! A bounded queue of user-facing notifications plus the timers that dismiss
//! them:
//! - `ToastStore`: FIFO queue, capacity 5 by default, oldest evicted first
//! - `Toaster`: level constructors (`success`, `error`, `warning`, `info`),
//!   dismissal, action buttons, auto-dismiss scheduling
//!
//! Renderers watch the queue through `Toaster::subscribe` and show
//! `Toast::to_view` snapshots.

mod store;
mod timers;
mod toaster;
mod types;


pub use store::{Added, ToastStore};
pub use toaster::Toaster;
pub use types::{
    ActionVariant, NewToast, Toast, ToastAction, ToastActionView, ToastId, ToastLevel,
    ToastOptions, ToastView,
};

pub const DEFAULT_CAPACITY: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum ToastError {
    #[error("toast not found: {0}")]
    NotFound(String),
    #[error("toast {id} has no action at index {index}")]
    NoSuchAction { id: String, index: usize },
}
