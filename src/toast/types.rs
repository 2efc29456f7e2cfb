use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Success,
    Error,
    Warning,
    Info,
}

impl ToastLevel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }

    pub const fn all() -> &'static [ToastLevel] {
        &[
            ToastLevel::Success,
            ToastLevel::Error,
            ToastLevel::Warning,
            ToastLevel::Info,
        ]
    }
}

impl fmt::Display for ToastLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// `toast-<unix millis>-<random suffix>`, unique for the life of the process.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToastId(String);

impl ToastId {
    pub(crate) fn generate() -> Self {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(8)
            .map(|byte| char::from(byte).to_ascii_lowercase())
            .collect();
        Self(format!("toast-{}-{suffix}", Utc::now().timestamp_millis()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ToastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ToastId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionVariant {
    Primary,
    Secondary,
    Danger,
}

/// Button rendered inside a toast.
#[derive(Clone)]
pub struct ToastAction {
    pub label: String,
    pub variant: Option<ActionVariant>,
    on_click: Arc<dyn Fn() + Send + Sync>,
}

impl ToastAction {
    pub fn new(label: impl Into<String>, on_click: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            label: label.into(),
            variant: None,
            on_click: Arc::new(on_click),
        }
    }

    pub fn with_variant(mut self, variant: ActionVariant) -> Self {
        self.variant = Some(variant);
        self
    }

    pub(crate) fn run(&self) {
        (self.on_click)()
    }
}

impl fmt::Debug for ToastAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToastAction")
            .field("label", &self.label)
            .field("variant", &self.variant)
            .finish_non_exhaustive()
    }
}

/// Caller-supplied content for the level constructors on
/// [`Toaster`](super::Toaster). Leaving `duration_ms` unset picks the level
/// default; `Some(0)` keeps the toast until it is dismissed.
#[derive(Debug, Clone, Default)]
pub struct ToastOptions {
    pub title: String,
    pub message: String,
    pub actions: Vec<ToastAction>,
    pub details: Option<String>,
    pub duration_ms: Option<u64>,
}

impl ToastOptions {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_action(mut self, action: ToastAction) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn persistent(self) -> Self {
        self.with_duration_ms(0)
    }
}

/// A toast before the store assigns its identity.
#[derive(Debug, Clone)]
pub struct NewToast {
    pub level: ToastLevel,
    pub title: String,
    pub message: String,
    pub actions: Vec<ToastAction>,
    pub details: Option<String>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub id: ToastId,
    pub level: ToastLevel,
    pub title: String,
    pub message: String,
    pub actions: Vec<ToastAction>,
    pub details: Option<String>,
    pub duration_ms: u64,
    pub created_at: String,
}

impl Toast {
    pub(crate) fn from_new(id: ToastId, new: NewToast) -> Self {
        Self {
            id,
            level: new.level,
            title: new.title,
            message: new.message,
            actions: new.actions,
            details: new.details,
            duration_ms: new.duration_ms,
            created_at: Utc::now().to_rfc3339(),
        }
    }

    /// `None` when the toast stays until dismissed.
    pub fn auto_dismiss_after(&self) -> Option<Duration> {
        (self.duration_ms > 0).then(|| Duration::from_millis(self.duration_ms))
    }

    pub fn to_view(&self) -> ToastView {
        ToastView {
            id: self.id.clone(),
            level: self.level,
            title: self.title.clone(),
            message: self.message.clone(),
            actions: self
                .actions
                .iter()
                .map(|action| ToastActionView {
                    label: action.label.clone(),
                    variant: action.variant,
                })
                .collect(),
            details: self.details.clone(),
            duration_ms: self.duration_ms,
            created_at: self.created_at.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ToastActionView {
    pub label: String,
    pub variant: Option<ActionVariant>,
}

/// Serializable form of a [`Toast`] for the rendering layer.
#[derive(Debug, Clone, Serialize)]
pub struct ToastView {
    pub id: ToastId,
    pub level: ToastLevel,
    pub title: String,
    pub message: String,
    pub actions: Vec<ToastActionView>,
    pub details: Option<String>,
    pub duration_ms: u64,
    pub created_at: String,
}
