//! Canvas event bus.
//!
//! Decouples the components that raise canvas intents (preview, edit, delete,
//! regenerate on characters and shots) from the components that handle them.
//!
//! # Architecture
//!
//! - `event_types`: the closed registry of kinds and their payloads
//! - `EventBus`: per-kind listener sets, synchronous in-order dispatch
//! - `Subscription`: idempotent cancel handle returned by `EventBus::on`
//!
//! Dispatch is synchronous and re-entrant: a listener may emit again and the
//! nested dispatch completes before the outer one continues.

mod event_bus;
mod event_types;

pub use event_bus::{EventBus, Listener, Subscription};
pub use event_types::{
    CanvasEvent, Character, CharacterId, CharacterRef, DeleteCharacter, DeleteShot,
    EditCharacter, EditShot, EventKind, ImagePreview, PreviewImage, PreviewVideo,
    RegenerateCharacter, RegenerateShot, Shot, ShotMedia, ShotRef, ShotRegeneration,
    VideoPreview,
};

#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("unknown canvas event: {0}")]
    UnknownEvent(String),
}
