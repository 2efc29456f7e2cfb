//! Canvas event registry.
//!
//! Single source of truth for the closed set of events the canvas bus can
//! dispatch and the payload each one carries. Every kind is an uninhabited
//! marker type implementing [`CanvasEvent`]; the trait is sealed, so the set
//! cannot grow outside this module.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::BusError;

// ---------------------------------------------------------------------------
// Domain entities carried by payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shot {
    pub id: i64,
    pub sequence: u32,
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
}

/// Which asset of a shot should be regenerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShotMedia {
    Image,
    Video,
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePreview {
    pub src: String,
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoPreview {
    pub src: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRef {
    pub character: Character,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterId {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotRef {
    pub shot: Shot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotRegeneration {
    pub id: i64,
    pub media: ShotMedia,
}

// ---------------------------------------------------------------------------
// Kinds
// ---------------------------------------------------------------------------

pub(crate) const EVENT_KIND_COUNT: usize = 8;

/// Runtime name of a canvas event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    PreviewImage,
    PreviewVideo,
    EditCharacter,
    RegenerateCharacter,
    DeleteCharacter,
    EditShot,
    RegenerateShot,
    DeleteShot,
}

impl EventKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PreviewImage => "preview-image",
            Self::PreviewVideo => "preview-video",
            Self::EditCharacter => "edit-character",
            Self::RegenerateCharacter => "regenerate-character",
            Self::DeleteCharacter => "delete-character",
            Self::EditShot => "edit-shot",
            Self::RegenerateShot => "regenerate-shot",
            Self::DeleteShot => "delete-shot",
        }
    }

    pub const fn all() -> &'static [EventKind] {
        &[
            EventKind::PreviewImage,
            EventKind::PreviewVideo,
            EventKind::EditCharacter,
            EventKind::RegenerateCharacter,
            EventKind::DeleteCharacter,
            EventKind::EditShot,
            EventKind::RegenerateShot,
            EventKind::DeleteShot,
        ]
    }

    /// Slot of this kind in the bus listener table.
    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = BusError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        EventKind::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str() == value.trim())
            .ok_or_else(|| BusError::UnknownEvent(value.to_string()))
    }
}

mod sealed {
    pub trait Sealed {}
}

/// A member of the canvas event registry.
///
/// The associated [`Payload`](CanvasEvent::Payload) is the only type a listener
/// for this kind may accept, so a mismatched listener or payload is rejected
/// at compile time.
pub trait CanvasEvent: sealed::Sealed + 'static {
    const KIND: EventKind;
    type Payload: Send + Sync + 'static;
}

macro_rules! canvas_events {
    ($($(#[$doc:meta])* $marker:ident => $payload:ty;)+) => {
        $(
            $(#[$doc])*
            #[derive(Debug)]
            pub enum $marker {}

            impl sealed::Sealed for $marker {}

            impl CanvasEvent for $marker {
                const KIND: EventKind = EventKind::$marker;
                type Payload = $payload;
            }
        )+
    };
}

canvas_events! {
    /// Open the lightbox on a still image.
    PreviewImage => ImagePreview;
    /// Open the player on a generated clip.
    PreviewVideo => VideoPreview;
    EditCharacter => CharacterRef;
    RegenerateCharacter => CharacterId;
    DeleteCharacter => CharacterRef;
    EditShot => ShotRef;
    /// Regenerate either the frame or the clip of a shot.
    RegenerateShot => ShotRegeneration;
    DeleteShot => ShotRef;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_round_trip_through_from_str() {
        for kind in EventKind::all() {
            assert_eq!(kind.as_str().parse::<EventKind>().unwrap(), *kind);
        }
    }

    #[test]
    fn unknown_kind_fails_fast() {
        let err = "rename-shot".parse::<EventKind>().unwrap_err();
        assert!(matches!(err, BusError::UnknownEvent(ref name) if name == "rename-shot"));
    }

    #[test]
    fn kind_indices_cover_the_listener_table() {
        assert_eq!(EventKind::all().len(), EVENT_KIND_COUNT);
        for (position, kind) in EventKind::all().iter().enumerate() {
            assert_eq!(kind.index(), position);
        }
    }

    #[test]
    fn kind_serializes_with_its_wire_name() {
        let json = serde_json::to_string(&EventKind::RegenerateShot).unwrap();
        assert_eq!(json, "\"regenerate-shot\"");
        assert_eq!(<RegenerateShot as CanvasEvent>::KIND, EventKind::RegenerateShot);
    }
}
