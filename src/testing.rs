//! Test helpers shared by the unit and scenario tests.

use std::sync::{Arc, Mutex};

use crate::bus::{Character, CharacterRef, Listener, Shot, ShotRef};

/// Listener that appends every payload it receives.
pub fn recorder<P: Clone + Send + Sync + 'static>() -> (Listener<P>, Arc<Mutex<Vec<P>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let listener: Listener<P> = Arc::new(move |payload: &P| {
        sink.lock().unwrap().push(payload.clone());
    });
    (listener, seen)
}

/// Shared, ordered log of which listener ran.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

pub fn character(id: i64, name: &str) -> CharacterRef {
    CharacterRef {
        character: Character {
            id,
            name: name.to_string(),
            description: None,
            image_url: Some(format!("/media/characters/{id}.png")),
        },
    }
}

pub fn shot(id: i64, sequence: u32) -> ShotRef {
    ShotRef {
        shot: Shot {
            id,
            sequence,
            description: format!("shot {sequence}"),
            image_url: None,
            video_url: None,
        },
    }
}

static STUDIO_ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Point `STUDIO_DATA_DIR` and `STUDIO_ENV_FILE` at `dir` for the lifetime
/// of the guard. Holding the guard serializes tests that touch the process
/// environment.
pub struct StudioEnvGuard {
    _lock: std::sync::MutexGuard<'static, ()>,
}

pub fn isolated_studio_env(dir: &std::path::Path) -> StudioEnvGuard {
    let lock = STUDIO_ENV_MUTEX
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    std::env::set_var("STUDIO_DATA_DIR", dir);
    std::env::set_var("STUDIO_ENV_FILE", dir.join(".env"));
    StudioEnvGuard { _lock: lock }
}

impl Drop for StudioEnvGuard {
    fn drop(&mut self) {
        std::env::remove_var("STUDIO_DATA_DIR");
        std::env::remove_var("STUDIO_ENV_FILE");
    }
}
