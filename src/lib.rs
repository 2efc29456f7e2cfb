//! Studio backend library.
//!
//! In-process plumbing shared by the storyboard canvas and its settings
//! screen. It handles:
//! - Typed canvas events between decoupled views
//! - Bounded, auto-dismissing toast notifications
//! - Database setup and migration
//! - Config items with masking and reveal-on-demand
//!
//! # Architecture
//!
//! - `bus`: Typed publish/subscribe for canvas events
//! - `toast`: Toast queue, dismissal timers, and the `Toaster` facade
//! - `db`: Database layer with SQLite
//! - `settings`: Config items backed by the database and a dotenv file
//! - `config`: Studio configuration (toast durations, data directory)

pub mod bus;
pub mod config;
pub mod db;
pub mod settings;
pub mod toast;

#[cfg(test)]
mod testing;
#[cfg(test)]
mod tests;

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use bus::EventBus;
use config::StudioConfig;
use db::Database;
use settings::{SettingsPanel, SettingsService};
use toast::Toaster;

// ---------------------------------------------------------------------------
// Shared error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Db(#[from] db::DbError),
    #[error("{0}")]
    Config(#[from] config::ConfigError),
    #[error("{0}")]
    Settings(#[from] settings::SettingsError),
    #[error("{0}")]
    Toast(#[from] toast::ToastError),
    #[error("{0}")]
    Bus(#[from] bus::BusError),
}

impl Serialize for AppError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

// ---------------------------------------------------------------------------
// App state
// ---------------------------------------------------------------------------

/// Everything one studio session shares: the canvas bus, the toaster and
/// the config store. Cheap to clone.
#[derive(Clone)]
pub struct Studio {
    pub instance_id: String,
    pub config: StudioConfig,
    pub db: Arc<Database>,
    pub bus: EventBus,
    pub toaster: Toaster,
    pub settings: SettingsService,
}

impl Studio {
    pub fn new(config: StudioConfig, db: Arc<Database>) -> Result<Self, AppError> {
        config.validate()?;
        let instance_id = Uuid::new_v4().to_string();
        let settings = SettingsService::new(db.clone(), config.env_file_path());

        // A broken env file must not keep the studio from starting.
        match settings.ensure_initialized() {
            Ok(imported) if imported > 0 => {
                tracing::info!(imported, "imported config items from env file");
            }
            Ok(_) => {}
            Err(error) => {
                tracing::warn!(%error, "failed to import config items from env file");
            }
        }

        tracing::debug!(instance_id = %instance_id, "studio session started");
        Ok(Self {
            instance_id,
            toaster: Toaster::new(config.toast.clone()),
            bus: EventBus::new(),
            settings,
            config,
            db,
        })
    }

    pub fn open(config: StudioConfig) -> Result<Self, AppError> {
        let db = Arc::new(Database::open(config.db_path())?);
        Self::new(config, db)
    }

    pub fn in_memory(config: StudioConfig) -> Result<Self, AppError> {
        let db = Arc::new(Database::open_in_memory()?);
        Self::new(config, db)
    }

    /// Resolve the data directory from the environment, open its database
    /// and start from the configuration stored there.
    pub fn bootstrap() -> Result<Self, AppError> {
        let mut seed = StudioConfig::default();
        seed.apply_env_overrides();
        let db = Arc::new(Database::open(seed.db_path())?);

        let mut config = config::load_studio_config(&db)?;
        if config.data_dir.is_none() {
            config.data_dir = seed.data_dir.clone();
        }
        tracing::info!(db_path = %seed.db_path().display(), "studio database ready");
        Self::new(config, db)
    }

    pub fn settings_panel(&self) -> SettingsPanel {
        SettingsPanel::new(self.settings.clone(), self.toaster.clone())
    }

    /// Drop every listener and toast. Pending dismissal timers are aborted.
    pub fn shutdown(&self) {
        self.bus.clear();
        self.toaster.clear();
        tracing::debug!(instance_id = %self.instance_id, "studio session closed");
    }
}

impl std::fmt::Debug for Studio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Studio")
            .field("instance_id", &self.instance_id)
            .field("config", &self.config)
            .field("bus", &self.bus)
            .finish_non_exhaustive()
    }
}

/// Install the global fmt subscriber. `RUST_LOG` wins over the default
/// filter; calling this twice is harmless.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("studio_lib=debug,info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
