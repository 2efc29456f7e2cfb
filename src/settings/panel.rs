use std::collections::HashMap;

use crate::toast::{ToastOptions, Toaster};

use super::service::{EffectiveConfig, SettingsService, UpdateOutcome};
use super::SettingsError;

/// State behind the settings screen: the effective entries, which masked
/// values the user has chosen to reveal, and save feedback through toasts.
pub struct SettingsPanel {
    service: SettingsService,
    toaster: Toaster,
    entries: Vec<EffectiveConfig>,
    revealed: HashMap<String, String>,
}

impl SettingsPanel {
    pub fn new(service: SettingsService, toaster: Toaster) -> Self {
        Self {
            service,
            toaster,
            entries: Vec::new(),
            revealed: HashMap::new(),
        }
    }

    pub fn load(&mut self) -> Result<&[EffectiveConfig], SettingsError> {
        match self.service.list_effective() {
            Ok(entries) => {
                self.entries = entries;
                Ok(&self.entries)
            }
            Err(error) => {
                self.toaster.error(
                    ToastOptions::new("Failed to load configuration", "Could not read settings")
                        .with_details(error.to_string()),
                );
                Err(error)
            }
        }
    }

    pub fn entries(&self) -> &[EffectiveConfig] {
        &self.entries
    }

    /// Fetch and remember the raw value of a masked entry.
    pub fn reveal(&mut self, key: &str) -> Result<Option<&str>, SettingsError> {
        let value = match self.service.reveal(key) {
            Ok(value) => value,
            Err(error) => {
                self.toaster.error(
                    ToastOptions::new("Failed to reveal value", format!("Could not read {key}"))
                        .with_details(error.to_string()),
                );
                return Err(error);
            }
        };

        let key = key.trim();
        match value {
            Some(value) => {
                self.revealed.insert(key.to_string(), value);
                Ok(self.revealed.get(key).map(String::as_str))
            }
            None => {
                self.revealed.remove(key);
                Ok(None)
            }
        }
    }

    pub fn conceal(&mut self, key: &str) -> bool {
        self.revealed.remove(key.trim()).is_some()
    }

    pub fn is_revealed(&self, key: &str) -> bool {
        self.revealed.contains_key(key)
    }

    /// What the screen shows for `key`: the revealed raw value if any, else
    /// the (possibly masked) effective value.
    pub fn display_value(&self, key: &str) -> Option<&str> {
        if let Some(value) = self.revealed.get(key) {
            return Some(value);
        }
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.value.as_str())
    }

    /// Persist edits, reload, and report the result as a toast.
    pub fn save(&mut self, edits: Vec<(String, Option<String>)>) -> Result<UpdateOutcome, SettingsError> {
        let edited: Vec<String> = edits.iter().map(|(key, _)| key.trim().to_string()).collect();

        let outcome = match self.service.upsert(edits) {
            Ok(outcome) => outcome,
            Err(error) => {
                self.toaster.error(
                    ToastOptions::new("Failed to save configuration", "Your changes were not saved")
                        .with_details(error.to_string()),
                );
                return Err(error);
            }
        };

        for key in &edited {
            self.revealed.remove(key);
        }
        self.load()?;

        let message = outcome.message();
        if outcome.restart_required() {
            self.toaster
                .warning(ToastOptions::new("Restart required", message));
        } else if outcome.updated > 0 {
            self.toaster
                .success(ToastOptions::new("Configuration saved", message));
        } else {
            self.toaster.info(ToastOptions::new("Nothing to save", message));
        }
        Ok(outcome)
    }
}
