use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::db::queries::{self, ConfigItemRow};
use crate::db::{Database, DbError};

use super::env_file::load_env_file;
use super::masking::{is_masked_input, is_sensitive_key, mask_value, requires_restart};
use super::SettingsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Db,
    Env,
}

/// One row of the settings screen. `value` is masked when `is_masked`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectiveConfig {
    pub key: String,
    pub value: String,
    pub is_sensitive: bool,
    pub is_masked: bool,
    pub source: ConfigSource,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateOutcome {
    pub updated: usize,
    pub skipped: usize,
    pub restart_keys: Vec<String>,
}

impl UpdateOutcome {
    pub fn restart_required(&self) -> bool {
        !self.restart_keys.is_empty()
    }

    pub fn message(&self) -> String {
        let mut message = match self.updated {
            0 => "No configuration changes saved".to_string(),
            1 => "Saved 1 configuration item".to_string(),
            n => format!("Saved {n} configuration items"),
        };
        if self.skipped > 0 {
            message.push_str(&format!(", skipped {}", self.skipped));
        }
        if self.restart_required() {
            message.push_str(&format!(
                "; restart required for {}",
                self.restart_keys.join(", ")
            ));
        }
        message
    }
}

/// Configuration items stored in the database, layered over a dotenv file.
#[derive(Clone)]
pub struct SettingsService {
    db: Arc<Database>,
    env_file: PathBuf,
}

impl SettingsService {
    pub fn new(db: Arc<Database>, env_file: impl Into<PathBuf>) -> Self {
        Self {
            db,
            env_file: env_file.into(),
        }
    }

    pub fn env_file(&self) -> &Path {
        &self.env_file
    }

    /// Copy env-file keys missing from the database into it. Returns how many
    /// items were created.
    pub fn ensure_initialized(&self) -> Result<usize, SettingsError> {
        let env_values = load_env_file(&self.env_file)?;
        if env_values.is_empty() {
            return Ok(0);
        }

        let existing: HashMap<String, ConfigItemRow> = self.db_items()?;
        let now = Utc::now().to_rfc3339();
        let rows: Vec<ConfigItemRow> = env_values
            .into_iter()
            .filter(|(key, _)| !existing.contains_key(key))
            .map(|(key, value)| ConfigItemRow {
                is_sensitive: is_sensitive_key(&key),
                key,
                value,
                description: None,
                created_at: now.clone(),
                updated_at: now.clone(),
            })
            .collect();

        queries::upsert_config_items(&self.db, &rows)?;
        if !rows.is_empty() {
            tracing::info!(created = rows.len(), "imported config items from env file");
        }
        Ok(rows.len())
    }

    /// Every known key, database values taking precedence over the env file,
    /// sorted case-insensitively, with sensitive values masked.
    pub fn list_effective(&self) -> Result<Vec<EffectiveConfig>, SettingsError> {
        let env_values = load_env_file(&self.env_file)?;
        let db_items = self.db_items()?;

        let mut keys: Vec<&String> = env_values
            .keys()
            .chain(db_items.keys())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        keys.sort_by_key(|key| key.to_lowercase());

        let entries = keys
            .into_iter()
            .filter_map(|key| {
                let (value, is_sensitive, source) = match db_items.get(key) {
                    Some(item) => (
                        item.value.as_str(),
                        item.is_sensitive || is_sensitive_key(key),
                        ConfigSource::Db,
                    ),
                    None => (
                        env_values.get(key)?.as_str(),
                        is_sensitive_key(key),
                        ConfigSource::Env,
                    ),
                };
                let value = if is_sensitive {
                    mask_value(Some(value))
                } else {
                    value.to_string()
                };
                Some(EffectiveConfig {
                    key: key.clone(),
                    value,
                    is_sensitive,
                    is_masked: is_sensitive,
                    source,
                })
            })
            .collect();
        Ok(entries)
    }

    /// Unmasked value for `key`, database first, then env file.
    pub fn reveal(&self, key: &str) -> Result<Option<String>, SettingsError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(SettingsError::InvalidKey(key.to_string()));
        }
        if let Some(item) = queries::get_config_item(&self.db, key)? {
            return Ok(Some(item.value));
        }
        let mut env_values = load_env_file(&self.env_file)?;
        Ok(env_values.remove(key))
    }

    /// Save edits. Blank keys, `None` values and masked placeholders for
    /// sensitive keys are skipped; everything else is written in one
    /// transaction. A key listed twice keeps its last value.
    pub fn upsert<I, K>(&self, configs: I) -> Result<UpdateOutcome, SettingsError>
    where
        I: IntoIterator<Item = (K, Option<String>)>,
        K: AsRef<str>,
    {
        let env_values = load_env_file(&self.env_file)?;
        let existing = self.db_items()?;
        let now = Utc::now().to_rfc3339();

        let mut rows: Vec<ConfigItemRow> = Vec::new();
        let mut skipped = 0;
        for (raw_key, raw_value) in configs {
            let key = raw_key.as_ref().trim();
            let Some(value) = raw_value.filter(|_| !key.is_empty()) else {
                skipped += 1;
                continue;
            };

            let existing_item = existing.get(key);
            let effective_value = match existing_item {
                Some(item) => Some(item.value.as_str()),
                None => env_values.get(key).map(String::as_str),
            };
            let is_sensitive =
                existing_item.map(|item| item.is_sensitive).unwrap_or(false) || is_sensitive_key(key);
            if is_sensitive && is_masked_input(&value, effective_value) {
                tracing::debug!(key, "skipping masked value");
                skipped += 1;
                continue;
            }

            let row = ConfigItemRow {
                key: key.to_string(),
                value,
                description: existing_item.and_then(|item| item.description.clone()),
                is_sensitive,
                created_at: existing_item
                    .map(|item| item.created_at.clone())
                    .unwrap_or_else(|| now.clone()),
                updated_at: now.clone(),
            };
            match rows.iter_mut().find(|pending| pending.key == row.key) {
                Some(pending) => *pending = row,
                None => rows.push(row),
            }
        }

        queries::upsert_config_items(&self.db, &rows)?;

        let restart_keys: Vec<String> = rows
            .iter()
            .filter(|row| requires_restart(&row.key))
            .map(|row| row.key.clone())
            .collect();
        let outcome = UpdateOutcome {
            updated: rows.len(),
            skipped,
            restart_keys,
        };
        tracing::info!(
            updated = outcome.updated,
            skipped = outcome.skipped,
            restart_required = outcome.restart_required(),
            "config items saved"
        );
        Ok(outcome)
    }

    /// Drop the stored override for `key` so the env file value shows
    /// through again. Returns false when nothing was stored.
    pub fn remove(&self, key: &str) -> Result<bool, SettingsError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(SettingsError::InvalidKey(key.to_string()));
        }
        match queries::delete_config_item(&self.db, key) {
            Ok(()) => {
                tracing::info!(key, "config item removed");
                Ok(true)
            }
            Err(DbError::NotFound(_)) => Ok(false),
            Err(error) => Err(error.into()),
        }
    }

    fn db_items(&self) -> Result<HashMap<String, ConfigItemRow>, SettingsError> {
        Ok(queries::list_config_items(&self.db)?
            .into_iter()
            .map(|item| (item.key.clone(), item))
            .collect())
    }
}

impl std::fmt::Debug for SettingsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsService")
            .field("env_file", &self.env_file)
            .finish_non_exhaustive()
    }
}
