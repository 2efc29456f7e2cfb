use rusqlite::{params, OptionalExtension, Row};
use serde::Serialize;

use super::{Database, DbError};

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigItemRow {
    pub key: String,
    pub value: String,
    pub description: Option<String>,
    pub is_sensitive: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl ConfigItemRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            key: row.get(0)?,
            value: row.get(1)?,
            description: row.get(2)?,
            is_sensitive: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }
}

const CONFIG_ITEM_COLUMNS: &str =
    "key, value, description, is_sensitive, created_at, updated_at";

// ---------------------------------------------------------------------------
// Config item queries
// ---------------------------------------------------------------------------

pub fn list_config_items(db: &Database) -> Result<Vec<ConfigItemRow>, DbError> {
    let conn = db.conn();
    let mut stmt = conn.prepare(&format!(
        "SELECT {CONFIG_ITEM_COLUMNS} FROM config_items ORDER BY key COLLATE NOCASE"
    ))?;
    let rows = stmt
        .query_map([], ConfigItemRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn get_config_item(db: &Database, key: &str) -> Result<Option<ConfigItemRow>, DbError> {
    let conn = db.conn();
    let mut stmt = conn.prepare(&format!(
        "SELECT {CONFIG_ITEM_COLUMNS} FROM config_items WHERE key = ?1"
    ))?;
    let row = stmt
        .query_row(params![key], ConfigItemRow::from_row)
        .optional()?;
    Ok(row)
}

/// Insert or replace every row in one transaction. `created_at` of an
/// existing row is preserved.
pub fn upsert_config_items(db: &Database, rows: &[ConfigItemRow]) -> Result<(), DbError> {
    if rows.is_empty() {
        return Ok(());
    }
    let conn = db.conn();
    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO config_items (key, value, description, is_sensitive, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(key)
             DO UPDATE SET value = excluded.value,
                           description = COALESCE(excluded.description, config_items.description),
                           is_sensitive = excluded.is_sensitive,
                           updated_at = excluded.updated_at",
        )?;
        for row in rows {
            stmt.execute(params![
                row.key,
                row.value,
                row.description,
                row.is_sensitive,
                row.created_at,
                row.updated_at,
            ])?;
        }
    }
    tx.commit()?;
    Ok(())
}

pub fn delete_config_item(db: &Database, key: &str) -> Result<(), DbError> {
    let conn = db.conn();
    let changed = conn.execute("DELETE FROM config_items WHERE key = ?1", params![key])?;
    if changed == 0 {
        return Err(DbError::NotFound(format!("config item {key}")));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Settings queries
// ---------------------------------------------------------------------------

pub fn upsert_setting(
    db: &Database,
    key: &str,
    value_json: &str,
    updated_at: &str,
) -> Result<(), DbError> {
    let conn = db.conn();
    conn.execute(
        "INSERT INTO settings (key, value_json, updated_at)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(key)
         DO UPDATE SET value_json = excluded.value_json, updated_at = excluded.updated_at",
        params![key, value_json, updated_at],
    )?;
    Ok(())
}

pub fn get_setting(db: &Database, key: &str) -> Result<Option<String>, DbError> {
    let conn = db.conn();
    let value = conn
        .query_row(
            "SELECT value_json FROM settings WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value)
}
