//! Database operations unit tests

use pretty_assertions::assert_eq;

use crate::db::queries::{self, ConfigItemRow};
use crate::db::{Database, DbError};

fn item(key: &str, value: &str, is_sensitive: bool, at: &str) -> ConfigItemRow {
    ConfigItemRow {
        key: key.to_string(),
        value: value.to_string(),
        description: None,
        is_sensitive,
        created_at: at.to_string(),
        updated_at: at.to_string(),
    }
}

#[test]
fn test_migrations_are_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("studio.db");

    let db = Database::open(&path).expect("first open");
    queries::upsert_config_items(&db, &[item("APP_NAME", "studio", false, "t0")]).unwrap();
    drop(db);

    let db = Database::open(&path).expect("reopen runs no migration twice");
    let rows = queries::list_config_items(&db).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].key, "APP_NAME");
}

#[test]
fn test_upsert_preserves_created_at_and_description() {
    let db = Database::open_in_memory().unwrap();
    let mut first = item("OPENAI_API_KEY", "sk-old-value", true, "2024-01-01T00:00:00Z");
    first.description = Some("provider key".to_string());
    queries::upsert_config_items(&db, &[first]).unwrap();

    let second = item("OPENAI_API_KEY", "sk-new-value", true, "2024-02-01T00:00:00Z");
    queries::upsert_config_items(&db, &[second]).unwrap();

    let stored = queries::get_config_item(&db, "OPENAI_API_KEY")
        .unwrap()
        .expect("row exists");
    assert_eq!(stored.value, "sk-new-value");
    assert_eq!(stored.description.as_deref(), Some("provider key"));
    assert_eq!(stored.created_at, "2024-01-01T00:00:00Z");
    assert_eq!(stored.updated_at, "2024-02-01T00:00:00Z");
}

#[test]
fn test_list_orders_keys_case_insensitively() {
    let db = Database::open_in_memory().unwrap();
    queries::upsert_config_items(
        &db,
        &[
            item("beta", "2", false, "t"),
            item("ALPHA", "1", false, "t"),
            item("Gamma", "3", false, "t"),
        ],
    )
    .unwrap();

    let keys: Vec<String> = queries::list_config_items(&db)
        .unwrap()
        .into_iter()
        .map(|row| row.key)
        .collect();
    assert_eq!(keys, vec!["ALPHA", "beta", "Gamma"]);
}

#[test]
fn test_get_missing_item_is_none() {
    let db = Database::open_in_memory().unwrap();
    assert!(queries::get_config_item(&db, "NOPE").unwrap().is_none());
    assert!(matches!(
        queries::delete_config_item(&db, "NOPE"),
        Err(DbError::NotFound(_))
    ));
}

#[test]
fn test_settings_round_trip() {
    let db = Database::open_in_memory().unwrap();
    assert!(queries::get_setting(&db, "studio_config").unwrap().is_none());

    queries::upsert_setting(&db, "studio_config", r#"{"a":1}"#, "t0").unwrap();
    queries::upsert_setting(&db, "studio_config", r#"{"a":2}"#, "t1").unwrap();
    assert_eq!(
        queries::get_setting(&db, "studio_config").unwrap().as_deref(),
        Some(r#"{"a":2}"#)
    );
}
