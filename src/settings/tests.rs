//! Config management tests: precedence, masking, reveal, and save feedback.

use std::io::Write;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use tempfile::NamedTempFile;

use crate::db::Database;
use crate::settings::{ConfigSource, SettingsPanel, SettingsService};
use crate::toast::{ToastLevel, Toaster};

fn env_file(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp env file");
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    file
}

fn service(env: &NamedTempFile) -> SettingsService {
    let db = Arc::new(Database::open_in_memory().expect("in-memory DB"));
    SettingsService::new(db, env.path())
}

fn edit(key: &str, value: &str) -> (String, Option<String>) {
    (key.to_string(), Some(value.to_string()))
}

#[test]
fn ensure_initialized_imports_only_missing_keys() {
    let env = env_file(&["APP_NAME=studio", "OPENAI_API_KEY=sk-abcdefghijklmnop"]);
    let service = service(&env);
    service.upsert(vec![edit("APP_NAME", "from-db")]).unwrap();

    assert_eq!(service.ensure_initialized().unwrap(), 1);
    assert_eq!(service.ensure_initialized().unwrap(), 0);

    assert_eq!(service.reveal("APP_NAME").unwrap().as_deref(), Some("from-db"));
    let entries = service.list_effective().unwrap();
    assert!(entries.iter().all(|entry| entry.source == ConfigSource::Db));
    let key = entries.iter().find(|e| e.key == "OPENAI_API_KEY").unwrap();
    assert!(key.is_sensitive);
}

#[test]
fn list_effective_merges_sorts_and_masks() {
    let env = env_file(&[
        "zeta=last",
        "APP_NAME=studio",
        "OPENAI_API_KEY=sk-abcdefghijklmnop",
        "log_level=info",
    ]);
    let service = service(&env);
    service.upsert(vec![edit("APP_NAME", "studio-db")]).unwrap();

    let entries = service.list_effective().unwrap();
    let keys: Vec<&str> = entries.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(keys, vec!["APP_NAME", "log_level", "OPENAI_API_KEY", "zeta"]);

    let app = &entries[0];
    assert_eq!(app.value, "studio-db");
    assert_eq!(app.source, ConfigSource::Db);
    assert!(!app.is_masked);

    let key = &entries[2];
    assert_eq!(key.value, "sk-a******mnop");
    assert!(key.is_sensitive);
    assert!(key.is_masked);
    assert_eq!(key.source, ConfigSource::Env);
}

#[test]
fn reveal_prefers_database_then_env() {
    let env = env_file(&["OPENAI_API_KEY=sk-env-value-123456"]);
    let service = service(&env);

    assert_eq!(
        service.reveal("OPENAI_API_KEY").unwrap().as_deref(),
        Some("sk-env-value-123456")
    );
    service
        .upsert(vec![edit("OPENAI_API_KEY", "sk-db-value-654321")])
        .unwrap();
    assert_eq!(
        service.reveal(" OPENAI_API_KEY ").unwrap().as_deref(),
        Some("sk-db-value-654321")
    );
    assert_eq!(service.reveal("MISSING").unwrap(), None);
    assert!(service.reveal("  ").is_err());
}

#[test]
fn masked_placeholder_never_overwrites_secret() {
    let env = env_file(&[]);
    let service = service(&env);
    service.upsert(vec![edit("SENSITIVE_KEY", "secret123456")]).unwrap();

    let outcome = service
        .upsert(vec![edit("SENSITIVE_KEY", "secr******3456")])
        .unwrap();
    assert_eq!(outcome.updated, 0);
    assert_eq!(outcome.skipped, 1);
    assert_eq!(
        service.reveal("SENSITIVE_KEY").unwrap().as_deref(),
        Some("secret123456")
    );
}

#[test]
fn blank_keys_and_missing_values_are_skipped() {
    let env = env_file(&[]);
    let service = service(&env);
    let outcome = service
        .upsert(vec![
            ("  ".to_string(), Some("x".to_string())),
            ("FEATURE_FLAG".to_string(), None),
            edit("NEW_CONFIG_KEY", "new_value"),
        ])
        .unwrap();
    assert_eq!(outcome.updated, 1);
    assert_eq!(outcome.skipped, 2);
    assert!(!outcome.restart_required());
}

#[test]
fn restart_keys_are_reported() {
    let env = env_file(&[]);
    let service = service(&env);
    let outcome = service
        .upsert(vec![
            edit("DATABASE_URL", "postgresql://new_url"),
            edit("THEME", "dark"),
        ])
        .unwrap();
    assert_eq!(outcome.updated, 2);
    assert_eq!(outcome.restart_keys, vec!["DATABASE_URL".to_string()]);
    assert!(outcome.message().contains("restart required for DATABASE_URL"));
}

#[test]
fn duplicate_keys_keep_the_last_value() {
    let env = env_file(&[]);
    let service = service(&env);
    let outcome = service
        .upsert(vec![edit("THEME", "light"), edit("THEME", "dark")])
        .unwrap();
    assert_eq!(outcome.updated, 1);
    assert_eq!(service.reveal("THEME").unwrap().as_deref(), Some("dark"));
}

#[test]
fn remove_falls_back_to_env_value() {
    let env = env_file(&["THEME=light"]);
    let service = service(&env);
    service.upsert(vec![edit("THEME", "dark")]).unwrap();

    assert!(service.remove("THEME").unwrap());
    assert!(!service.remove("THEME").unwrap());
    assert_eq!(service.reveal("THEME").unwrap().as_deref(), Some("light"));
    assert!(service.remove(" ").is_err());
}

#[tokio::test]
async fn panel_reveal_and_conceal() {
    let env = env_file(&["OPENAI_API_KEY=sk-abcdefghijklmnop"]);
    let mut panel = SettingsPanel::new(service(&env), Toaster::default());
    panel.load().unwrap();

    assert_eq!(panel.display_value("OPENAI_API_KEY"), Some("sk-a******mnop"));
    assert_eq!(
        panel.reveal("OPENAI_API_KEY").unwrap(),
        Some("sk-abcdefghijklmnop")
    );
    assert!(panel.is_revealed("OPENAI_API_KEY"));
    assert_eq!(panel.display_value("OPENAI_API_KEY"), Some("sk-abcdefghijklmnop"));

    assert!(panel.conceal("OPENAI_API_KEY"));
    assert!(!panel.conceal("OPENAI_API_KEY"));
    assert_eq!(panel.display_value("OPENAI_API_KEY"), Some("sk-a******mnop"));
}

#[tokio::test]
async fn panel_save_toasts_by_outcome() {
    let env = env_file(&[]);
    let toaster = Toaster::default();
    let mut panel = SettingsPanel::new(service(&env), toaster.clone());

    panel.save(vec![edit("THEME", "dark")]).unwrap();
    panel.save(vec![edit("LOG_LEVEL", "debug")]).unwrap();
    panel.save(vec![("THEME".to_string(), None)]).unwrap();

    let levels: Vec<ToastLevel> = toaster.toasts().iter().map(|t| t.level).collect();
    assert_eq!(
        levels,
        vec![ToastLevel::Success, ToastLevel::Warning, ToastLevel::Info]
    );
    assert_eq!(panel.display_value("THEME"), Some("dark"));
}

#[tokio::test]
async fn panel_load_failure_becomes_error_toast() {
    let dir = tempfile::tempdir().unwrap();
    let bad_env = dir.path().join(".env");
    std::fs::create_dir(&bad_env).unwrap();

    let db = Arc::new(Database::open_in_memory().unwrap());
    let toaster = Toaster::default();
    let mut panel = SettingsPanel::new(SettingsService::new(db, &bad_env), toaster.clone());

    assert!(panel.load().is_err());
    let toasts = toaster.toasts();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].level, ToastLevel::Error);
    assert!(toasts[0].details.as_deref().unwrap_or("").contains(".env"));
}
