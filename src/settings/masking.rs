//! Sensitive-key detection and value masking.

pub const MASK_VALUE: &str = "******";

const SENSITIVE_KEY_PARTS: &[&str] = &[
    "password",
    "passwd",
    "secret",
    "token",
    "api_key",
    "apikey",
    "private",
    "database_url",
    "redis_url",
];

const SENSITIVE_KEY_SUFFIXES: &[&str] = &["_key", "_token", "_secret", "_password"];

const RESTART_REQUIRED_KEYS: &[&str] = &[
    "APP_NAME",
    "ENVIRONMENT",
    "LOG_LEVEL",
    "API_V1_PREFIX",
    "CORS_ORIGINS",
    "DATABASE_URL",
    "DB_ECHO",
    "REDIS_URL",
    "PUBLIC_BASE_URL",
];

const RESTART_REQUIRED_PREFIXES: &[&str] = &["DATABASE_", "REDIS_"];

pub fn is_sensitive_key(key: &str) -> bool {
    let lowered = key.to_lowercase();
    SENSITIVE_KEY_SUFFIXES
        .iter()
        .any(|suffix| lowered.ends_with(suffix))
        || SENSITIVE_KEY_PARTS.iter().any(|part| lowered.contains(part))
}

/// Display form of a sensitive value: short values are fully hidden, longer
/// ones keep four characters on each side.
pub fn mask_value(value: Option<&str>) -> String {
    let trimmed = value.unwrap_or("").trim();
    let chars: Vec<char> = trimmed.chars().collect();
    if chars.len() <= 8 {
        return MASK_VALUE.to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}{MASK_VALUE}{tail}")
}

/// True when `value` is a masked placeholder sent back by a form rather than
/// a real edit.
pub fn is_masked_input(value: &str, existing: Option<&str>) -> bool {
    if !value.is_empty() && value.chars().all(|ch| ch == '*') {
        return true;
    }
    match existing {
        Some(existing) if !existing.is_empty() => value == mask_value(Some(existing)),
        _ => false,
    }
}

pub fn requires_restart(key: &str) -> bool {
    let upper = key.to_uppercase();
    RESTART_REQUIRED_KEYS.contains(&upper.as_str())
        || RESTART_REQUIRED_PREFIXES
            .iter()
            .any(|prefix| upper.starts_with(prefix))
}
