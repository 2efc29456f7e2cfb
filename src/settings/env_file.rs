use std::collections::BTreeMap;
use std::path::Path;

use super::SettingsError;

/// Parse a dotenv file into a key → value map. A missing file is empty.
///
/// Values are taken literally: no `$VAR` expansion, and lines that are not
/// `KEY=VALUE` are skipped rather than rejected.
pub fn load_env_file(path: &Path) -> Result<BTreeMap<String, String>, SettingsError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "env file not found; using database values only");
        return Ok(BTreeMap::new());
    }

    let contents = std::fs::read_to_string(path).map_err(|error| SettingsError::EnvFile {
        path: path.display().to_string(),
        message: error.to_string(),
    })?;

    let mut values = BTreeMap::new();
    for raw_line in contents.lines() {
        if let Some((key, value)) = parse_line(raw_line) {
            values.insert(key, value);
        }
    }
    Ok(values)
}

fn parse_line(raw_line: &str) -> Option<(String, String)> {
    let mut line = raw_line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    if line
        .get(..7)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("export "))
    {
        line = line[7..].trim_start();
    }

    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    let value = strip_inline_comment(value.trim());
    Some((key.to_string(), unquote(value.trim()).to_string()))
}

/// Cut a `#` comment that starts the value or follows whitespace, unless it
/// sits inside quotes.
fn strip_inline_comment(value: &str) -> &str {
    let mut in_single = false;
    let mut in_double = false;
    let mut prev: Option<char> = None;
    for (idx, ch) in value.char_indices() {
        match ch {
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            '#' if !in_single && !in_double && prev.map_or(true, char::is_whitespace) => {
                return value[..idx].trim_end();
            }
            _ => {}
        }
        prev = Some(ch);
    }
    value
}

fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2
        && bytes[0] == bytes[bytes.len() - 1]
        && (bytes[0] == b'\'' || bytes[0] == b'"')
    {
        return &value[1..value.len() - 1];
    }
    value
}
