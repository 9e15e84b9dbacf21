//! `myaku.toml` configuration loading.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "myaku.toml";

/// Known keys in `myaku.toml` for config validation.
const KNOWN_CONFIG_KEYS: &[&str] = &["preferences_file", "base_url"];

/// Runtime configuration. Loaded from `myaku.toml` or defaults.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormConfig {
    /// Where remembered search options are stored. `None` keeps them in memory only.
    pub preferences_file: Option<PathBuf>,
    /// Scheme and host prepended to search URLs when printing them absolute
    /// (e.g. `https://myaku.example`).
    pub base_url: Option<String>,
}

/// Levenshtein distance over `char`s, kept in a single row.
fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == cb {
                diagonal
            } else {
                1 + diagonal.min(above).min(row[j])
            };
            diagonal = above;
        }
    }
    row[b.len()]
}

/// The known key closest to `key`, if it is near enough to be a typo.
fn closest_known_key(key: &str) -> Option<&'static str> {
    KNOWN_CONFIG_KEYS
        .iter()
        .map(|&known| (edit_distance(key, known), known))
        .filter(|&(distance, _)| distance <= 3)
        .min()
        .map(|(_, known)| known)
}

fn warn_unknown_key(key: &str) {
    match closest_known_key(key) {
        Some(suggestion) => warn!(key, suggestion, "Ignoring unknown key in {CONFIG_FILE_NAME}"),
        None => warn!(key, known = ?KNOWN_CONFIG_KEYS, "Ignoring unknown key in {CONFIG_FILE_NAME}"),
    }
}

/// Parse config from TOML text. Unknown keys warn; values of the wrong type
/// are ignored with a warning.
pub fn parse_config(content: &str, base_dir: &Path) -> Result<FormConfig, toml::de::Error> {
    let table: toml::Table = content.parse()?;
    let mut config = FormConfig::default();

    for key in table.keys() {
        if !KNOWN_CONFIG_KEYS.contains(&key.as_str()) {
            warn_unknown_key(key);
        }
    }

    // Relative paths resolve against the config file's directory
    if let Some(v) = table.get("preferences_file") {
        match v.as_str() {
            Some(p) => config.preferences_file = Some(base_dir.join(p)),
            None => warn!("'preferences_file' must be a string, ignoring"),
        }
    }

    if let Some(v) = table.get("base_url") {
        match v.as_str() {
            Some(base) => config.base_url = Some(base.trim_end_matches('/').to_string()),
            None => warn!("'base_url' must be a string, ignoring"),
        }
    }

    Ok(config)
}

/// Load config from `path`. A missing, unreadable, or unparsable file yields
/// defaults with a warning.
pub fn load_config(path: &Path) -> FormConfig {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "No config file, using defaults");
            return FormConfig::default();
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not read config file, using defaults");
            return FormConfig::default();
        }
    };

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    match parse_config(&content, base_dir) {
        Ok(config) => {
            debug!(path = %path.display(), ?config, "Loaded config");
            config
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to parse config file, using defaults");
            FormConfig::default()
        }
    }
}
