// Boot-time expansion list - read once at startup and loaded through register()

use crate::expander::TextExpander;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "texpander";
const CONFIG_FILE_NAME: &str = "expansions.json";

/// Pair installed when nothing else loads
pub const DEFAULT_SHORT_CODE: &str = "exp";
pub const DEFAULT_EXPANDED_TEXT: &str = "expanded";

/// Error types for loading the expansion list
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read expansion list: {0}")]
    Read(String),
    #[error("Failed to parse expansion list: {0}")]
    Parse(String),
}

/// One entry of `expansions.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpansionEntry {
    pub short_code: String,
    pub expanded_text: String,
}

/// Returns {config_dir}/texpander/expansions.json
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::Read("config directory not found".to_string()))?;
    Ok(config_dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Read the expansion list at `path`. A missing file is an empty list.
pub fn load_entries(path: &Path) -> Result<Vec<ExpansionEntry>, ConfigError> {
    crate::debug!("Loading expansions from {:?}", path);

    if !path.exists() {
        crate::debug!("No expansion list found, starting empty");
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path).map_err(|e| ConfigError::Read(e.to_string()))?;
    let entries: Vec<ExpansionEntry> =
        serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

    crate::info!("Read {} expansions from {:?}", entries.len(), path);
    Ok(entries)
}

/// Register every usable entry. Returns how many were loaded.
///
/// Bad entries are logged and skipped. When none load, the default pair
/// is installed instead and counted.
pub fn seed(expander: &TextExpander, entries: &[ExpansionEntry]) -> usize {
    let mut loaded = 0;
    for entry in entries {
        if entry.short_code.is_empty() || entry.expanded_text.is_empty() {
            crate::warn!("Skipping expansion entry with empty field: {:?}", entry);
            continue;
        }
        if expander
            .register(&entry.short_code, &entry.expanded_text)
            .is_ok()
        {
            loaded += 1;
        }
    }

    if loaded == 0 {
        crate::info!(
            "No expansions loaded, installing default '{}'",
            DEFAULT_SHORT_CODE
        );
        match expander.register(DEFAULT_SHORT_CODE, DEFAULT_EXPANDED_TEXT) {
            Ok(_) => loaded = 1,
            Err(e) => crate::error!("Failed to install default expansion: {}", e),
        }
    }

    let stats = expander.stats();
    crate::info!(
        "Expansion store ready: {} entries, {}/{} nodes, {}/{} text bytes",
        stats.entries,
        stats.nodes_used,
        stats.node_capacity,
        stats.text_bytes_used,
        stats.text_capacity
    );
    loaded
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
