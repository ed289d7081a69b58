use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use voidfilter_core::FilterConfig;

/// Application configuration for persisting user preferences.
#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub last_input: String,
    #[serde(default)]
    pub last_output: String,
    #[serde(default)]
    pub filter: FilterConfig,
}

impl AppConfig {
    /// Loads configuration from disk, or returns default if not found.
    pub fn load() -> Self {
        if let Some(path) = config_path() {
            if let Ok(content) = fs::read_to_string(&path) {
                match serde_json::from_str(&content) {
                    Ok(cfg) => return cfg,
                    Err(e) => log::warn!("Ignoring malformed config {}: {}", path.display(), e),
                }
            }
        }
        Self::default()
    }

    /// Saves configuration to disk in JSON format.
    pub fn save(&self) {
        if let Some(path) = config_path() {
            if let Some(parent) = path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            if let Ok(json) = serde_json::to_string_pretty(self) {
                if let Err(e) = fs::write(&path, json) {
                    log::warn!("Failed to save config: {}", e);
                }
            }
        }
    }

    /// Device name to use: explicit argument, then last used, then "default".
    pub fn resolve_device(arg: Option<String>, last: &str) -> String {
        arg.or_else(|| (!last.is_empty()).then(|| last.to_string()))
            .unwrap_or_else(|| "default".to_string())
    }
}

fn config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "voidfilter", "voidfilter")
        .map(|dirs| dirs.config_dir().join("config.json"))
}
