use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const CONFIG_ENV: &str = "APPINV_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Explicit adb binary; resolved from bundled platform-tools or PATH when unset.
    pub adb_path: Option<PathBuf>,
    pub command_timeout_secs: u64,
    pub search_debounce_ms: u64,
    /// Pull each base APK to read signer certificates and launcher icons.
    pub fetch_certificates: bool,
    pub fetch_concurrency: usize,
    pub user_apps_only: bool,
    pub log_level: String,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            adb_path: None,
            command_timeout_secs: 30,
            search_debounce_ms: 300,
            fetch_certificates: false,
            fetch_concurrency: 4,
            user_apps_only: false,
            log_level: "warn".to_string(),
        }
    }
}
impl Config {
    /// Loads `$APPINV_CONFIG`, else `<config_dir>/appinv/config.toml`, else defaults.
    pub fn load() -> anyhow::Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }
    pub fn load_from(path: &std::path::Path) -> anyhow::Result<Self> {
        use anyhow::Context;
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("Invalid config {}", path.display()))
    }
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(raw)?)
    }
    pub fn config_path() -> Option<PathBuf> {
        if let Ok(p) = std::env::var(CONFIG_ENV) {
            if !p.trim().is_empty() {
                return Some(PathBuf::from(p));
            }
        }
        dirs::config_dir().map(|d| d.join("appinv").join("config.toml"))
    }
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs.max(1))
    }
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}
