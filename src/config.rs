//! Configuration loaded from `<config dir>/hina/config.toml`.
//!
//! A default file is written on first run. `GOOGLE_MAPS_API_KEY` in the
//! environment overrides the configured key.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const API_KEY_ENV: &str = "GOOGLE_MAPS_API_KEY";

/// Google Maps access and resolver tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapsConfig {
    /// Places/Geocoding API key. Without it every lookup is skipped.
    pub api_key: Option<String>,
    /// Response language for the APIs.
    pub language: String,
    /// Region bias for text search and geocoding.
    pub region: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Hosts treated as link shorteners (subdomains included).
    pub short_url_hosts: Vec<String>,
    /// Cap on coordinate pairs taken from a scraped My Maps page.
    pub max_scraped_places: usize,
}

impl Default for MapsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            language: "zh-TW".into(),
            region: "tw".into(),
            timeout_secs: 10,
            short_url_hosts: vec!["goo.gl".into(), "maps.app.goo.gl".into()],
            max_scraped_places: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiaryConfig {
    /// Where the diary JSON lives. Defaults to the user data dir.
    pub data_path: Option<PathBuf>,
    pub maps: MapsConfig,
    pub server: ServerConfig,
}

impl DiaryConfig {
    /// Resolved data file path.
    pub fn data_file(&self) -> PathBuf {
        self.data_path.clone().unwrap_or_else(default_data_path)
    }

    /// Let the environment override the configured API key.
    pub fn apply_env_key(&mut self, env_key: Option<String>) {
        if let Some(key) = env_key.filter(|k| !k.trim().is_empty()) {
            self.maps.api_key = Some(key);
        }
    }
}

fn hina_dir(base: Option<PathBuf>) -> PathBuf {
    base.unwrap_or_else(|| PathBuf::from(".")).join("hina")
}

pub fn config_path() -> PathBuf {
    hina_dir(dirs::config_dir()).join("config.toml")
}

pub fn default_data_path() -> PathBuf {
    hina_dir(dirs::data_dir()).join("diary.json")
}

/// Load configuration from the default location, creating it if missing.
pub fn load_or_init() -> Result<DiaryConfig> {
    load_or_init_from(&config_path())
}

/// Load configuration from `path`, writing defaults there if it does not exist.
pub fn load_or_init_from(path: &Path) -> Result<DiaryConfig> {
    let mut cfg = if path.exists() {
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&data).with_context(|| format!("parsing {}", path.display()))?
    } else {
        let default_cfg = DiaryConfig::default();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(&default_cfg)?)?;
        tracing::info!("created default config at {}", path.display());
        default_cfg
    };

    cfg.apply_env_key(std::env::var(API_KEY_ENV).ok());
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_values() {
        let cfg = DiaryConfig::default();
        assert_eq!(cfg.maps.language, "zh-TW");
        assert_eq!(cfg.maps.region, "tw");
        assert_eq!(cfg.maps.timeout_secs, 10);
        assert_eq!(cfg.maps.max_scraped_places, 10);
        assert_eq!(cfg.maps.short_url_hosts, vec!["goo.gl", "maps.app.goo.gl"]);
        assert!(cfg.maps.api_key.is_none());
        assert_eq!(cfg.server.port, 8000);
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let mut cfg = DiaryConfig::default();
        cfg.maps.api_key = Some("abc".into());
        cfg.data_path = Some(PathBuf::from("/tmp/diary.json"));
        let text = toml::to_string_pretty(&cfg).unwrap();
        let back: DiaryConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let cfg: DiaryConfig = toml::from_str("[maps]\napi_key = \"k\"\ntimeout_secs = 3\n").unwrap();
        assert_eq!(cfg.maps.api_key.as_deref(), Some("k"));
        assert_eq!(cfg.maps.timeout_secs, 3);
        assert_eq!(cfg.maps.language, "zh-TW");
        assert_eq!(cfg.server, ServerConfig::default());
    }

    #[test]
    fn test_env_key_override() {
        let mut cfg = DiaryConfig::default();
        cfg.maps.api_key = Some("from-file".into());
        cfg.apply_env_key(Some("  ".into()));
        assert_eq!(cfg.maps.api_key.as_deref(), Some("from-file"));
        cfg.apply_env_key(Some("from-env".into()));
        assert_eq!(cfg.maps.api_key.as_deref(), Some("from-env"));
        cfg.apply_env_key(None);
        assert_eq!(cfg.maps.api_key.as_deref(), Some("from-env"));
    }

    #[test]
    fn test_load_or_init_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = load_or_init_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.server, ServerConfig::default());

        fs::write(&path, "[server]\nport = 9100\n").unwrap();
        let cfg = load_or_init_from(&path).unwrap();
        assert_eq!(cfg.server.port, 9100);
    }
}
