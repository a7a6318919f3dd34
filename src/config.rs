// src/config.rs
use std::{fs, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

pub const DEFAULT_FEED_BASE: &str = "https://www.cinema-carbonne.fr/data";
pub const DEFAULT_REFRESH_MINUTES: u64 = 30;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub feed_base_url: String,
    pub cache_dir: Option<String>,
    pub refresh_minutes: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            feed_base_url: DEFAULT_FEED_BASE.to_string(),
            cache_dir: None,
            refresh_minutes: DEFAULT_REFRESH_MINUTES,
        }
    }
}

impl AppConfig {
    /// Absolute URL of one of the JSON feeds (`programme.json`, `PDFs.json`, …).
    pub fn feed_url(&self, file: &str) -> String {
        format!("{}/{}", self.feed_base_url.trim_end_matches('/'), file)
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(alias = "base_url")]
    feed_base_url: Option<String>,
    cache_dir: Option<String>,
    refresh_minutes: Option<u64>,
}

pub fn load_config() -> AppConfig {
    let cfg_path = PathBuf::from("config.json");
    let mut cfg = AppConfig::default();

    match fs::read_to_string(&cfg_path) {
        Ok(raw) => match serde_json::from_str::<RawConfig>(&raw) {
            Ok(parsed) => {
                if let Some(base) = parsed.feed_base_url {
                    cfg.feed_base_url = base;
                }
                if parsed.cache_dir.is_some() {
                    cfg.cache_dir = parsed.cache_dir;
                }
                if let Some(mins) = parsed.refresh_minutes {
                    // A zero interval would hammer the feed endpoint.
                    cfg.refresh_minutes = mins.max(1);
                }
                info!("Loaded config from {}", cfg_path.display());
            }
            Err(err) => {
                warn!("Failed to parse config.json ({}). Using defaults.", err);
            }
        },
        Err(_) => {
            info!("No config.json found; using defaults");
        }
    }

    cfg
}

pub fn resolve_relative_path(name: &str) -> String {
    std::env::current_dir()
        .map(|d| d.join(name).to_string_lossy().into_owned())
        .unwrap_or_else(|_| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::AppConfig;

    #[test]
    fn feed_url_joins_without_double_slash() {
        let cfg = AppConfig {
            feed_base_url: "https://example.org/data/".into(),
            ..AppConfig::default()
        };
        assert_eq!(
            cfg.feed_url("programme.json"),
            "https://example.org/data/programme.json"
        );
    }
}
