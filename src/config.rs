use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;

/// Attribute defaults applied when a page is created: per-route defaults win
/// over the global ones, and the caller's values win over both.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDefaults {
    #[serde(default)]
    pub defaults: Map<String, Value>,
    #[serde(default)]
    pub page_defaults: HashMap<String, Map<String, Value>>,
}

impl PageDefaults {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read page defaults at {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse page defaults at {}", path.display()))
    }
}

#[derive(Clone, Debug)]
pub struct PageTreeConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub bind_address: String,
    pub snapshot_retention: i64,
    pub page_defaults: PageDefaults,
}

impl PageTreeConfig {
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .context("Failed to determine DATABASE_URL from environment variables")?;

        let max_connections = std::env::var("MAX_CONNECTIONS")
            .ok()
            .and_then(|val| val.parse::<u32>().ok())
            .unwrap_or(15);

        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let snapshot_retention = match std::env::var("SNAPSHOT_RETENTION") {
            Ok(val) => val
                .parse::<i64>()
                .ok()
                .filter(|keep| *keep >= 0)
                .with_context(|| format!("SNAPSHOT_RETENTION must be a non-negative integer, got {val}"))?,
            Err(_) => 5,
        };

        let page_defaults = match std::env::var("PAGE_DEFAULTS_PATH") {
            Ok(path) => PageDefaults::from_file(Path::new(&path))?,
            Err(_) => PageDefaults::default(),
        };

        Ok(Self {
            database_url,
            max_connections,
            bind_address,
            snapshot_retention,
            page_defaults,
        })
    }
}
