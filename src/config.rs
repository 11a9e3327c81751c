use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::relationship::layout::RingGeometry;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OrbitConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub layout: LayoutConfig,
    pub ai: AiConfig,
    pub opportunities: OpportunityConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub transport: String,
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
    /// Identity every row is scoped to.
    pub owner: String,
}

/// Ring geometry for the radial layout, outer radii ordered vip..distant.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LayoutConfig {
    pub ring_radii: [f64; 5],
    pub ring_gap: f64,
    pub center_radius: f64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AiConfig {
    pub base_url: String,
    pub model: String,
    /// Never written back to disk; usually supplied via `ORBIT_AI_API_KEY`.
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OpportunityConfig {
    pub birthday_lookahead_days: i64,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            layout: LayoutConfig::default(),
            ai: AiConfig::default(),
            opportunities: OpportunityConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: "stdio".into(),
            host: "127.0.0.1".into(),
            port: 7420,
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_orbit_dir()
            .join("orbit.db")
            .to_string_lossy()
            .into_owned();
        Self {
            db_path,
            owner: "me".into(),
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let geometry = RingGeometry::default();
        Self {
            ring_radii: geometry.outer_radii,
            ring_gap: geometry.ring_gap,
            center_radius: geometry.center_radius,
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".into(),
            model: "gpt-4o-mini".into(),
            api_key: None,
        }
    }
}

impl Default for OpportunityConfig {
    fn default() -> Self {
        Self {
            birthday_lookahead_days: 7,
        }
    }
}

impl LayoutConfig {
    pub fn geometry(&self) -> RingGeometry {
        RingGeometry {
            outer_radii: self.ring_radii,
            ring_gap: self.ring_gap,
            center_radius: self.center_radius,
        }
    }
}

/// Returns `~/.orbit/`
pub fn default_orbit_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".orbit")
}

/// Returns the default config file path: `~/.orbit/config.toml`
pub fn default_config_path() -> PathBuf {
    default_orbit_dir().join("config.toml")
}

impl OrbitConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            OrbitConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    /// (ORBIT_DB, ORBIT_OWNER, ORBIT_LOG_LEVEL, ORBIT_AI_API_KEY).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("ORBIT_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("ORBIT_OWNER") {
            self.storage.owner = val;
        }
        if let Ok(val) = std::env::var("ORBIT_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("ORBIT_AI_API_KEY") {
            if !val.trim().is_empty() {
                self.ai.api_key = Some(val);
            }
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = OrbitConfig::default();
        assert_eq!(config.server.transport, "stdio");
        assert_eq!(config.server.log_level, "info");
        assert_eq!(config.storage.owner, "me");
        assert_eq!(config.layout.ring_radii, [80.0, 160.0, 240.0, 320.0, 400.0]);
        assert_eq!(config.opportunities.birthday_lookahead_days, 7);
        assert!(config.ai.api_key.is_none());
        assert!(config.storage.db_path.ends_with("orbit.db"));
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[server]
log_level = "debug"

[storage]
db_path = "/tmp/test.db"
owner = "alex"

[layout]
ring_gap = 12.0
"#;
        let config: OrbitConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.log_level, "debug");
        assert_eq!(config.storage.db_path, "/tmp/test.db");
        assert_eq!(config.storage.owner, "alex");
        assert_eq!(config.layout.ring_gap, 12.0);
        // defaults still apply for unset fields
        assert_eq!(config.layout.ring_radii[4], 400.0);
        assert_eq!(config.server.port, 7420);
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = OrbitConfig::default();
        std::env::set_var("ORBIT_DB", "/tmp/override.db");
        std::env::set_var("ORBIT_OWNER", "env-owner");
        std::env::set_var("ORBIT_LOG_LEVEL", "trace");
        std::env::set_var("ORBIT_AI_API_KEY", "sk-test");

        config.apply_env_overrides();

        assert_eq!(config.storage.db_path, "/tmp/override.db");
        assert_eq!(config.storage.owner, "env-owner");
        assert_eq!(config.server.log_level, "trace");
        assert_eq!(config.ai.api_key.as_deref(), Some("sk-test"));

        // Clean up
        std::env::remove_var("ORBIT_DB");
        std::env::remove_var("ORBIT_OWNER");
        std::env::remove_var("ORBIT_LOG_LEVEL");
        std::env::remove_var("ORBIT_AI_API_KEY");
    }

    #[test]
    fn layout_config_builds_geometry() {
        let mut config = LayoutConfig::default();
        config.ring_gap = 10.0;
        let geometry = config.geometry();
        assert_eq!(geometry.ring_gap, 10.0);
        assert_eq!(geometry.outer_radii, config.ring_radii);
    }
}
