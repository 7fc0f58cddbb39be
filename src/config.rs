use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::constants::{
    DEFAULT_BIND_ADDR, DEFAULT_CONFIG_FILE, DEFAULT_REGISTRY_URL, DEFAULT_TIMEOUT_SECONDS,
};
use crate::error::{EnricherError, Result};

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub registry: RegistryConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RegistryConfig {
    /// `lei-records` endpoint; the LEI filter is appended as a query parameter
    pub base_url: String,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_REGISTRY_URL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            user_agent: concat!("lei-enricher/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub metrics_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            metrics_enabled: true,
        }
    }
}

impl Config {
    /// Load configuration from `path`, else `enricher.toml` when present, else
    /// defaults; then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv::dotenv().ok();

        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            EnricherError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        debug!(path = %path.display(), "loaded config file");
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Overlay values from the environment, read through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("LEI_REGISTRY_URL") {
            self.registry.base_url = url;
        }
        if let Some(secs) = lookup("LEI_REGISTRY_TIMEOUT_SECS") {
            self.registry.timeout_seconds = secs.parse().map_err(|_| {
                EnricherError::Config(format!("LEI_REGISTRY_TIMEOUT_SECS must be a whole number, got '{}'", secs))
            })?;
        }
        if let Some(addr) = lookup("ENRICHER_BIND_ADDR") {
            self.server.bind_addr = addr;
        }
        if let Some(flag) = lookup("ENRICHER_METRICS_ENABLED") {
            self.server.metrics_enabled = flag.parse().map_err(|_| {
                EnricherError::Config(format!("ENRICHER_METRICS_ENABLED must be true or false, got '{}'", flag))
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn defaults_point_at_gleif() {
        let config = Config::default();
        assert_eq!(config.registry.base_url, "https://api.gleif.org/api/v1/lei-records");
        assert_eq!(config.registry.timeout_seconds, 10);
        assert_eq!(config.server.bind_addr, "127.0.0.1:8000");
        assert!(config.server.metrics_enabled);
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let config = Config::from_toml(
            r#"
            [registry]
            timeout_seconds = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.registry.timeout_seconds, 3);
        assert_eq!(config.registry.base_url, DEFAULT_REGISTRY_URL);
        assert_eq!(config.server, ServerConfig::default());
    }

    #[test]
    fn reads_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[registry]\nbase_url = \"http://127.0.0.1:9000/lei-records\"\n\n[server]\nbind_addr = \"0.0.0.0:8080\""
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.registry.base_url, "http://127.0.0.1:9000/lei-records");
        assert_eq!(config.server.bind_addr, "0.0.0.0:8080");
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let result = Config::from_file(Path::new("/nonexistent/enricher.toml"));
        assert!(matches!(result, Err(EnricherError::Config(_))));
    }

    #[test]
    fn env_overrides_win() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("LEI_REGISTRY_URL", "http://localhost:1234/lei"),
            ("LEI_REGISTRY_TIMEOUT_SECS", "2"),
            ("ENRICHER_METRICS_ENABLED", "false"),
        ]);
        let mut config = Config::default();
        config
            .apply_env_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.registry.base_url, "http://localhost:1234/lei");
        assert_eq!(config.registry.timeout_seconds, 2);
        assert!(!config.server.metrics_enabled);
        assert_eq!(config.server.bind_addr, DEFAULT_BIND_ADDR);
    }

    #[test]
    fn invalid_override_is_rejected() {
        let mut config = Config::default();
        let result = config.apply_env_overrides(|key| {
            (key == "LEI_REGISTRY_TIMEOUT_SECS").then(|| "soon".to_string())
        });
        assert!(matches!(result, Err(EnricherError::Config(_))));
    }
}
