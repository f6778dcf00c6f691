use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base: String,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:8000".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(Some(config)) => config,
            Ok(None) => Self::default(),
            Err(err) => {
                warn!("failed to load config, using defaults: {err:#}");
                Self::default()
            }
        }
    }

    fn load() -> Result<Option<Self>> {
        let Some(path) = Self::config_path() else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }
        let raw =
            fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        let config =
            serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
        Ok(Some(config))
    }

    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("minibridge").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::Config;

    #[test]
    fn defaults_point_at_a_local_api_with_a_ten_second_deadline() {
        let config = Config::default();
        assert_eq!(config.api_base, "http://localhost:8000");
        assert_eq!(config.timeout().as_secs(), 10);
    }

    #[test]
    fn partial_config_files_fall_back_per_field() {
        let config: Config = serde_json::from_str(r#"{"api_base": "https://api.example.dev"}"#)
            .expect("partial config should parse");
        assert_eq!(config.api_base, "https://api.example.dev");
        assert_eq!(config.timeout_secs, 10);
    }
}
