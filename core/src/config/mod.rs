use crate::gateway::{DEFAULT_REFERENCE_TIMEZONE, ToolSpec, default_tools};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

const RELAY_DIR: &str = ".relay";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: Option<String>,
    pub api_key: String,
    pub base_url: Option<String>,
    pub model: String,
    pub temperature: Option<f64>,
    pub system_prompt: Option<String>,
    pub max_rounds: usize,
    pub model_timeout_secs: u64,
    pub tool_timeout_secs: u64,
    pub reference_timezone: String,
    pub log_dir: PathBuf,
    pub server: ServerConfig,
    pub tools: Vec<ToolSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            provider: Some("ollama".to_string()),
            api_key: String::new(),
            base_url: None,
            model: "gemma3:12b".to_string(),
            temperature: None,
            system_prompt: None,
            max_rounds: 3,
            model_timeout_secs: 300,
            tool_timeout_secs: 30,
            reference_timezone: DEFAULT_REFERENCE_TIMEZONE.to_string(),
            log_dir: get_relay_dir().join("logs"),
            server: ServerConfig::default(),
            tools: default_tools(),
        }
    }
}

pub fn get_relay_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(RELAY_DIR)
}

pub fn get_config_path() -> PathBuf {
    get_relay_dir().join("config.toml")
}

pub fn ensure_relay_dir() -> Result<PathBuf> {
    let relay_dir = get_relay_dir();

    if !relay_dir.exists() {
        std::fs::create_dir_all(&relay_dir).with_context(|| {
            format!(
                "Failed to create relay directory at {}",
                relay_dir.display()
            )
        })?;
    }

    Ok(relay_dir)
}

impl Config {
    pub fn load_or_init() -> Result<Self> {
        if config_exists() {
            load_config()
        } else {
            Ok(Config::default())
        }
    }

    pub fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.model_timeout_secs)
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_rounds == 0 {
            bail!("max_rounds must be at least 1");
        }
        if self.model_timeout_secs == 0 || self.tool_timeout_secs == 0 {
            bail!("model_timeout_secs and tool_timeout_secs must be greater than zero");
        }

        let mut seen = HashSet::new();
        for tool in &self.tools {
            if tool.name.trim().is_empty() {
                bail!("Tool with endpoint {} has an empty name", tool.endpoint);
            }
            if !seen.insert(tool.name.as_str()) {
                bail!("Tool '{}' is configured more than once", tool.name);
            }
        }

        Ok(())
    }
}

pub fn load_config() -> Result<Config> {
    let config_path = get_config_path();

    if !config_path.exists() {
        bail!("Config file not found. Run 'relay onboard' to set up your configuration.");
    }

    load_config_from(&config_path)
}

pub fn load_config_from(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config from {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("Invalid config in {}", path.display()))?;

    Ok(config)
}

pub fn save_config(config: &Config) -> Result<()> {
    ensure_relay_dir()?;
    save_config_to(config, &get_config_path())
}

pub fn save_config_to(config: &Config, path: &Path) -> Result<()> {
    let content =
        toml::to_string_pretty(config).with_context(|| "Failed to serialize config to TOML")?;

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    Ok(())
}

pub fn config_exists() -> bool {
    get_config_path().exists()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::ArgumentShape;
    use tempfile::TempDir;

    #[test]
    fn empty_file_yields_reference_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.provider.as_deref(), Some("ollama"));
        assert_eq!(config.max_rounds, 3);
        assert_eq!(config.tool_timeout(), Duration::from_secs(30));
        assert_eq!(config.reference_timezone, "America/New_York");
        assert_eq!(config.tools.len(), 4);
        assert_eq!(config.server.address(), "127.0.0.1:8000");
    }

    #[test]
    fn tools_table_replaces_defaults() {
        let config: Config = toml::from_str(
            r#"
            model = "llama3.2"

            [[tools]]
            name = "fetch"
            endpoint = "http://tools:9000/fetch"
            shape = "fetch"

            [[tools]]
            name = "notes"
            endpoint = "http://tools:9000/notes"
            "#,
        )
        .unwrap();

        assert_eq!(config.model, "llama3.2");
        assert_eq!(config.tools.len(), 2);
        assert_eq!(config.tools[0].shape, ArgumentShape::Fetch);
        assert_eq!(config.tools[1].shape, ArgumentShape::Input);
    }

    #[test]
    fn validate_rejects_zero_rounds() {
        let config = Config {
            max_rounds: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_duplicate_tools() {
        let mut config = Config::default();
        config.tools.push(config.tools[0].clone());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("memory"));
    }

    #[test]
    fn save_then_load_from_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        let config = Config {
            model: "qwen2.5".to_string(),
            max_rounds: 5,
            ..Default::default()
        };

        save_config_to(&config, &path).unwrap();
        let loaded = load_config_from(&path).unwrap();

        assert_eq!(loaded.model, "qwen2.5");
        assert_eq!(loaded.max_rounds, 5);
        assert_eq!(loaded.tools, config.tools);
    }
}
