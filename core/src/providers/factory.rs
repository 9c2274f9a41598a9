use crate::config::Config;
use crate::providers::{OllamaProvider, OpenAIProvider};
use crate::traits::Provider;
use anyhow::{Result, anyhow};
use std::sync::Arc;

pub fn create_provider(config: &Config) -> Result<Arc<dyn Provider>> {
    let provider_name = config.provider.as_deref().unwrap_or("ollama");
    let timeout = config.model_timeout();

    match provider_name.to_lowercase().as_str() {
        "ollama" => {
            let mut provider =
                OllamaProvider::with_timeout(timeout).with_model(config.model.clone());
            if let Some(base_url) = &config.base_url {
                provider = provider.with_base_url(base_url.clone());
            }
            Ok(Arc::new(provider))
        }
        "openai" => {
            let api_key = resolve_api_key_with_fallback(
                &["OPENAI_API_KEY", "RELAY_API_KEY"],
                &config.api_key,
            )?;
            let mut provider =
                OpenAIProvider::with_timeout(api_key, timeout).with_model(config.model.clone());
            if let Some(base_url) = &config.base_url {
                provider = provider.with_base_url(base_url.clone());
            }
            Ok(Arc::new(provider))
        }
        _ => Err(anyhow!(
            "Unknown provider: {}. Available: ollama, openai",
            provider_name
        )),
    }
}

fn resolve_api_key_with_fallback(env_vars: &[&str], config_key: &str) -> Result<String> {
    for var_name in env_vars {
        if let Ok(key) = std::env::var(var_name)
            && !key.is_empty()
        {
            return Ok(key);
        }
    }
    if !config_key.is_empty() {
        Ok(config_key.to_string())
    } else {
        Err(anyhow!(
            "No API key found. Set OPENAI_API_KEY or api_key in the config file"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ollama_is_the_default_provider() {
        let provider = create_provider(&Config::default()).unwrap();
        assert_eq!(provider.name(), "ollama");
    }

    #[test]
    fn openai_uses_configured_key() {
        let config = Config {
            provider: Some("OpenAI".to_string()),
            api_key: "sk-test".to_string(),
            ..Default::default()
        };
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let config = Config {
            provider: Some("carrier-pigeon".to_string()),
            ..Default::default()
        };
        let err = create_provider(&config).err().unwrap();
        assert!(err.to_string().contains("carrier-pigeon"));
    }
}
