use crate::client::{LlmBackend, OllamaBackend, OpenAiCompatibleBackend};
use anyhow::Result;
use std::path::PathBuf;
use xraygen_config::{AiProvider, AppConfig, ConfigError};

/// Configuration for AI test generation.
#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub provider: AiProvider,
    /// Server root, e.g. `http://localhost:11434` or `https://api.openai.com`
    pub base_url: String,
    pub model: String,
    /// Required for [`AiProvider::Hosted`].
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    pub prompt_template: PathBuf,
}

impl LlmConfig {
    pub fn from_app(config: &AppConfig, api_key: Option<String>) -> Self {
        Self {
            provider: config.ai.provider,
            base_url: config.ai.base_url.clone(),
            model: config.ai.model.clone(),
            api_key,
            timeout_secs: config.ai.timeout_secs,
            prompt_template: config.paths.prompt_template.clone(),
        }
    }

    /// Build the backend for the configured provider.
    pub fn backend(&self) -> Result<Box<dyn LlmBackend>> {
        Ok(match self.provider {
            AiProvider::Local => Box::new(OllamaBackend::new(
                &self.base_url,
                &self.model,
                self.timeout_secs,
            )),
            AiProvider::Hosted => {
                let key = self.api_key.clone().ok_or(ConfigError::MissingApiKey)?;
                Box::new(OpenAiCompatibleBackend::new(
                    &self.base_url,
                    key,
                    &self.model,
                    self.timeout_secs,
                ))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hosted_without_key_is_rejected() {
        let mut config = LlmConfig::from_app(&AppConfig::default(), None);
        config.provider = AiProvider::Hosted;
        let err = config.backend().err().unwrap();
        assert_eq!(err.downcast_ref::<ConfigError>(), Some(&ConfigError::MissingApiKey));
    }

    #[test]
    fn local_needs_no_key() {
        let config = LlmConfig::from_app(&AppConfig::default(), None);
        assert!(config.backend().is_ok());
    }

    #[test]
    fn endpoints_ignore_trailing_slash() {
        let local = OllamaBackend::new("http://localhost:11434/", "llama3.1:8b", 5);
        assert_eq!(local.endpoint, "http://localhost:11434/api/generate");
        let hosted = OpenAiCompatibleBackend::new("https://api.openai.com", "k", "gpt-4o-mini", 5);
        assert_eq!(hosted.endpoint, "https://api.openai.com/v1/chat/completions");
    }
}
