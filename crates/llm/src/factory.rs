//! LLM provider factory.
//!
//! Builds one long-lived client per provider from application configuration.
//! The resulting [`Backends`] set is created once at startup and shared by
//! every request.

use crate::client::LlmClient;
use crate::providers::{OllamaClient, OpenAiClient};
use crate::types::Provider;
use assistant_core::config::{AppConfig, BackendSettings};
use assistant_core::AppResult;
use std::sync::Arc;
use std::time::Duration;

/// Create an LLM client for a provider.
///
/// # Arguments
/// * `provider` - Which backend to build
/// * `settings` - Endpoint and optional timeout
/// * `api_key` - API key (ignored by Ollama)
///
/// # Errors
/// Returns a configuration error if the HTTP client cannot be built.
pub fn create_client(
    provider: Provider,
    settings: &BackendSettings,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn LlmClient>> {
    let timeout = settings.timeout_secs.map(Duration::from_secs);

    match provider {
        Provider::Ollama => {
            let client = match timeout {
                Some(timeout) => OllamaClient::with_timeout(&settings.endpoint, timeout)?,
                None => OllamaClient::with_base_url(&settings.endpoint),
            };
            Ok(Arc::new(client))
        }
        Provider::OpenAI => {
            let api_key = api_key.map(str::to_string);
            let client = match timeout {
                Some(timeout) => OpenAiClient::with_timeout(&settings.endpoint, api_key, timeout)?,
                None => OpenAiClient::new(&settings.endpoint, api_key),
            };
            Ok(Arc::new(client))
        }
    }
}

/// One shared client per supported provider.
#[derive(Clone)]
pub struct Backends {
    ollama: Arc<dyn LlmClient>,
    openai: Arc<dyn LlmClient>,
}

impl Backends {
    /// Assemble a backend set from existing clients.
    pub fn new(ollama: Arc<dyn LlmClient>, openai: Arc<dyn LlmClient>) -> Self {
        Self { ollama, openai }
    }

    /// Build every backend from configuration.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let ollama = create_client(Provider::Ollama, &config.ollama, None)?;
        let openai = create_client(
            Provider::OpenAI,
            &config.openai,
            config.openai_api_key.as_deref(),
        )?;

        tracing::debug!(
            "Configured backends - ollama: {}, openai: {}",
            config.ollama.endpoint,
            config.openai.endpoint
        );

        Ok(Self::new(ollama, openai))
    }

    /// Client serving `provider`.
    pub fn client(&self, provider: Provider) -> &Arc<dyn LlmClient> {
        match provider {
            Provider::Ollama => &self.ollama,
            Provider::OpenAI => &self.openai,
        }
    }
}
