//! Backend identifier types.
//!
//! A backend identifier has the form `<provider>/<model>`, e.g.
//! `ollama/llama3` or `openai/gpt-4o-mini`. The provider tag selects the
//! client; everything after the first `/` is passed to it as the model name.

use assistant_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported generation providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Local inference through Ollama
    Ollama,
    /// OpenAI (or any OpenAI-compatible endpoint)
    OpenAI,
}

impl Provider {
    /// All supported providers.
    pub const ALL: [Provider; 2] = [Provider::Ollama, Provider::OpenAI];

    /// Parse a provider tag. Tags are case-sensitive.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "ollama" => Some(Self::Ollama),
            "openai" => Some(Self::OpenAI),
            _ => None,
        }
    }

    /// Get the canonical provider tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::OpenAI => "openai",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed `<provider>/<model>` backend identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BackendId {
    provider: Provider,
    model: String,
}

impl BackendId {
    /// Create an identifier from its parts.
    pub fn new(provider: Provider, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Parse an identifier, rejecting unknown providers and malformed input.
    pub fn parse(identifier: &str) -> AppResult<Self> {
        let (tag, model) = identifier.split_once('/').ok_or_else(|| {
            AppError::Config(format!(
                "Invalid backend identifier '{}': expected <provider>/<model>",
                identifier
            ))
        })?;

        let provider = Provider::parse(tag).ok_or_else(|| {
            AppError::Config(format!(
                "Unknown provider '{}' in backend identifier '{}'. Supported: {}",
                tag,
                identifier,
                Provider::ALL.map(|p| p.as_str()).join(", ")
            ))
        })?;

        if model.trim().is_empty() {
            return Err(AppError::Config(format!(
                "Backend identifier '{}' has an empty model name",
                identifier
            )));
        }

        Ok(Self::new(provider, model))
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl FromStr for BackendId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider, self.model)
    }
}
