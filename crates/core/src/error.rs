//! Error types for the course assistant.
//!
//! This module defines a unified error enum covering every error category in
//! the workspace: configuration, I/O, LLM backends, retrieval, evaluation,
//! prompt rendering and persistence.

use thiserror::Error;

/// Unified error type for the course assistant.
///
/// Only configuration errors are fatal for the answer pipeline. Backend,
/// retrieval and evaluation failures are absorbed into degraded results by the
/// pipeline itself, so these variants mostly travel between crate boundaries
/// before being logged and recorded.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors (including invalid backend identifiers)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// LLM backend errors (transport, auth, rate limiting, bad payloads)
    #[error("LLM error: {0}")]
    Llm(String),

    /// Document store and retrieval errors
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// Relevance evaluation errors
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// Prompt rendering errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Conversation/feedback persistence errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = AppError::Config("Unknown provider: foo".to_string());
        assert_eq!(err.to_string(), "Configuration error: Unknown provider: foo");
    }

    #[test]
    fn test_json_error_conversion() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("oops");
        let err: AppError = parse.unwrap_err().into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
