//! LLM integration crate for the course assistant.
//!
//! This crate provides a provider-agnostic abstraction over the generation
//! backends. Backends are selected by a `<provider>/<model>` identifier.
//!
//! # Providers
//! - **Ollama**: Local LLM runtime
//! - **OpenAI**: Cloud chat completions (or any compatible endpoint)
//! - **Mock**: Scripted replies for tests
//!
//! # Example
//! ```no_run
//! use assistant_llm::{BackendId, LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend: BackendId = "ollama/llama3".parse()?;
//! let client = OllamaClient::new();
//! let request = LlmRequest::new("Hello, world!", backend.model());
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::{create_client, Backends};
pub use providers::{MockLlmClient, MockReply, OllamaClient, OpenAiClient};
pub use types::{BackendId, Provider};
