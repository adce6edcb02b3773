//! Generation backend implementations.

pub mod mock;
pub mod ollama;
pub mod openai;

pub use mock::{MockLlmClient, MockReply};
pub use ollama::OllamaClient;
pub use openai::OpenAiClient;
