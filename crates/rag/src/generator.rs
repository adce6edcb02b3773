//! Answer generation against the configured backends.

use crate::types::{Generation, GenerationResult};
use assistant_core::AppResult;
use assistant_llm::{BackendId, Backends, LlmRequest};
use std::time::Instant;

/// Sends prompts to the backend named by a `<provider>/<model>` identifier.
#[derive(Clone)]
pub struct Generator {
    backends: Backends,
}

impl Generator {
    pub fn new(backends: Backends) -> Self {
        Self { backends }
    }

    /// Parse `backend` and generate.
    ///
    /// # Errors
    /// Only an invalid backend identifier is an error; it is raised before any
    /// backend is contacted. Backend failures become [`Generation::Failed`].
    pub async fn generate(&self, prompt: &str, backend: &str) -> AppResult<Generation> {
        let backend = BackendId::parse(backend)?;
        Ok(self.generate_with(prompt, &backend).await)
    }

    /// Generate with an already validated backend.
    pub async fn generate_with(&self, prompt: &str, backend: &BackendId) -> Generation {
        let client = self.backends.client(backend.provider());
        let request = LlmRequest::new(prompt, backend.model());

        tracing::debug!("Generating with {} ({} prompt bytes)", backend, prompt.len());
        let started = Instant::now();
        let outcome = client.complete(&request).await;
        let elapsed_secs = started.elapsed().as_secs_f64();

        match outcome {
            Ok(response) => {
                tracing::debug!(
                    "Generation with {} finished in {:.2}s ({} tokens)",
                    backend,
                    elapsed_secs,
                    response.usage.total_tokens
                );
                Generation::Completed(GenerationResult {
                    answer: response.content,
                    usage: response.usage,
                    elapsed_secs,
                })
            }
            Err(e) => {
                tracing::error!("Generation with {} failed: {}", backend, e);
                Generation::Failed {
                    cause: e.to_string(),
                    elapsed_secs,
                }
            }
        }
    }
}
