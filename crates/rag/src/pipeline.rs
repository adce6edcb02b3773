//! End-to-end answer pipeline.
//!
//! One request runs retrieval, prompt assembly, generation, evaluation and
//! cost accounting strictly in that order. External failures degrade the
//! result and are listed in [`AnswerRecord::issues`]; only an invalid backend
//! identifier is returned as an error.

use crate::cost::calculate_cost;
use crate::evaluator::Evaluator;
use crate::generator::Generator;
use crate::retriever::Retriever;
use crate::store::DocumentStore;
use crate::types::{AnswerRecord, PipelineIssue, SearchMode, SearchRequest, Stage};
use assistant_core::AppResult;
use assistant_llm::{BackendId, Backends};
use assistant_prompt::PromptBuilder;
use std::sync::Arc;

/// Wires the answer stages together. Cheap to clone; all clients are shared.
#[derive(Clone)]
pub struct Pipeline {
    retriever: Retriever,
    prompts: Arc<PromptBuilder>,
    generator: Generator,
    evaluator: Evaluator,
}

impl Pipeline {
    pub fn new(
        retriever: Retriever,
        prompts: Arc<PromptBuilder>,
        generator: Generator,
        evaluator: Evaluator,
    ) -> Self {
        Self {
            retriever,
            prompts,
            generator,
            evaluator,
        }
    }

    /// Build every stage over one store and one backend set.
    pub fn from_parts(store: Arc<dyn DocumentStore>, backends: Backends) -> AppResult<Self> {
        let prompts = Arc::new(PromptBuilder::new()?);
        let generator = Generator::new(backends);
        let evaluator = Evaluator::new(generator.clone(), prompts.clone());

        Ok(Self::new(
            Retriever::new(store),
            prompts,
            generator,
            evaluator,
        ))
    }

    /// Answer `query` for `course` with the backend named by `backend`.
    ///
    /// # Errors
    /// Returns a configuration error for an unknown provider, a missing
    /// `/` separator or an empty model name. Nothing is contacted in that case.
    #[tracing::instrument(name = "pipeline.answer", skip(self, query))]
    pub async fn answer(
        &self,
        query: &str,
        course: &str,
        backend: &str,
        mode: SearchMode,
    ) -> AppResult<AnswerRecord> {
        let backend_id = BackendId::parse(backend)?;
        let mut issues = Vec::new();

        let retrieval = self
            .retriever
            .search(&SearchRequest::new(query, course, mode))
            .await;
        if let Some(issue) = retrieval.issue {
            issues.push(PipelineIssue::new(Stage::Retrieval, issue));
        }

        let prompt = self.prompts.build(query, &retrieval.documents)?;

        let generation = self.generator.generate_with(&prompt, &backend_id).await;
        if let Some(cause) = generation.failure() {
            issues.push(PipelineIssue::new(Stage::Generation, cause));
        }

        // Evaluate even a failed generation; the sentinel scores low
        let evaluation = self.evaluator.evaluate(query, generation.answer()).await?;
        if let Some(issue) = &evaluation.issue {
            issues.push(PipelineIssue::new(Stage::Evaluation, issue.clone()));
        }

        let usage = generation.usage();
        let openai_cost = calculate_cost(backend, &usage);

        tracing::info!(
            "Answered with {} in {:.2}s: {} documents, relevance {}, cost {:.6}, {} issues",
            backend,
            generation.elapsed_secs(),
            retrieval.documents.len(),
            evaluation.relevance,
            openai_cost,
            issues.len()
        );

        Ok(AnswerRecord {
            answer: generation.answer().to_string(),
            model_used: backend.to_string(),
            response_time: generation.elapsed_secs(),
            relevance: evaluation.relevance,
            relevance_explanation: evaluation.explanation,
            usage,
            eval_usage: evaluation.usage,
            openai_cost,
            issues,
        })
    }
}
