//! LLM self-evaluation of answer relevance.

use crate::generator::Generator;
use crate::types::{EvaluationResult, Generation, Relevance};
use assistant_core::AppResult;
use assistant_llm::{BackendId, LlmUsage, Provider};
use assistant_prompt::PromptBuilder;
use serde::Deserialize;
use std::sync::Arc;

/// Model every evaluation runs on, regardless of the answering backend.
pub const EVALUATION_MODEL: &str = "gpt-4o-mini";

/// Explanation recorded when the evaluator output cannot be used.
pub const PARSE_FAILURE_EXPLANATION: &str = "Failed to parse evaluation";

#[derive(Deserialize)]
struct Verdict {
    #[serde(rename = "Relevance")]
    relevance: String,
    #[serde(rename = "Explanation")]
    explanation: String,
}

/// Asks a fixed judge model whether an answer addresses its question.
#[derive(Clone)]
pub struct Evaluator {
    generator: Generator,
    prompts: Arc<PromptBuilder>,
    backend: BackendId,
}

impl Evaluator {
    pub fn new(generator: Generator, prompts: Arc<PromptBuilder>) -> Self {
        Self {
            generator,
            prompts,
            backend: BackendId::new(Provider::OpenAI, EVALUATION_MODEL),
        }
    }

    /// Identifier of the judge backend.
    pub fn backend(&self) -> &BackendId {
        &self.backend
    }

    /// Classify `answer` against `question`.
    ///
    /// Judge failures never escape: they produce an `UNKNOWN` result carrying
    /// an issue. Only prompt rendering can fail.
    pub async fn evaluate(&self, question: &str, answer: &str) -> AppResult<EvaluationResult> {
        let prompt = self.prompts.build_evaluation(question, answer)?;

        match self.generator.generate_with(&prompt, &self.backend).await {
            Generation::Completed(result) => Ok(parse_verdict(&result.answer, result.usage)),
            Generation::Failed { cause, .. } => Ok(EvaluationResult {
                relevance: Relevance::Unknown,
                explanation: PARSE_FAILURE_EXPLANATION.to_string(),
                usage: LlmUsage::zero(),
                issue: Some(format!("evaluation call failed: {}", cause)),
            }),
        }
    }
}

/// Strictly parse judge output.
///
/// The whole output must be one JSON object with string `Relevance` and
/// `Explanation` fields. Tokens are reported even when parsing fails.
pub fn parse_verdict(raw: &str, usage: LlmUsage) -> EvaluationResult {
    let verdict: Verdict = match serde_json::from_str(raw) {
        Ok(verdict) => verdict,
        Err(e) => {
            tracing::warn!("Evaluation output is not valid JSON: {}", e);
            return EvaluationResult {
                relevance: Relevance::Unknown,
                explanation: PARSE_FAILURE_EXPLANATION.to_string(),
                usage,
                issue: Some(format!("unparseable evaluation output: {}", e)),
            };
        }
    };

    match Relevance::from_model_label(&verdict.relevance) {
        Some(relevance) => EvaluationResult {
            relevance,
            explanation: verdict.explanation,
            usage,
            issue: None,
        },
        None => {
            tracing::warn!("Evaluation returned unrecognized label '{}'", verdict.relevance);
            EvaluationResult {
                relevance: Relevance::Unknown,
                explanation: verdict.explanation,
                usage,
                issue: Some(format!("unrecognized relevance label '{}'", verdict.relevance)),
            }
        }
    }
}
