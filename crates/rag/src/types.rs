//! Pipeline type definitions.

use assistant_core::AppError;
use assistant_llm::LlmUsage;
use assistant_prompt::ContextDocument;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Answer text recorded when generation failed.
///
/// Only used as the persisted answer for a [`Generation::Failed`] outcome;
/// callers should branch on the outcome, never on this string.
pub const FAILED_ANSWER: &str = "Error";

/// A FAQ snippet returned by the retriever.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    /// FAQ section heading
    pub section: String,

    /// FAQ question
    pub question: String,

    /// FAQ answer text
    pub text: String,
}

impl RetrievedDocument {
    pub fn new(
        section: impl Into<String>,
        question: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            section: section.into(),
            question: question.into(),
            text: text.into(),
        }
    }
}

impl ContextDocument for RetrievedDocument {
    fn section(&self) -> &str {
        &self.section
    }

    fn question(&self) -> &str {
        &self.question
    }

    fn text(&self) -> &str {
        &self.text
    }
}

/// How the retriever looks up candidate documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchMode {
    /// Boolean full-text search over question and answer text
    #[default]
    Text,
    /// Dense-vector nearest-neighbour search (not supported)
    Vector,
}

impl SearchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Vector => "Vector",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "vector" => Ok(Self::Vector),
            _ => Err(AppError::Config(format!(
                "Unknown search mode '{}'. Supported: text, vector",
                s
            ))),
        }
    }
}

/// A retrieval request. The course is always applied as a filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub course: String,
    pub mode: SearchMode,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, course: impl Into<String>, mode: SearchMode) -> Self {
        Self {
            query: query.into(),
            course: course.into(),
            mode,
        }
    }
}

/// A completed generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Generated answer text
    pub answer: String,

    /// Tokens reported by the backend
    pub usage: LlmUsage,

    /// Wall-clock seconds around the backend call
    pub elapsed_secs: f64,
}

/// Outcome of a generation call.
#[derive(Debug, Clone, PartialEq)]
pub enum Generation {
    /// The backend produced an answer
    Completed(GenerationResult),

    /// The backend call failed; no tokens are accounted
    Failed { cause: String, elapsed_secs: f64 },
}

impl Generation {
    /// Answer text, or [`FAILED_ANSWER`] for a failed call.
    pub fn answer(&self) -> &str {
        match self {
            Self::Completed(result) => &result.answer,
            Self::Failed { .. } => FAILED_ANSWER,
        }
    }

    /// Token usage; all zeros for a failed call.
    pub fn usage(&self) -> LlmUsage {
        match self {
            Self::Completed(result) => result.usage,
            Self::Failed { .. } => LlmUsage::zero(),
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        match self {
            Self::Completed(result) => result.elapsed_secs,
            Self::Failed { elapsed_secs, .. } => *elapsed_secs,
        }
    }

    /// Failure cause, if the call failed.
    pub fn failure(&self) -> Option<&str> {
        match self {
            Self::Completed(_) => None,
            Self::Failed { cause, .. } => Some(cause),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

/// Relevance label assigned by the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Relevance {
    Relevant,
    PartlyRelevant,
    NonRelevant,
    /// Evaluator output was missing, malformed or outside the label set
    Unknown,
}

impl Relevance {
    pub const ALL: [Relevance; 4] = [
        Relevance::Relevant,
        Relevance::PartlyRelevant,
        Relevance::NonRelevant,
        Relevance::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Relevant => "RELEVANT",
            Self::PartlyRelevant => "PARTLY_RELEVANT",
            Self::NonRelevant => "NON_RELEVANT",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Parse a label a model may legitimately return.
    ///
    /// `UNKNOWN` is not a genuine classification, so it is rejected here.
    pub fn from_model_label(label: &str) -> Option<Self> {
        match label {
            "RELEVANT" => Some(Self::Relevant),
            "PARTLY_RELEVANT" => Some(Self::PartlyRelevant),
            "NON_RELEVANT" => Some(Self::NonRelevant),
            _ => None,
        }
    }
}

impl fmt::Display for Relevance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Relevance {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        Relevance::ALL
            .into_iter()
            .find(|r| r.as_str() == upper)
            .ok_or_else(|| {
                AppError::Config(format!(
                    "Unknown relevance label '{}'. Supported: RELEVANT, PARTLY_RELEVANT, NON_RELEVANT, UNKNOWN",
                    s
                ))
            })
    }
}

/// Result of the relevance self-evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub relevance: Relevance,
    pub explanation: String,

    /// Tokens spent on the evaluation call, even when its output was unusable
    pub usage: LlmUsage,

    /// Why the result is UNKNOWN, when it is
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,
}

/// Pipeline stage an absorbed failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Retrieval,
    Generation,
    Evaluation,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Retrieval => "retrieval",
            Self::Generation => "generation",
            Self::Evaluation => "evaluation",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure the pipeline absorbed into a degraded result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineIssue {
    pub stage: Stage,
    pub message: String,
}

impl PipelineIssue {
    pub fn new(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }
}

/// Everything one pipeline invocation produced.
///
/// Carries no identifier or timestamp; the persistence layer assigns both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub answer: String,

    /// Backend identifier the answer was generated with
    pub model_used: String,

    /// Generation latency in seconds
    pub response_time: f64,

    pub relevance: Relevance,
    pub relevance_explanation: String,

    /// Generation token usage
    pub usage: LlmUsage,

    /// Evaluation token usage
    pub eval_usage: LlmUsage,

    /// Estimated generation cost
    pub openai_cost: f64,

    /// Failures absorbed while producing this record
    #[serde(default)]
    pub issues: Vec<PipelineIssue>,
}

impl AnswerRecord {
    /// Whether any stage degraded.
    pub fn is_degraded(&self) -> bool {
        !self.issues.is_empty()
    }

    pub fn issues_for(&self, stage: Stage) -> impl Iterator<Item = &PipelineIssue> {
        self.issues.iter().filter(move |issue| issue.stage == stage)
    }
}
