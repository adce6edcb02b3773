//! Persisted row types.

use assistant_llm::LlmUsage;
use assistant_rag::Relevance;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored conversation with its latest joined feedback, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRow {
    pub id: String,
    pub question: String,
    pub answer: String,
    pub course: String,
    pub model_used: String,
    pub response_time: f64,
    pub relevance: Relevance,
    pub relevance_explanation: String,
    pub usage: LlmUsage,
    pub eval_usage: LlmUsage,
    pub openai_cost: f64,
    pub timestamp: DateTime<Utc>,

    /// +1 / -1 feedback value joined from the feedback table
    pub feedback: Option<i64>,
}

/// Aggregate feedback counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackStats {
    pub thumbs_up: u64,
    pub thumbs_down: u64,
}
