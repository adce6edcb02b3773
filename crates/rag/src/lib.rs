//! Retrieval-augmented answering for course FAQ questions.
//!
//! The [`Pipeline`] retrieves FAQ entries for a course, renders a grounded
//! prompt, generates an answer on the selected backend, has a fixed judge
//! model rate its relevance and estimates the generation cost.

pub mod cost;
pub mod evaluator;
pub mod generator;
pub mod pipeline;
pub mod retriever;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export main types
pub use cost::calculate_cost;
pub use evaluator::Evaluator;
pub use generator::Generator;
pub use pipeline::Pipeline;
pub use retriever::{Retrieval, Retriever, MAX_DOCUMENTS};
pub use store::{load_documents, DocumentStore, FaqDocument, SqliteDocumentStore};
pub use types::{
    AnswerRecord, EvaluationResult, Generation, GenerationResult, PipelineIssue, Relevance,
    RetrievedDocument, SearchMode, SearchRequest, Stage, FAILED_ANSWER,
};
