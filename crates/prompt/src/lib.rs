//! Prompt system for the course assistant.
//!
//! This crate renders the two prompts the pipeline sends:
//! - the grounded answer prompt (question + retrieved FAQ context)
//! - the relevance evaluation prompt (question + generated answer)

pub mod builder;
pub mod templates;

// Re-export main types
pub use builder::{build_context, ContextDocument, PromptBuilder};
