//! Conversation and feedback persistence.
//!
//! Every answered question is stored with its generation and evaluation
//! metrics; users can attach thumbs-up/down feedback to a conversation.

pub mod conversations;
pub mod types;

pub use conversations::ConversationStore;
pub use types::{ConversationRow, FeedbackStats};
