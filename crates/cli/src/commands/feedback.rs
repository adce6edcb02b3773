//! Feedback command handler.

use assistant_core::{config::AppConfig, AppError, AppResult};
use assistant_store::ConversationStore;
use clap::Args;

/// Rate a previous answer
#[derive(Args, Debug)]
pub struct FeedbackCommand {
    /// Conversation id printed by `ask`
    pub conversation_id: String,

    /// +1 for thumbs up, -1 for thumbs down
    #[arg(allow_negative_numbers = true)]
    pub value: i64,
}

impl FeedbackCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        if self.value != 1 && self.value != -1 {
            return Err(AppError::Config(format!(
                "Feedback must be +1 or -1, got {}",
                self.value
            )));
        }

        let store = ConversationStore::open(&config.database_path)?;
        store.save_feedback(&self.conversation_id, self.value, None)?;

        println!("Feedback recorded for {}", self.conversation_id);
        Ok(())
    }
}
