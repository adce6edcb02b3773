//! Stats command handler.
//!
//! Displays feedback statistics.

use assistant_core::{config::AppConfig, AppResult};
use assistant_store::ConversationStore;
use clap::Args;

/// Show feedback statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");

        let stats = ConversationStore::open(&config.database_path)?.feedback_stats()?;

        if self.json {
            let output = serde_json::json!({
                "thumbsUp": stats.thumbs_up,
                "thumbsDown": stats.thumbs_down,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("Thumbs up:   {}", stats.thumbs_up);
            println!("Thumbs down: {}", stats.thumbs_down);
        }
        Ok(())
    }
}
