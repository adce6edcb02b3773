//! Recent command handler.

use assistant_core::{config::AppConfig, AppResult};
use assistant_rag::Relevance;
use assistant_store::ConversationStore;
use clap::Args;

/// List recent conversations
#[derive(Args, Debug)]
pub struct RecentCommand {
    /// Number of conversations to show
    #[arg(short, long, default_value_t = 5)]
    pub limit: usize,

    /// Only show this relevance label (RELEVANT, PARTLY_RELEVANT, NON_RELEVANT, UNKNOWN)
    #[arg(short, long)]
    pub relevance: Option<Relevance>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl RecentCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let store = ConversationStore::open(&config.database_path)?;
        let rows = store.recent_conversations(self.limit, self.relevance)?;
        tracing::debug!("Loaded {} conversations", rows.len());

        if self.json {
            println!("{}", serde_json::to_string_pretty(&rows)?);
            return Ok(());
        }

        if rows.is_empty() {
            println!("No conversations yet");
            return Ok(());
        }

        for row in rows {
            let feedback = match row.feedback {
                Some(value) if value > 0 => "+1",
                Some(value) if value < 0 => "-1",
                _ => "-",
            };
            println!(
                "{} [{}] {} | {} | {} | feedback {}",
                row.timestamp.format("%Y-%m-%d %H:%M:%S"),
                row.course,
                row.id,
                row.model_used,
                row.relevance,
                feedback
            );
            println!("  Q: {}", row.question);
            println!("  A: {}", row.answer);
        }
        Ok(())
    }
}
