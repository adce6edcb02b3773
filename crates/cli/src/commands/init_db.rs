//! Init-db command handler.

use assistant_core::{config::AppConfig, AppResult};
use assistant_rag::SqliteDocumentStore;
use assistant_store::ConversationStore;
use clap::Args;

/// Recreate the conversation, feedback and document tables
#[derive(Args, Debug)]
pub struct InitDbCommand {
    /// Keep ingested FAQ documents
    #[arg(long)]
    pub keep_documents: bool,
}

impl InitDbCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Initializing database at {:?}", config.database_path);

        ConversationStore::open(&config.database_path)?.init_db()?;

        if !self.keep_documents {
            SqliteDocumentStore::open(&config.database_path)?.clear()?;
        }

        println!("Database initialized: {}", config.database_path.display());
        Ok(())
    }
}
