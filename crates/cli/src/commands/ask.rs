//! Ask command handler.
//!
//! Runs the answer pipeline for one question and records the conversation.

use assistant_core::{config::AppConfig, AppResult};
use assistant_llm::Backends;
use assistant_rag::{AnswerRecord, Pipeline, SearchMode, SqliteDocumentStore};
use assistant_store::ConversationStore;
use clap::Args;
use std::sync::Arc;
use uuid::Uuid;

/// Backend used when `--backend` is not given.
pub const DEFAULT_BACKEND: &str = "ollama/llama3";

/// Answer a course question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Course whose FAQ is searched (e.g. ml-zoomcamp)
    #[arg(long, env = "COURSE_ASSISTANT_COURSE")]
    pub course: String,

    /// Backend as <provider>/<model> (e.g. ollama/llama3, openai/gpt-4o)
    #[arg(short, long, default_value = DEFAULT_BACKEND)]
    pub backend: String,

    /// Retrieval mode (text, vector)
    #[arg(short, long, default_value = "text")]
    pub mode: SearchMode,

    /// Output the full record as JSON
    #[arg(long)]
    pub json: bool,

    /// Do not store the conversation
    #[arg(long)]
    pub no_save: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let documents = Arc::new(SqliteDocumentStore::open(&config.database_path)?);
        let backends = Backends::from_config(config)?;
        let pipeline = Pipeline::from_parts(documents, backends)?;

        let record = pipeline
            .answer(&self.question, &self.course, &self.backend, self.mode)
            .await?;

        let conversation_id = Uuid::new_v4().to_string();
        if self.no_save {
            tracing::debug!("Not saving conversation (--no-save)");
        } else {
            let store = ConversationStore::open(&config.database_path)?;
            store.save_conversation(
                &conversation_id,
                &self.question,
                &record,
                &self.course,
                None,
            )?;
        }

        if self.json {
            let output = serde_json::json!({
                "conversationId": conversation_id,
                "saved": !self.no_save,
                "course": self.course,
                "question": self.question,
                "record": record,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            print_answer(&conversation_id, &record, !self.no_save);
        }

        Ok(())
    }
}

fn print_answer(conversation_id: &str, record: &AnswerRecord, saved: bool) {
    println!("{}", record.answer);
    println!();
    println!(
        "Relevance: {} ({})",
        record.relevance, record.relevance_explanation
    );
    println!(
        "Model: {} | {:.2}s | {} tokens | cost ${:.6}",
        record.model_used, record.response_time, record.usage.total_tokens, record.openai_cost
    );
    if saved {
        println!("Conversation: {}", conversation_id);
    }

    for issue in &record.issues {
        eprintln!("warning: {} degraded: {}", issue.stage, issue.message);
    }
}
