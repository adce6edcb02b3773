//! SQLite conversation and feedback tables.

use crate::types::{ConversationRow, FeedbackStats};
use assistant_core::{AppError, AppResult};
use assistant_llm::LlmUsage;
use assistant_rag::{AnswerRecord, Relevance};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS conversations (
        id TEXT PRIMARY KEY,
        question TEXT NOT NULL,
        answer TEXT NOT NULL,
        course TEXT NOT NULL,
        model_used TEXT NOT NULL,
        response_time REAL NOT NULL,
        relevance TEXT NOT NULL,
        relevance_explanation TEXT NOT NULL,
        prompt_tokens INTEGER NOT NULL,
        completion_tokens INTEGER NOT NULL,
        total_tokens INTEGER NOT NULL,
        eval_prompt_tokens INTEGER NOT NULL,
        eval_completion_tokens INTEGER NOT NULL,
        eval_total_tokens INTEGER NOT NULL,
        openai_cost REAL NOT NULL,
        timestamp TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS feedback (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        conversation_id TEXT NOT NULL,
        feedback INTEGER NOT NULL,
        timestamp TEXT NOT NULL,
        FOREIGN KEY (conversation_id) REFERENCES conversations(id)
    );

    CREATE INDEX IF NOT EXISTS idx_conversations_timestamp ON conversations(timestamp);
    CREATE INDEX IF NOT EXISTS idx_feedback_conversation ON feedback(conversation_id);
"#;

/// Conversation store on a single serialized connection.
pub struct ConversationStore {
    conn: Mutex<Connection>,
}

impl ConversationStore {
    /// Open (or create) the database at `db_path`, creating missing tables.
    pub fn open(db_path: &Path) -> AppResult<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::Storage(format!("Failed to create database directory: {}", e))
                })?;
            }
        }

        let conn = Connection::open(db_path)
            .map_err(|e| AppError::Storage(format!("Failed to open database: {}", e)))?;
        tracing::debug!("Opened conversation store at {:?}", db_path);
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::Storage(format!("Failed to open database: {}", e)))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> AppResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| AppError::Storage(format!("Failed to enable foreign keys: {}", e)))?;
        conn.execute_batch(SCHEMA)
            .map_err(|e| AppError::Storage(format!("Failed to create tables: {}", e)))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Storage("Database lock poisoned".to_string()))
    }

    /// Drop and recreate both tables, discarding all history.
    pub fn init_db(&self) -> AppResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            "DROP TABLE IF EXISTS feedback;
             DROP TABLE IF EXISTS conversations;",
        )
        .map_err(|e| AppError::Storage(format!("Failed to drop tables: {}", e)))?;
        conn.execute_batch(SCHEMA)
            .map_err(|e| AppError::Storage(format!("Failed to create tables: {}", e)))?;

        tracing::info!("Conversation database initialized");
        Ok(())
    }

    /// Persist one answered question. `timestamp` defaults to now.
    pub fn save_conversation(
        &self,
        id: &str,
        question: &str,
        record: &AnswerRecord,
        course: &str,
        timestamp: Option<DateTime<Utc>>,
    ) -> AppResult<()> {
        let timestamp = format_timestamp(timestamp.unwrap_or_else(Utc::now));

        self.lock()?
            .execute(
                "INSERT INTO conversations (
                    id, question, answer, course, model_used, response_time,
                    relevance, relevance_explanation,
                    prompt_tokens, completion_tokens, total_tokens,
                    eval_prompt_tokens, eval_completion_tokens, eval_total_tokens,
                    openai_cost, timestamp
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
                params![
                    id,
                    question,
                    record.answer,
                    course,
                    record.model_used,
                    record.response_time,
                    record.relevance.as_str(),
                    record.relevance_explanation,
                    record.usage.prompt_tokens,
                    record.usage.completion_tokens,
                    record.usage.total_tokens,
                    record.eval_usage.prompt_tokens,
                    record.eval_usage.completion_tokens,
                    record.eval_usage.total_tokens,
                    record.openai_cost,
                    timestamp,
                ],
            )
            .map_err(|e| AppError::Storage(format!("Failed to save conversation: {}", e)))?;

        tracing::debug!("Saved conversation {}", id);
        Ok(())
    }

    /// Attach feedback to a stored conversation. `timestamp` defaults to now.
    pub fn save_feedback(
        &self,
        conversation_id: &str,
        feedback: i64,
        timestamp: Option<DateTime<Utc>>,
    ) -> AppResult<()> {
        let timestamp = format_timestamp(timestamp.unwrap_or_else(Utc::now));

        self.lock()?
            .execute(
                "INSERT INTO feedback (conversation_id, feedback, timestamp) VALUES (?1, ?2, ?3)",
                params![conversation_id, feedback, timestamp],
            )
            .map_err(|e| AppError::Storage(format!("Failed to save feedback: {}", e)))?;

        tracing::debug!("Saved feedback {} for conversation {}", feedback, conversation_id);
        Ok(())
    }

    /// Most recent conversations first, optionally for one relevance label.
    pub fn recent_conversations(
        &self,
        limit: usize,
        relevance: Option<Relevance>,
    ) -> AppResult<Vec<ConversationRow>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT c.id, c.question, c.answer, c.course, c.model_used, c.response_time,
                        c.relevance, c.relevance_explanation,
                        c.prompt_tokens, c.completion_tokens, c.total_tokens,
                        c.eval_prompt_tokens, c.eval_completion_tokens, c.eval_total_tokens,
                        c.openai_cost, c.timestamp, f.feedback
                 FROM conversations c
                 LEFT JOIN feedback f ON c.id = f.conversation_id
                 WHERE ?1 IS NULL OR c.relevance = ?1
                 ORDER BY c.timestamp DESC
                 LIMIT ?2",
            )
            .map_err(|e| AppError::Storage(format!("Failed to prepare query: {}", e)))?;

        let label = relevance.map(|r| r.as_str());
        let rows = stmt
            .query_map(params![label, limit as i64], read_conversation)
            .map_err(|e| AppError::Storage(format!("Failed to query conversations: {}", e)))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::Storage(format!("Failed to read conversations: {}", e)))
    }

    /// Thumbs-up (positive) and thumbs-down (negative) feedback counts.
    pub fn feedback_stats(&self) -> AppResult<FeedbackStats> {
        let (up, down): (i64, i64) = self
            .lock()?
            .query_row(
                "SELECT
                    COALESCE(SUM(CASE WHEN feedback > 0 THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN feedback < 0 THEN 1 ELSE 0 END), 0)
                 FROM feedback",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .map_err(|e| AppError::Storage(format!("Failed to compute feedback stats: {}", e)))?;

        Ok(FeedbackStats {
            thumbs_up: up.max(0) as u64,
            thumbs_down: down.max(0) as u64,
        })
    }
}

// Fixed-width UTC timestamps sort correctly as text
fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn read_conversation(row: &Row<'_>) -> rusqlite::Result<ConversationRow> {
    let relevance: String = row.get(6)?;
    let timestamp: String = row.get(15)?;
    let timestamp = DateTime::parse_from_rfc3339(&timestamp)
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(15, rusqlite::types::Type::Text, Box::new(e))
        })?
        .with_timezone(&Utc);

    Ok(ConversationRow {
        id: row.get(0)?,
        question: row.get(1)?,
        answer: row.get(2)?,
        course: row.get(3)?,
        model_used: row.get(4)?,
        response_time: row.get(5)?,
        relevance: relevance.parse().unwrap_or(Relevance::Unknown),
        relevance_explanation: row.get(7)?,
        usage: LlmUsage {
            prompt_tokens: row.get(8)?,
            completion_tokens: row.get(9)?,
            total_tokens: row.get(10)?,
        },
        eval_usage: LlmUsage {
            prompt_tokens: row.get(11)?,
            completion_tokens: row.get(12)?,
            total_tokens: row.get(13)?,
        },
        openai_cost: row.get(14)?,
        timestamp,
        feedback: row.get(16)?,
    })
}
