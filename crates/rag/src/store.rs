//! SQLite FTS5-backed FAQ document store.
//!
//! Documents live in a single full-text table. The course column is stored
//! but not indexed for matching, so it acts as an exact filter while question
//! and answer text carry the relevance ranking.

use crate::types::RetrievedDocument;
use assistant_core::{AppError, AppResult};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Source of candidate FAQ documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Boolean full-text search restricted to `course`, best match first.
    async fn text_search(
        &self,
        query: &str,
        course: &str,
        limit: usize,
    ) -> AppResult<Vec<RetrievedDocument>>;
}

/// A FAQ entry as ingested from disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub course: String,
    pub section: String,
    pub question: String,
    pub text: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DocumentsFile {
    Flat(Vec<FaqDocument>),
    Grouped(Vec<CourseDocuments>),
}

#[derive(Deserialize)]
struct CourseDocuments {
    course: String,
    documents: Vec<CourseDocument>,
}

#[derive(Deserialize)]
struct CourseDocument {
    #[serde(default)]
    id: Option<String>,
    section: String,
    question: String,
    text: String,
}

/// Load FAQ documents from a JSON file.
///
/// Accepts either a flat array of documents that each carry a `course`, or an
/// array of `{"course": ..., "documents": [...]}` groups.
pub fn load_documents(path: &Path) -> AppResult<Vec<FaqDocument>> {
    let raw = std::fs::read_to_string(path)?;
    parse_documents(&raw)
        .map_err(|e| AppError::Serialization(format!("Invalid documents file {:?}: {}", path, e)))
}

fn parse_documents(raw: &str) -> Result<Vec<FaqDocument>, serde_json::Error> {
    let documents = match serde_json::from_str::<DocumentsFile>(raw)? {
        DocumentsFile::Flat(documents) => documents,
        DocumentsFile::Grouped(groups) => groups
            .into_iter()
            .flat_map(|group| {
                let course = group.course;
                group.documents.into_iter().map(move |doc| FaqDocument {
                    id: doc.id,
                    course: course.clone(),
                    section: doc.section,
                    question: doc.question,
                    text: doc.text,
                })
            })
            .collect(),
    };
    Ok(documents)
}

/// Turn free text into an FTS5 match expression.
///
/// Every alphanumeric token becomes a quoted term and terms are OR-ed, so any
/// word can match and more matching words rank higher. Matching is limited to
/// the question and answer columns. Returns `None` when nothing is searchable.
pub fn match_expression(query: &str) -> Option<String> {
    let terms: Vec<String> = query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(|token| format!("\"{}\"", token))
        .collect();

    if terms.is_empty() {
        return None;
    }

    Some(format!("{{question text}} : ({})", terms.join(" OR ")))
}

/// FAQ store on a single SQLite connection.
///
/// The connection is serialized behind a mutex; searches are short and never
/// hold the lock across an await point.
pub struct SqliteDocumentStore {
    conn: Mutex<Connection>,
}

impl SqliteDocumentStore {
    /// Open (or create) the store at `db_path`.
    pub fn open(db_path: &Path) -> AppResult<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::Retrieval(format!("Failed to create database directory: {}", e))
                })?;
            }
        }

        let conn = Connection::open(db_path)
            .map_err(|e| AppError::Retrieval(format!("Failed to open document store: {}", e)))?;
        tracing::debug!("Opened document store at {:?}", db_path);
        Self::from_connection(conn)
    }

    /// Private in-memory store.
    pub fn open_in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::Retrieval(format!("Failed to open document store: {}", e)))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> AppResult<Self> {
        conn.execute_batch(
            r#"
            CREATE VIRTUAL TABLE IF NOT EXISTS course_questions USING fts5(
                doc_id UNINDEXED,
                course UNINDEXED,
                section UNINDEXED,
                question,
                text
            );
            "#,
        )
        .map_err(|e| AppError::Retrieval(format!("Failed to create document table: {}", e)))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Retrieval("Document store lock poisoned".to_string()))
    }

    /// Insert documents in one transaction. Returns the number inserted.
    pub fn insert_documents(&self, documents: &[FaqDocument]) -> AppResult<usize> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| AppError::Retrieval(format!("Failed to begin transaction: {}", e)))?;

        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO course_questions (doc_id, course, section, question, text)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )
                .map_err(|e| AppError::Retrieval(format!("Failed to prepare insert: {}", e)))?;

            for doc in documents {
                stmt.execute(params![doc.id, doc.course, doc.section, doc.question, doc.text])
                    .map_err(|e| {
                        AppError::Retrieval(format!("Failed to insert document: {}", e))
                    })?;
            }
        }

        tx.commit()
            .map_err(|e| AppError::Retrieval(format!("Failed to commit documents: {}", e)))?;

        tracing::info!("Inserted {} FAQ documents", documents.len());
        Ok(documents.len())
    }

    /// Remove every document.
    pub fn clear(&self) -> AppResult<()> {
        self.lock()?
            .execute("DELETE FROM course_questions", [])
            .map_err(|e| AppError::Retrieval(format!("Failed to clear documents: {}", e)))?;
        Ok(())
    }

    /// Number of stored documents, optionally for one course.
    pub fn count(&self, course: Option<&str>) -> AppResult<u64> {
        let conn = self.lock()?;
        let count: i64 = match course {
            Some(course) => conn.query_row(
                "SELECT COUNT(*) FROM course_questions WHERE course = ?1",
                params![course],
                |row| row.get(0),
            ),
            None => conn.query_row("SELECT COUNT(*) FROM course_questions", [], |row| {
                row.get(0)
            }),
        }
        .map_err(|e| AppError::Retrieval(format!("Failed to count documents: {}", e)))?;

        Ok(count.max(0) as u64)
    }

    fn search(&self, query: &str, course: &str, limit: usize) -> AppResult<Vec<RetrievedDocument>> {
        let Some(expression) = match_expression(query) else {
            tracing::debug!("Query has no searchable terms");
            return Ok(Vec::new());
        };

        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT section, question, text FROM course_questions
                 WHERE course_questions MATCH ?1 AND course = ?2
                 ORDER BY rank
                 LIMIT ?3",
            )
            .map_err(|e| AppError::Retrieval(format!("Failed to prepare search: {}", e)))?;

        let rows = stmt
            .query_map(params![expression, course, limit as i64], |row| {
                Ok(RetrievedDocument {
                    section: row.get(0)?,
                    question: row.get(1)?,
                    text: row.get(2)?,
                })
            })
            .map_err(|e| AppError::Retrieval(format!("Failed to run search: {}", e)))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::Retrieval(format!("Failed to read search results: {}", e)))
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn text_search(
        &self,
        query: &str,
        course: &str,
        limit: usize,
    ) -> AppResult<Vec<RetrievedDocument>> {
        self.search(query, course, limit)
    }
}
