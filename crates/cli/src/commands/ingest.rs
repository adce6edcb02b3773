//! Ingest command handler.
//!
//! Loads FAQ documents from a JSON file into the full-text document store.

use assistant_core::{config::AppConfig, AppResult};
use assistant_rag::{load_documents, SqliteDocumentStore};
use clap::Args;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Load FAQ documents into the document store
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// JSON file with FAQ documents
    pub file: PathBuf,

    /// Remove existing documents first
    #[arg(long)]
    pub replace: bool,
}

impl IngestCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Ingesting FAQ documents from {:?}", self.file);

        let documents = load_documents(&self.file)?;
        let store = SqliteDocumentStore::open(&config.database_path)?;

        if self.replace {
            store.clear()?;
        }
        let inserted = store.insert_documents(&documents)?;

        let mut per_course: BTreeMap<&str, usize> = BTreeMap::new();
        for doc in &documents {
            *per_course.entry(doc.course.as_str()).or_default() += 1;
        }

        println!("Ingested {} documents", inserted);
        for (course, count) in per_course {
            println!("  {}: {}", course, count);
        }
        Ok(())
    }
}
