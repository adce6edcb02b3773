//! FAQ retrieval.

use crate::store::DocumentStore;
use crate::types::{RetrievedDocument, SearchMode, SearchRequest};
use std::sync::Arc;

/// Maximum number of documents placed in a prompt.
pub const MAX_DOCUMENTS: usize = 5;

/// Documents found for a request, plus the reason if the lookup degraded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Retrieval {
    pub documents: Vec<RetrievedDocument>,
    pub issue: Option<String>,
}

impl Retrieval {
    fn found(documents: Vec<RetrievedDocument>) -> Self {
        Self {
            documents,
            issue: None,
        }
    }

    fn degraded(issue: impl Into<String>) -> Self {
        Self {
            documents: Vec::new(),
            issue: Some(issue.into()),
        }
    }
}

/// Finds the FAQ entries most relevant to a question within one course.
#[derive(Clone)]
pub struct Retriever {
    store: Arc<dyn DocumentStore>,
}

impl Retriever {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Retrieve up to [`MAX_DOCUMENTS`] documents, best match first.
    ///
    /// Never fails: store errors and unsupported modes yield an empty result
    /// with an issue so the caller can still answer without context.
    pub async fn search(&self, request: &SearchRequest) -> Retrieval {
        if request.course.trim().is_empty() {
            tracing::warn!("Retrieval skipped: no course given");
            return Retrieval::degraded("course is required for retrieval");
        }

        match request.mode {
            SearchMode::Text => {}
            SearchMode::Vector => {
                tracing::warn!(
                    "Vector search requested for course '{}' but is not supported; continuing without context",
                    request.course
                );
                return Retrieval::degraded("vector search is not supported");
            }
        }

        match self
            .store
            .text_search(&request.query, &request.course, MAX_DOCUMENTS)
            .await
        {
            Ok(mut documents) => {
                documents.truncate(MAX_DOCUMENTS);
                tracing::info!(
                    "Retrieved {} documents for course '{}'",
                    documents.len(),
                    request.course
                );
                Retrieval::found(documents)
            }
            Err(e) => {
                tracing::error!("Document search failed: {}", e);
                Retrieval::degraded(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assistant_core::{AppError, AppResult};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Returns a fixed list and records what it was asked.
    struct FixedStore {
        documents: Vec<RetrievedDocument>,
        calls: Mutex<Vec<(String, String, usize)>>,
    }

    impl FixedStore {
        fn new(count: usize) -> Self {
            Self {
                documents: (0..count)
                    .map(|i| RetrievedDocument::new("s", format!("q{}", i), "t"))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl DocumentStore for FixedStore {
        async fn text_search(
            &self,
            query: &str,
            course: &str,
            limit: usize,
        ) -> AppResult<Vec<RetrievedDocument>> {
            self.calls
                .lock()
                .unwrap()
                .push((query.to_string(), course.to_string(), limit));
            Ok(self.documents.clone())
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl DocumentStore for BrokenStore {
        async fn text_search(&self, _: &str, _: &str, _: usize) -> AppResult<Vec<RetrievedDocument>> {
            Err(AppError::Retrieval("database is locked".to_string()))
        }
    }

    #[tokio::test]
    async fn test_text_search_passes_course_and_limit() {
        let store = Arc::new(FixedStore::new(2));
        let retriever = Retriever::new(store.clone());

        let result = retriever
            .search(&SearchRequest::new("when?", "ml-zoomcamp", SearchMode::Text))
            .await;

        assert_eq!(result.documents.len(), 2);
        assert!(result.issue.is_none());
        assert_eq!(
            store.calls.lock().unwrap().as_slice(),
            &[("when?".to_string(), "ml-zoomcamp".to_string(), MAX_DOCUMENTS)]
        );
    }

    #[tokio::test]
    async fn test_results_are_capped() {
        let retriever = Retriever::new(Arc::new(FixedStore::new(9)));

        let result = retriever
            .search(&SearchRequest::new("q", "c", SearchMode::Text))
            .await;

        assert_eq!(result.documents.len(), MAX_DOCUMENTS);
        assert_eq!(result.documents[0].question, "q0");
    }

    #[tokio::test]
    async fn test_vector_mode_is_reported_not_silent() {
        let store = Arc::new(FixedStore::new(3));
        let retriever = Retriever::new(store.clone());

        let result = retriever
            .search(&SearchRequest::new("q", "c", SearchMode::Vector))
            .await;

        assert!(result.documents.is_empty());
        assert_eq!(result.issue.as_deref(), Some("vector search is not supported"));
        assert!(store.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_degrades() {
        let retriever = Retriever::new(Arc::new(BrokenStore));

        let result = retriever
            .search(&SearchRequest::new("q", "c", SearchMode::Text))
            .await;

        assert!(result.documents.is_empty());
        assert!(result.issue.unwrap().contains("database is locked"));
    }

    #[tokio::test]
    async fn test_missing_course_degrades() {
        let store = Arc::new(FixedStore::new(1));
        let retriever = Retriever::new(store.clone());

        let result = retriever
            .search(&SearchRequest::new("q", "  ", SearchMode::Text))
            .await;

        assert!(result.documents.is_empty());
        assert!(result.issue.is_some());
        assert!(store.calls.lock().unwrap().is_empty());
    }
}
