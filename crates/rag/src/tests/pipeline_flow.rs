//! End-to-end pipeline behavior over scripted backends.

use crate::store::{DocumentStore, FaqDocument, SqliteDocumentStore};
use crate::types::{Relevance, RetrievedDocument, SearchMode, Stage, FAILED_ANSWER};
use crate::Pipeline;
use assistant_core::{AppError, AppResult};
use assistant_llm::{Backends, LlmUsage, MockLlmClient};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Store that always returns the same documents.
struct OneDocumentStore {
    calls: Mutex<usize>,
}

impl OneDocumentStore {
    fn new() -> Self {
        Self {
            calls: Mutex::new(0),
        }
    }

    fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl DocumentStore for OneDocumentStore {
    async fn text_search(
        &self,
        _query: &str,
        _course: &str,
        _limit: usize,
    ) -> AppResult<Vec<RetrievedDocument>> {
        *self.calls.lock().unwrap() += 1;
        Ok(vec![RetrievedDocument::new(
            "General course-related questions",
            "Homework - What are homework and project deadlines?",
            "Deadlines are listed in the course calendar.",
        )])
    }
}

struct Harness {
    store: Arc<OneDocumentStore>,
    ollama: Arc<MockLlmClient>,
    openai: Arc<MockLlmClient>,
    pipeline: Pipeline,
}

fn harness(ollama: MockLlmClient, openai: MockLlmClient) -> Harness {
    let store = Arc::new(OneDocumentStore::new());
    let ollama = Arc::new(ollama);
    let openai = Arc::new(openai);
    let pipeline = Pipeline::from_parts(
        store.clone(),
        Backends::new(ollama.clone(), openai.clone()),
    )
    .unwrap();

    Harness {
        store,
        ollama,
        openai,
        pipeline,
    }
}

const RELEVANT_VERDICT: &str = r#"{"Relevance":"RELEVANT","Explanation":"matches"}"#;

#[tokio::test]
async fn test_answer_with_local_backend() {
    let h = harness(
        MockLlmClient::new("ollama").with_reply(
            "Check the course calendar.",
            LlmUsage::new(120, 30),
        ),
        MockLlmClient::new("openai").with_reply(RELEVANT_VERDICT, LlmUsage::new(200, 15)),
    );

    let record = h
        .pipeline
        .answer(
            "What is the deadline?",
            "ml-zoomcamp",
            "ollama/llama3",
            SearchMode::Text,
        )
        .await
        .unwrap();

    assert_eq!(record.answer, "Check the course calendar.");
    assert_eq!(record.model_used, "ollama/llama3");
    assert_eq!(record.usage, LlmUsage::new(120, 30));
    assert_eq!(record.usage.total_tokens, 150);
    assert_eq!(record.openai_cost, 0.0);
    assert_eq!(record.relevance, Relevance::Relevant);
    assert_eq!(record.relevance_explanation, "matches");
    assert_eq!(record.eval_usage, LlmUsage::new(200, 15));
    assert!(record.response_time >= 0.0);
    assert!(!record.is_degraded());

    // The retrieved document reached the answer prompt
    let prompts = h.ollama.requests();
    assert_eq!(prompts.len(), 1);
    assert_eq!(prompts[0].model, "llama3");
    assert!(prompts[0]
        .prompt
        .contains("answer: Deadlines are listed in the course calendar."));
    assert!(prompts[0].prompt.contains("QUESTION: What is the deadline?"));

    // The judge saw the generated answer
    let judged = h.openai.requests();
    assert_eq!(judged.len(), 1);
    assert_eq!(judged[0].model, "gpt-4o-mini");
    assert!(judged[0]
        .prompt
        .contains("Generated Answer: Check the course calendar."));
}

#[tokio::test]
async fn test_cloud_backend_is_priced() {
    let h = harness(
        MockLlmClient::new("ollama"),
        MockLlmClient::new("openai")
            .with_reply("Friday.", LlmUsage::new(1000, 500))
            .with_reply(RELEVANT_VERDICT, LlmUsage::new(10, 5)),
    );

    let record = h
        .pipeline
        .answer("When?", "ml-zoomcamp", "openai/gpt-4o", SearchMode::Text)
        .await
        .unwrap();

    assert!((record.openai_cost - 0.06).abs() < 1e-12);
    assert_eq!(h.openai.call_count(), 2);
    assert_eq!(h.ollama.call_count(), 0);
}

#[tokio::test]
async fn test_unknown_provider_is_fatal_and_contacts_nothing() {
    let h = harness(MockLlmClient::new("ollama"), MockLlmClient::new("openai"));

    let err = h
        .pipeline
        .answer("What is the deadline?", "ml-zoomcamp", "unknown/foo", SearchMode::Text)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Config(_)));
    assert_eq!(h.store.calls(), 0);
    assert_eq!(h.ollama.call_count(), 0);
    assert_eq!(h.openai.call_count(), 0);
}

#[tokio::test]
async fn test_generation_failure_still_evaluates() {
    let h = harness(
        MockLlmClient::new("ollama").with_failure("connection refused"),
        MockLlmClient::new("openai").with_reply(
            r#"{"Relevance":"NON_RELEVANT","Explanation":"no answer given"}"#,
            LlmUsage::new(80, 9),
        ),
    );

    let record = h
        .pipeline
        .answer("What is the deadline?", "ml-zoomcamp", "ollama/llama3", SearchMode::Text)
        .await
        .unwrap();

    assert_eq!(record.answer, FAILED_ANSWER);
    assert_eq!(record.usage, LlmUsage::zero());
    assert_eq!(record.relevance, Relevance::NonRelevant);

    let generation_issues: Vec<_> = record.issues_for(Stage::Generation).collect();
    assert_eq!(generation_issues.len(), 1);
    assert!(generation_issues[0].message.contains("connection refused"));

    let judged = h.openai.requests();
    assert!(judged[0].prompt.contains("Generated Answer: Error"));
}

#[tokio::test]
async fn test_unparseable_evaluation_keeps_answer_and_tokens() {
    let h = harness(
        MockLlmClient::new("ollama").with_reply("Friday.", LlmUsage::new(5, 1)),
        MockLlmClient::new("openai").with_reply("oops", LlmUsage::new(60, 2)),
    );

    let record = h
        .pipeline
        .answer("When?", "ml-zoomcamp", "ollama/llama3", SearchMode::Text)
        .await
        .unwrap();

    assert_eq!(record.answer, "Friday.");
    assert_eq!(record.relevance, Relevance::Unknown);
    assert_eq!(record.relevance_explanation, "Failed to parse evaluation");
    assert_eq!(record.eval_usage, LlmUsage::new(60, 2));
    assert_eq!(record.issues_for(Stage::Evaluation).count(), 1);
}

#[tokio::test]
async fn test_vector_mode_answers_without_context() {
    let h = harness(
        MockLlmClient::new("ollama").with_reply("I don't know.", LlmUsage::new(40, 4)),
        MockLlmClient::new("openai").with_reply(RELEVANT_VERDICT, LlmUsage::new(1, 1)),
    );

    let record = h
        .pipeline
        .answer("When?", "ml-zoomcamp", "ollama/llama3", SearchMode::Vector)
        .await
        .unwrap();

    assert_eq!(h.store.calls(), 0);
    assert!(h.ollama.requests()[0].prompt.ends_with("CONTEXT:"));

    let retrieval_issues: Vec<_> = record.issues_for(Stage::Retrieval).collect();
    assert_eq!(retrieval_issues.len(), 1);
    assert_eq!(retrieval_issues[0].message, "vector search is not supported");
}

#[tokio::test]
async fn test_pipeline_over_sqlite_store() {
    let store = Arc::new(SqliteDocumentStore::open_in_memory().unwrap());
    store
        .insert_documents(&[
            FaqDocument {
                id: None,
                course: "ml-zoomcamp".to_string(),
                section: "General course-related questions".to_string(),
                question: "Can I still join the course after the start date?".to_string(),
                text: "Yes, you can still submit homework.".to_string(),
            },
            FaqDocument {
                id: None,
                course: "mlops-zoomcamp".to_string(),
                section: "General course-related questions".to_string(),
                question: "Can I still join the course after the start date?".to_string(),
                text: "Only the project counts.".to_string(),
            },
        ])
        .unwrap();

    let ollama = Arc::new(MockLlmClient::new("ollama").with_reply("Yes.", LlmUsage::new(50, 2)));
    let openai = Arc::new(MockLlmClient::new("openai").with_reply(RELEVANT_VERDICT, LlmUsage::new(1, 1)));
    let pipeline = Pipeline::from_parts(store, Backends::new(ollama.clone(), openai)).unwrap();

    let record = pipeline
        .answer("Can I join late?", "ml-zoomcamp", "ollama/llama3", SearchMode::Text)
        .await
        .unwrap();

    assert_eq!(record.answer, "Yes.");
    let prompt = &ollama.requests()[0].prompt;
    assert!(prompt.contains("answer: Yes, you can still submit homework."));
    assert!(!prompt.contains("Only the project counts."));
}
