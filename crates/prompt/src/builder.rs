//! Prompt builder for rendering templates and injecting retrieved context.

use crate::templates::{
    ANSWER_TEMPLATE, ANSWER_TEMPLATE_NAME, EVALUATION_TEMPLATE, EVALUATION_TEMPLATE_NAME,
};
use assistant_core::{AppError, AppResult};
use handlebars::Handlebars;
use serde::Serialize;

/// A knowledge-base entry that can be placed in the prompt context.
pub trait ContextDocument {
    fn section(&self) -> &str;
    fn question(&self) -> &str;
    /// The FAQ answer text.
    fn text(&self) -> &str;
}

#[derive(Serialize)]
struct AnswerVars<'a> {
    question: &'a str,
    context: &'a str,
}

#[derive(Serialize)]
struct EvaluationVars<'a> {
    question: &'a str,
    answer: &'a str,
}

/// Renders the answer and evaluation prompts.
///
/// Templates are compiled once in [`PromptBuilder::new`]; rendering is pure,
/// so identical inputs always produce byte-identical prompts.
pub struct PromptBuilder {
    registry: Handlebars<'static>,
}

impl PromptBuilder {
    /// Compile the built-in templates.
    pub fn new() -> AppResult<Self> {
        let mut registry = Handlebars::new();

        // Prompts are plain text
        registry.register_escape_fn(handlebars::no_escape);
        registry.set_strict_mode(true);

        registry
            .register_template_string(ANSWER_TEMPLATE_NAME, ANSWER_TEMPLATE)
            .map_err(|e| AppError::Prompt(format!("Failed to register answer template: {}", e)))?;
        registry
            .register_template_string(EVALUATION_TEMPLATE_NAME, EVALUATION_TEMPLATE)
            .map_err(|e| {
                AppError::Prompt(format!("Failed to register evaluation template: {}", e))
            })?;

        Ok(Self { registry })
    }

    /// Build the grounded answer prompt for `query`.
    ///
    /// Documents appear in the given order. An empty slice yields an empty
    /// context block.
    pub fn build<D: ContextDocument>(&self, query: &str, documents: &[D]) -> AppResult<String> {
        let context = build_context(documents);
        tracing::debug!(
            "Building answer prompt with {} documents ({} context bytes)",
            documents.len(),
            context.len()
        );

        let rendered = self.render(
            ANSWER_TEMPLATE_NAME,
            &AnswerVars {
                question: query,
                context: &context,
            },
        )?;

        Ok(rendered.trim().to_string())
    }

    /// Build the relevance evaluation prompt.
    pub fn build_evaluation(&self, question: &str, answer: &str) -> AppResult<String> {
        self.render(EVALUATION_TEMPLATE_NAME, &EvaluationVars { question, answer })
    }

    fn render<T: Serialize>(&self, name: &str, vars: &T) -> AppResult<String> {
        self.registry
            .render(name, vars)
            .map_err(|e| AppError::Prompt(format!("Failed to render template '{}': {}", name, e)))
    }
}

/// Format documents as `section/question/answer` records separated by a
/// blank line.
pub fn build_context<D: ContextDocument>(documents: &[D]) -> String {
    documents
        .iter()
        .map(|doc| {
            format!(
                "section: {}\nquestion: {}\nanswer: {}",
                doc.section(),
                doc.question(),
                doc.text()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Doc(&'static str, &'static str, &'static str);

    impl ContextDocument for Doc {
        fn section(&self) -> &str {
            self.0
        }
        fn question(&self) -> &str {
            self.1
        }
        fn text(&self) -> &str {
            self.2
        }
    }

    #[test]
    fn test_build_prompt_exact_output() {
        let builder = PromptBuilder::new().unwrap();
        let docs = [Doc(
            "General course-related questions",
            "Course - When will the course start?",
            "The course starts on 15 September.",
        )];

        let prompt = builder.build("When does it start?", &docs).unwrap();
        let expected = "You're a course teaching assistant. Answer the QUESTION based on the CONTEXT from the FAQ database.\n\
Use only the facts from the CONTEXT when answering the QUESTION.\n\
\n\
QUESTION: When does it start?\n\
\n\
CONTEXT: \n\
section: General course-related questions\n\
question: Course - When will the course start?\n\
answer: The course starts on 15 September.";

        assert_eq!(prompt, expected);
    }

    #[test]
    fn test_context_preserves_order_and_blank_line_separator() {
        let docs = [Doc("s1", "q1", "a1"), Doc("s2", "q2", "a2")];
        let context = build_context(&docs);
        assert_eq!(
            context,
            "section: s1\nquestion: q1\nanswer: a1\n\nsection: s2\nquestion: q2\nanswer: a2"
        );
    }

    #[test]
    fn test_empty_documents_give_empty_context() {
        let builder = PromptBuilder::new().unwrap();
        let docs: [Doc; 0] = [];

        let prompt = builder.build("Anything?", &docs).unwrap();
        assert!(prompt.ends_with("CONTEXT:"));
        assert!(prompt.contains("QUESTION: Anything?"));
    }

    #[test]
    fn test_build_is_deterministic() {
        let builder = PromptBuilder::new().unwrap();
        let docs = [Doc("s", "q", "a"), Doc("s", "q2", "a2")];

        let first = builder.build("same question", &docs).unwrap();
        let second = builder.build("same question", &docs).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_html_escaping_or_template_injection() {
        let builder = PromptBuilder::new().unwrap();
        let docs = [Doc("<s>", "a & b", "use {{braces}}")];

        let prompt = builder.build("Is x < y?", &docs).unwrap();
        assert!(prompt.contains("QUESTION: Is x < y?"));
        assert!(prompt.contains("question: a & b"));
        assert!(prompt.contains("answer: use {{braces}}"));
    }

    #[test]
    fn test_evaluation_prompt() {
        let builder = PromptBuilder::new().unwrap();
        let prompt = builder
            .build_evaluation("What is the deadline?", "Friday at noon")
            .unwrap();

        assert!(prompt.contains("Question: What is the deadline?"));
        assert!(prompt.contains("Generated Answer: Friday at noon"));
        assert!(prompt.contains("\"Relevance\": \"NON_RELEVANT\" | \"PARTLY_RELEVANT\" | \"RELEVANT\""));
        assert!(prompt.trim_end().ends_with('}'));
    }
}
