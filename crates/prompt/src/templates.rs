//! Built-in prompt templates.
//!
//! Both templates are Handlebars sources rendered with HTML escaping
//! disabled. Single braces in the evaluation template are literal JSON.

/// Registry name of the answer template.
pub const ANSWER_TEMPLATE_NAME: &str = "answer";

/// Registry name of the evaluation template.
pub const EVALUATION_TEMPLATE_NAME: &str = "evaluation";

/// Grounded answer prompt. Variables: `question`, `context`.
pub const ANSWER_TEMPLATE: &str = concat!(
    "You're a course teaching assistant. Answer the QUESTION based on the CONTEXT from the FAQ database.\n",
    "Use only the facts from the CONTEXT when answering the QUESTION.\n",
    "\n",
    "QUESTION: {{question}}\n",
    "\n",
    "CONTEXT: \n",
    "{{context}}",
);

/// Relevance judgement prompt. Variables: `question`, `answer`.
pub const EVALUATION_TEMPLATE: &str = r#"You are an expert evaluator for a Retrieval-Augmented Generation (RAG) system.
Your task is to analyze the relevance of the generated answer to the given question.
Based on the relevance of the generated answer, you will classify it
as "NON_RELEVANT", "PARTLY_RELEVANT", or "RELEVANT".

Here is the data for evaluation:

Question: {{question}}
Generated Answer: {{answer}}

Please analyze the content and context of the generated answer in relation to the question
and provide your evaluation in parsable JSON without using code blocks:

{
  "Relevance": "NON_RELEVANT" | "PARTLY_RELEVANT" | "RELEVANT",
  "Explanation": "[Provide a brief explanation for your evaluation]"
}"#;
