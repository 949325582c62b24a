//! Prompt templates for the retrieval chain, tips, insights and titles.
//!
//! These templates use basic `format!()` interpolation for type safety.

use crate::models::ScoredChunk;

/// Question sent through the retrieval chain once per day.
pub const DAILY_TIP_QUERY: &str = "Give one short, practical health tip for adolescents \
about reproductive health or puberty. Answer in one or two friendly sentences.";

/// Build the "stuff" prompt: every retrieved chunk followed by the question.
///
/// # Example
/// ```
/// use adolescare::llm::prompts::retrieval_qa_prompt;
///
/// let prompt = retrieval_qa_prompt("What is menarche?", &[]);
/// assert!(prompt.contains("Question: What is menarche?"));
/// ```
pub fn retrieval_qa_prompt(question: &str, context: &[ScoredChunk]) -> String {
    let context = context
        .iter()
        .map(|scored| scored.chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        r#"Use the following pieces of context to answer the question at the end. If you don't know the answer, just say that you don't know, don't try to make up an answer.

{context}

Question: {question}
Helpful Answer:"#
    )
}

/// Insight request for a symptom and activity log. Empty lists still produce
/// a complete prompt.
///
/// # Example
/// ```
/// use adolescare::llm::prompts::insights_prompt;
///
/// let prompt = insights_prompt(&["cramps".to_string()], &["running".to_string()]);
/// assert!(prompt.contains("cramps"));
/// assert!(prompt.contains("running"));
/// ```
pub fn insights_prompt(symptoms: &[String], activities: &[String]) -> String {
    let symptoms = bullet_list(symptoms);
    let activities = bullet_list(activities);

    format!(
        r#"An adolescent logged the following symptoms and activities.

Symptoms:
{symptoms}

Activities:
{activities}

Based on the documents, give short, supportive health insights about how these symptoms and activities may relate, and when it would be wise to talk to a trusted adult or health worker. Keep it under 120 words."#
    )
}

/// Ask for a short title for a tip.
pub fn tip_title_prompt(tip: &str) -> String {
    format!(r#"Give a short, 3- to 5-word title for this adolescent health tip: "{tip}""#)
}

fn bullet_list(items: &[String]) -> String {
    if items.is_empty() {
        return "- (none reported)".to_string();
    }
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}
