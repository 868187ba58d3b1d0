//! Prompt templates for answer generation

use crate::providers::llm::ChatMessage;
use crate::types::{Fragment, Message};

/// Fixed instruction sent as the system message
pub const SYSTEM_INSTRUCTION: &str = "You are a helpful AI study partner. Use the provided context from the user's study materials to answer their questions accurately.

If the answer is not in the context, say so honestly. When possible, explain concepts clearly and provide examples.

Remember previous questions in the conversation to provide coherent follow-up answers.";

/// Conversation window in messages, counting the question being asked.
/// Six messages is the last three exchanges.
pub const HISTORY_WINDOW: usize = 6;

/// Prompt builder for study questions
pub struct PromptBuilder;

impl PromptBuilder {
    /// Concatenate fragments, each labelled with its source file
    pub fn build_context(fragments: &[Fragment]) -> String {
        fragments
            .iter()
            .map(|f| format!("[From {}]\n{}", f.source, f.text))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Render the most recent prior turns as `Role: content` lines.
    /// `history` must not include the question being asked.
    pub fn build_history(history: &[Message]) -> String {
        let prior = HISTORY_WINDOW.saturating_sub(1);
        let recent = &history[history.len().saturating_sub(prior)..];

        recent
            .iter()
            .map(|m| format!("{}: {}", m.role.title(), m.content))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Build the user message embedding context, history and question
    pub fn build_user_prompt(question: &str, context: &str, history: &str) -> String {
        format!(
            r#"Context from study materials:
{context}

Previous conversation:
{history}

Current question: {question}

Please answer based on the context provided."#,
            context = context,
            history = history,
            question = question
        )
    }

    /// Build the two-message prompt: system instruction plus user message
    pub fn build_messages(question: &str, fragments: &[Fragment], history: &[Message]) -> Vec<ChatMessage> {
        let context = Self::build_context(fragments);
        let history = Self::build_history(history);

        vec![
            ChatMessage::system(SYSTEM_INSTRUCTION),
            ChatMessage::user(Self::build_user_prompt(question, &context, &history)),
        ]
    }
}
