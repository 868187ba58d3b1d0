//! Study session state: loaded fragments, conversation and settings

use std::fmt;

use crate::error::{Error, Result};
use crate::generation::PromptBuilder;
use crate::ingestion::ProcessedBatch;
use crate::providers::{ChatMessage, CompletionProvider};
use crate::retrieval::KeywordRanker;
use crate::types::{Fragment, Message, Settings};

pub const MISSING_CREDENTIAL: &str = "Please enter your Groq API key!";
pub const MISSING_DOCUMENTS: &str = "Please upload PDF files and click 'Process Documents' to start chatting!";
pub const EMPTY_QUESTION: &str = "Please enter a question!";

/// A question that passed validation, with its prompt already built
#[derive(Debug, Clone)]
pub struct PendingQuestion {
    pub question: String,
    pub messages: Vec<ChatMessage>,
    /// Fragments sent as context, in rank order
    pub sources: Vec<Fragment>,
    pub temperature: f32,
}

/// Per-user application state
#[derive(Clone, Default)]
pub struct Session {
    fragments: Vec<Fragment>,
    processed_files: Vec<String>,
    conversation: Vec<Message>,
    settings: Settings,
    credential: Option<String>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("fragments", &self.fragments.len())
            .field("processed_files", &self.processed_files)
            .field("conversation", &self.conversation.len())
            .field("settings", &self.settings)
            .field("credential", &self.credential.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Session {
    /// Create an empty session with the given starting settings
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Store the API key. A blank key clears it.
    pub fn set_credential(&mut self, token: impl Into<String>) {
        let token = token.into();
        let token = token.trim();
        self.credential = if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        };
    }

    pub fn clear_credential(&mut self) {
        self.credential = None;
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    /// Fail with the credential prompt when no key is set
    pub fn require_credential(&self) -> Result<&str> {
        self.credential
            .as_deref()
            .ok_or_else(|| Error::validation(MISSING_CREDENTIAL))
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    /// Replace the settings if every value is within its bounds
    pub fn update_settings(&mut self, settings: Settings) -> Result<()> {
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn processed_files(&self) -> &[String] {
        &self.processed_files
    }

    pub fn conversation(&self) -> &[Message] {
        &self.conversation
    }

    pub fn has_documents(&self) -> bool {
        !self.fragments.is_empty()
    }

    /// Whether a question can be asked right now
    pub fn can_chat(&self) -> bool {
        self.has_credential() && self.has_documents()
    }

    /// Replace the loaded documents with `batch` and start a new conversation.
    /// A batch without fragments leaves the session untouched.
    pub fn load(&mut self, batch: ProcessedBatch) -> Result<()> {
        if batch.is_empty() {
            let reasons: Vec<String> = batch
                .errors
                .iter()
                .map(|e| format!("{}: {}", e.filename, e.error))
                .collect();
            return Err(Error::validation(format!(
                "No text could be extracted from the uploaded files ({})",
                reasons.join("; ")
            )));
        }

        tracing::info!(
            "Loaded {} fragments from {} file(s); conversation cleared",
            batch.fragments.len(),
            batch.processed_files.len()
        );

        self.fragments = batch.fragments;
        self.processed_files = batch.processed_files;
        self.conversation.clear();
        Ok(())
    }

    /// Clear the conversation, keeping documents and settings
    pub fn reset(&mut self) {
        self.conversation.clear();
    }

    /// Validate a question, rank fragments and build the prompt
    pub fn prepare(&self, question: &str) -> Result<PendingQuestion> {
        self.require_credential()?;
        if !self.has_documents() {
            return Err(Error::validation(MISSING_DOCUMENTS));
        }

        let question = question.trim();
        if question.is_empty() {
            return Err(Error::validation(EMPTY_QUESTION));
        }

        let sources = KeywordRanker::new().top_fragments(question, &self.fragments, self.settings.top_k);
        let messages = PromptBuilder::build_messages(question, &sources, &self.conversation);

        Ok(PendingQuestion {
            question: question.to_string(),
            messages,
            sources,
            temperature: self.settings.temperature,
        })
    }

    /// Append the question and its answer to the conversation
    pub fn record(&mut self, pending: PendingQuestion, answer: impl Into<String>) -> &Message {
        self.conversation.push(Message::user(pending.question));
        self.conversation.push(Message::assistant(answer, pending.sources));
        &self.conversation[self.conversation.len() - 1]
    }

    /// Ask a question end to end. The conversation only changes on success.
    pub async fn ask(&mut self, question: &str, provider: &dyn CompletionProvider) -> Result<&Message> {
        let pending = self.prepare(question)?;
        let api_key = self.require_credential()?;

        tracing::debug!(
            "Asking {} ({}) with {} context fragment(s)",
            provider.name(),
            provider.model(),
            pending.sources.len()
        );

        let answer = provider
            .complete(api_key, &pending.messages, pending.temperature)
            .await?;

        Ok(self.record(pending, answer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::types::{FileError, Role};

    /// Records the prompt it receives and replies with a canned answer
    struct FakeProvider {
        reply: Result<String>,
        seen: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl FakeProvider {
        fn answering(answer: &str) -> Self {
            Self {
                reply: Ok(answer.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(Error::llm("HTTP 503 Service Unavailable - overloaded")),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn last_user_prompt(&self) -> String {
            let seen = self.seen.lock().unwrap();
            seen.last().unwrap()[1].content.clone()
        }
    }

    #[async_trait]
    impl CompletionProvider for FakeProvider {
        async fn complete(&self, api_key: &str, messages: &[ChatMessage], _temperature: f32) -> Result<String> {
            assert_eq!(api_key, "gsk_test");
            self.seen.lock().unwrap().push(messages.to_vec());
            match &self.reply {
                Ok(answer) => Ok(answer.clone()),
                Err(e) => Err(Error::llm(e.to_string())),
            }
        }

        fn name(&self) -> &str {
            "fake"
        }

        fn model(&self) -> &str {
            "fake-model"
        }
    }

    fn batch(name: &str, texts: &[&str]) -> ProcessedBatch {
        let fragments = texts
            .iter()
            .enumerate()
            .map(|(i, t)| Fragment::new(*t, i * 100, i * 100 + t.len(), name))
            .collect();
        let mut batch = ProcessedBatch::default();
        batch.push(name, Ok(fragments));
        batch
    }

    fn ready_session() -> Session {
        let mut session = Session::default();
        session.set_credential("gsk_test");
        session
            .load(batch(
                "physics.pdf",
                &[
                    "Light travels in straight lines",
                    "Sound needs a medium",
                    "Photosynthesis converts sunlight into chemical energy",
                    "Atoms contain protons",
                    "Heat flows from hot to cold",
                ],
            ))
            .unwrap();
        session
    }

    #[tokio::test]
    async fn test_ask_uses_matching_fragment_as_context() {
        let mut session = ready_session();
        let provider = FakeProvider::answering("Plants make sugar from light.");

        let message = session.ask("explain photosynthesis", &provider).await.unwrap();

        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.sources.len(), 1);
        assert!(message.sources[0].text.starts_with("Photosynthesis"));

        let prompt = provider.last_user_prompt();
        assert!(prompt.contains("[From physics.pdf]\nPhotosynthesis converts sunlight into chemical energy"));
        assert!(!prompt.contains("Sound needs a medium"));
        assert_eq!(session.conversation().len(), 2);
        assert_eq!(session.conversation()[0].content, "explain photosynthesis");
    }

    #[tokio::test]
    async fn test_follow_up_sees_previous_turn() {
        let mut session = ready_session();
        let provider = FakeProvider::answering("Protons are positive.");

        session.ask("what do atoms contain", &provider).await.unwrap();
        session.ask("and heat?", &provider).await.unwrap();

        let prompt = provider.last_user_prompt();
        assert!(prompt.contains("Previous conversation:\nUser: what do atoms contain\nAssistant: Protons are positive.\n\nCurrent question: and heat?"));
        assert_eq!(session.conversation().len(), 4);
    }

    #[tokio::test]
    async fn test_failed_completion_leaves_conversation_unchanged() {
        let mut session = ready_session();
        let provider = FakeProvider::failing();

        let err = session.ask("explain photosynthesis", &provider).await.unwrap_err();

        assert!(matches!(err, Error::Llm(_)));
        assert!(session.conversation().is_empty());
    }

    #[tokio::test]
    async fn test_validation_order() {
        let provider = FakeProvider::answering("unused");

        let mut session = Session::default();
        let err = session.ask("anything", &provider).await.unwrap_err();
        assert_eq!(err.to_string(), MISSING_CREDENTIAL);

        session.set_credential("gsk_test");
        let err = session.ask("anything", &provider).await.unwrap_err();
        assert_eq!(err.to_string(), MISSING_DOCUMENTS);

        let mut session = ready_session();
        let err = session.ask("   ", &provider).await.unwrap_err();
        assert_eq!(err.to_string(), EMPTY_QUESTION);

        assert!(provider.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_prepare_with_no_matches_sends_empty_context() {
        let session = ready_session();
        let pending = session.prepare("zebra").unwrap();

        assert!(pending.sources.is_empty());
        assert!(pending.messages[1].content.starts_with("Context from study materials:\n\n\nPrevious conversation:"));
    }

    #[test]
    fn test_prepare_respects_top_k_and_temperature() {
        let mut session = ready_session();
        session
            .update_settings(Settings { temperature: 0.7, chunk_size: 1000, top_k: 2 })
            .unwrap();

        let pending = session.prepare("light sound heat atoms photosynthesis").unwrap();

        assert_eq!(pending.sources.len(), 2);
        assert!((pending.temperature - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_load_replaces_documents_and_clears_chat() {
        let mut session = ready_session();
        let pending = session.prepare("atoms").unwrap();
        session.record(pending, "They contain protons.");
        assert_eq!(session.conversation().len(), 2);

        session.load(batch("chem.pdf", &["Bonds share electrons"])).unwrap();

        assert!(session.conversation().is_empty());
        assert_eq!(session.processed_files(), ["chem.pdf".to_string()]);
        assert_eq!(session.fragments().len(), 1);
    }

    #[test]
    fn test_load_of_empty_batch_keeps_previous_state() {
        let mut session = ready_session();
        let pending = session.prepare("atoms").unwrap();
        session.record(pending, "They contain protons.");

        let mut failed = ProcessedBatch::default();
        failed.errors.push(FileError {
            filename: "scan.pdf".to_string(),
            error: "no text found in document".to_string(),
        });

        let err = session.load(failed).unwrap_err();
        assert!(err.to_string().contains("scan.pdf: no text found in document"));
        assert_eq!(session.fragments().len(), 5);
        assert_eq!(session.conversation().len(), 2);
    }

    #[test]
    fn test_reset_keeps_documents() {
        let mut session = ready_session();
        let pending = session.prepare("atoms").unwrap();
        session.record(pending, "Protons.");

        session.reset();

        assert!(session.conversation().is_empty());
        assert!(session.has_documents());
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let mut session = Session::default();
        let err = session
            .update_settings(Settings { top_k: 9, ..Settings::default() })
            .unwrap_err();

        assert!(err.is_validation());
        assert_eq!(session.settings().top_k, 3);
    }

    #[test]
    fn test_blank_credential_clears_key() {
        let mut session = Session::default();
        session.set_credential("  gsk_abc  ");
        assert_eq!(session.require_credential().unwrap(), "gsk_abc");

        session.set_credential("   ");
        assert!(!session.has_credential());
    }

    #[test]
    fn test_debug_redacts_credential() {
        let mut session = Session::default();
        session.set_credential("gsk_secret_value");

        let rendered = format!("{:?}", session);

        assert!(!rendered.contains("gsk_secret_value"));
        assert!(rendered.contains("<redacted>"));
    }
}
