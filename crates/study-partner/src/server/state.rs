//! Application state for the study partner server

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

use crate::config::StudyConfig;
use crate::error::Result;
use crate::generation::ChatCompletionClient;
use crate::ingestion::{IngestPipeline, UploadedFile};
use crate::providers::CompletionProvider;
use crate::session::Session;
use crate::types::{AskResponse, ProcessResponse, SourcePreview};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: StudyConfig,
    /// The study session. Held for the whole of each interaction.
    session: Mutex<Session>,
    /// Completion backend
    provider: Arc<dyn CompletionProvider>,
}

impl AppState {
    /// Create application state backed by the configured completion endpoint
    pub fn new(config: StudyConfig) -> Result<Self> {
        let provider = Arc::new(ChatCompletionClient::new(&config.llm)?);
        tracing::info!(
            "Completion client initialized ({} via {})",
            config.llm.model,
            config.llm.endpoint
        );
        Ok(Self::with_provider(config, provider))
    }

    /// Create application state with an explicit completion backend
    pub fn with_provider(config: StudyConfig, provider: Arc<dyn CompletionProvider>) -> Self {
        let session = Session::new(config.settings);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                session: Mutex::new(session),
                provider,
            }),
        }
    }

    /// Get configuration
    pub fn config(&self) -> &StudyConfig {
        &self.inner.config
    }

    /// Get the session lock
    pub fn session(&self) -> &Mutex<Session> {
        &self.inner.session
    }

    /// Get the completion backend
    pub fn provider(&self) -> &dyn CompletionProvider {
        self.inner.provider.as_ref()
    }

    /// Parse, chunk and load uploads into `session`.
    /// Processing needs a key, as asking does.
    pub async fn process_uploads(
        &self,
        session: &mut Session,
        files: Vec<UploadedFile>,
    ) -> Result<ProcessResponse> {
        let start = Instant::now();
        session.require_credential()?;

        let pipeline = IngestPipeline::new(
            session.settings().chunk_size,
            self.config().chunking.chunk_overlap,
        )?;
        let batch = pipeline.ingest_all(files).await?;
        let errors = batch.errors.clone();

        session.load(batch)?;

        Ok(ProcessResponse {
            processed_files: session.processed_files().to_vec(),
            fragment_count: session.fragments().len(),
            errors,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Ask a question against `session`
    pub async fn answer(&self, session: &mut Session, question: &str) -> Result<AskResponse> {
        let start = Instant::now();

        let message = session.ask(question, self.provider()).await?;

        Ok(AskResponse {
            answer: message.content.clone(),
            sources: SourcePreview::from_fragments(&message.sources),
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}
