//! Ingestion pipeline orchestration

use crate::error::{Error, Result};
use crate::types::{FileError, Fragment};

use super::chunker::TextChunker;
use super::parser::{FileParser, ParsedDocument};

/// An uploaded file awaiting processing
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub data: bytes::Bytes,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, data: impl Into<bytes::Bytes>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
        }
    }
}

/// Fragments produced from a set of uploads
#[derive(Debug, Clone, Default)]
pub struct ProcessedBatch {
    /// All fragments, in upload order
    pub fragments: Vec<Fragment>,
    /// Files that produced fragments
    pub processed_files: Vec<String>,
    /// Files that failed
    pub errors: Vec<FileError>,
}

impl ProcessedBatch {
    /// Record one file's outcome
    pub fn push(&mut self, filename: &str, result: Result<Vec<Fragment>>) {
        match result {
            Ok(fragments) if fragments.iter().any(|f| !f.text.is_empty()) => {
                self.fragments.extend(fragments);
                self.processed_files.push(filename.to_string());
            }
            Ok(_) => {
                self.errors.push(FileError {
                    filename: filename.to_string(),
                    error: "no text found in document".to_string(),
                });
            }
            Err(e) => {
                tracing::warn!("Failed to process {}: {}", filename, e);
                self.errors.push(FileError {
                    filename: filename.to_string(),
                    error: e.to_string(),
                });
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// Parse + chunk pipeline
#[derive(Debug, Clone, Copy)]
pub struct IngestPipeline {
    chunker: TextChunker,
}

impl IngestPipeline {
    /// Create a new ingestion pipeline
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        Ok(Self {
            chunker: TextChunker::new(chunk_size, chunk_overlap)?,
        })
    }

    /// Parse a file
    pub fn parse_file(&self, filename: &str, data: &[u8]) -> Result<ParsedDocument> {
        FileParser::parse(filename, data)
    }

    /// Full ingestion of one file: parse + chunk
    pub fn ingest(&self, filename: &str, data: &[u8]) -> Result<Vec<Fragment>> {
        let parsed = self.parse_file(filename, data)?;

        let fragments = self.chunker.chunk(&parsed.content, filename);

        tracing::info!(
            "Chunked {} ({}, {} pages) into {} fragments (size {}, overlap {})",
            filename,
            parsed.file_type.display_name(),
            parsed.total_pages.unwrap_or(1),
            fragments.len(),
            self.chunker.chunk_size(),
            self.chunker.overlap()
        );

        Ok(fragments)
    }

    /// Ingest every file, continuing past per-file failures.
    /// Extraction runs on the blocking pool; a panic inside a PDF library
    /// is reported against that file only.
    pub async fn ingest_all(&self, files: Vec<UploadedFile>) -> Result<ProcessedBatch> {
        if files.is_empty() {
            return Err(Error::validation("Please upload at least one PDF file!"));
        }

        let mut batch = ProcessedBatch::default();
        for file in files {
            let filename = file.filename.clone();
            let pipeline = *self;

            let result = on_blocking_pool(&filename, move || pipeline.ingest(&file.filename, &file.data)).await;

            batch.push(&filename, result);
        }

        Ok(batch)
    }
}

/// Run `work` for one file on the blocking pool. A panic becomes a parse
/// error for that file.
async fn on_blocking_pool<F>(filename: &str, work: F) -> Result<Vec<Fragment>>
where
    F: FnOnce() -> Result<Vec<Fragment>> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .unwrap_or_else(|e| Err(Error::file_parse(filename, format!("extraction aborted: {}", e))))
}
