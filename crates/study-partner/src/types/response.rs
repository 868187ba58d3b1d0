//! Response types for the JSON API

use serde::{Deserialize, Serialize};

use super::document::Fragment;
use super::message::Message;

/// Characters of fragment text shown per source
pub const SOURCE_PREVIEW_CHARS: usize = 400;

/// A cited fragment as shown to the user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcePreview {
    /// 1-based position in the answer's source list
    pub index: usize,
    /// Source filename
    pub filename: String,
    /// First characters of the fragment text
    pub preview: String,
    /// Character offsets of the fragment
    pub start: usize,
    pub end: usize,
}

impl SourcePreview {
    /// Build previews for an answer's sources, numbered from 1
    pub fn from_fragments(fragments: &[Fragment]) -> Vec<Self> {
        fragments
            .iter()
            .enumerate()
            .map(|(i, f)| Self {
                index: i + 1,
                filename: f.source.clone(),
                preview: f.preview(SOURCE_PREVIEW_CHARS),
                start: f.start,
                end: f.end,
            })
            .collect()
    }
}

/// Answer to a question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    /// Generated answer text
    pub answer: String,
    /// Fragments sent as context
    pub sources: Vec<SourcePreview>,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

/// Per-file failure during processing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileError {
    pub filename: String,
    pub error: String,
}

/// Outcome of a processing run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessResponse {
    /// Files that produced fragments
    pub processed_files: Vec<String>,
    /// Total fragments now loaded
    pub fragment_count: usize,
    /// Files that failed
    pub errors: Vec<FileError>,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

/// Currently loaded documents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentsResponse {
    pub processed_files: Vec<String>,
    pub fragment_count: usize,
}

/// Conversation log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationResponse {
    pub messages: Vec<Message>,
}
