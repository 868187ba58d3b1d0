//! Document and fragment types with source tracking for citations

use serde::{Deserialize, Serialize};

/// Supported upload types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// PDF document
    Pdf,
    /// Plain text file
    Txt,
    /// Markdown file
    Markdown,
    /// Unknown file type
    Unknown,
}

impl FileType {
    /// Detect file type from extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "txt" | "text" => Self::Txt,
            "md" | "markdown" => Self::Markdown,
            _ => Self::Unknown,
        }
    }

    /// Detect file type from a filename's extension
    pub fn from_filename(filename: &str) -> Self {
        match filename.rsplit_once('.') {
            Some((_, ext)) => Self::from_extension(ext),
            None => Self::Unknown,
        }
    }

    /// Check if this is a supported file type
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Txt => "Text File",
            Self::Markdown => "Markdown",
            Self::Unknown => "Unknown",
        }
    }
}

/// A contiguous slice of extracted document text.
///
/// `start` and `end` are character offsets into the extracted text of
/// `source`; `text` is the trimmed slice between them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    /// Trimmed fragment text
    pub text: String,
    /// Character offset where the window starts
    pub start: usize,
    /// Character offset just past the window
    pub end: usize,
    /// Filename of the uploaded document
    pub source: String,
}

impl Fragment {
    /// Create a new fragment
    pub fn new(text: impl Into<String>, start: usize, end: usize, source: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            start,
            end,
            source: source.into(),
        }
    }

    /// First `max_chars` characters of the text followed by an ellipsis
    pub fn preview(&self, max_chars: usize) -> String {
        let mut preview: String = self.text.chars().take(max_chars).collect();
        preview.push_str("...");
        preview
    }
}
