//! Text extraction from uploaded files

use crate::error::{Error, Result};
use crate::types::FileType;

/// Extracted document text
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// File type
    pub file_type: FileType,
    /// Extracted text content
    pub content: String,
    /// Total pages (PDF only)
    pub total_pages: Option<u32>,
}

/// Upload parser
pub struct FileParser;

impl FileParser {
    /// Parse a file based on its extension
    pub fn parse(filename: &str, data: &[u8]) -> Result<ParsedDocument> {
        let file_type = FileType::from_filename(filename);
        if !file_type.is_supported() {
            return Err(Error::UnsupportedFileType(format!(
                "{} - only PDF, text and markdown files are accepted",
                filename
            )));
        }

        match file_type {
            FileType::Pdf => Self::parse_pdf(filename, data),
            _ => Self::parse_text(data, file_type),
        }
    }

    /// Parse PDF document, page by page when possible
    fn parse_pdf(filename: &str, data: &[u8]) -> Result<ParsedDocument> {
        match Self::extract_pdf_pages(data) {
            Ok(Some((content, total_pages))) => {
                return Ok(ParsedDocument {
                    file_type: FileType::Pdf,
                    content,
                    total_pages: Some(total_pages),
                });
            }
            Ok(None) => {
                tracing::debug!("No per-page text in {}, trying whole-document extraction", filename);
            }
            Err(e) => {
                tracing::debug!("Per-page extraction failed for {}: {}", filename, e);
            }
        }

        let text = pdf_extract::extract_text_from_mem(data)
            .map_err(|e| Error::file_parse(filename, e.to_string()))?;

        if text.trim().is_empty() {
            return Err(Error::file_parse(filename, "no extractable text"));
        }

        Ok(ParsedDocument {
            file_type: FileType::Pdf,
            content: page_section(1, &text),
            total_pages: Some(1),
        })
    }

    /// Extract each page with lopdf. `None` when no page yields any text.
    fn extract_pdf_pages(data: &[u8]) -> std::result::Result<Option<(String, u32)>, lopdf::Error> {
        let doc = lopdf::Document::load_mem(data)?;
        let pages = doc.get_pages();

        let mut content = String::new();
        let mut has_text = false;

        for &page_number in pages.keys() {
            let page_text = doc.extract_text(&[page_number]).unwrap_or_default();
            has_text |= !page_text.trim().is_empty();
            content.push_str(&page_section(page_number, &page_text));
        }

        Ok(has_text.then(|| (content, pages.len() as u32)))
    }

    /// Parse plain text or markdown
    fn parse_text(data: &[u8], file_type: FileType) -> Result<ParsedDocument> {
        let content = String::from_utf8_lossy(data).to_string();

        Ok(ParsedDocument {
            file_type,
            content,
            total_pages: None,
        })
    }
}

/// Page text prefixed with its page marker
fn page_section(page_number: u32, text: &str) -> String {
    format!("\n\n[Page {}]\n{}", page_number, text)
}
