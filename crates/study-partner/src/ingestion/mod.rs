//! Document ingestion: text extraction and chunking

mod chunker;
mod parser;
mod processor;

pub use chunker::TextChunker;
pub use parser::{FileParser, ParsedDocument};
pub use processor::{IngestPipeline, ProcessedBatch, UploadedFile};
