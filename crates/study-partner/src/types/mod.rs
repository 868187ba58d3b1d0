//! Core types for the study partner

pub mod document;
pub mod message;
pub mod query;
pub mod response;
pub mod settings;

pub use document::{FileType, Fragment};
pub use message::{Message, Role};
pub use query::{CredentialRequest, QueryRequest};
pub use response::{AskResponse, ConversationResponse, DocumentsResponse, FileError, ProcessResponse, SourcePreview};
pub use settings::Settings;
