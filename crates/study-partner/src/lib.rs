//! study-partner: chat with your study materials
//!
//! Uploaded PDFs are split into overlapping character windows, ranked against
//! each question by shared words, and sent as context to a hosted
//! chat-completion model. The conversation and loaded documents live in an
//! explicit [`Session`]; the HTTP layer serialises access to it.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod session;
pub mod types;

pub use config::StudyConfig;
pub use error::{Error, Result};
pub use session::{PendingQuestion, Session};
pub use types::{
    document::{FileType, Fragment},
    message::{Message, Role},
    settings::Settings,
};
