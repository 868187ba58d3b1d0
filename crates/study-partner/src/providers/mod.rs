//! Provider abstractions for answer generation
//!
//! The session talks to completion backends through `CompletionProvider` so
//! tests can swap in an in-process fake.

pub mod llm;

pub use llm::{ChatMessage, CompletionProvider};
