//! Conversation log entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::document::Fragment;

/// Author of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Wire name used by the completion endpoint
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    /// Capitalised name used in rendered transcripts
    pub fn title(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Assistant => "Assistant",
        }
    }
}

/// One turn of the conversation. Never mutated after it is appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    /// Fragments the answer was grounded on (assistant turns only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<Fragment>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content.into(), Vec::new())
    }

    /// Create an assistant turn with the fragments it cited
    pub fn assistant(content: impl Into<String>, sources: Vec<Fragment>) -> Self {
        Self::new(Role::Assistant, content.into(), sources)
    }

    fn new(role: Role, content: String, sources: Vec<Fragment>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content,
            sources,
            created_at: Utc::now(),
        }
    }
}
