//! Request bodies for the JSON API

use serde::{Deserialize, Serialize};

/// Question asked against the processed documents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The question to answer
    pub question: String,
}

/// Bearer token for the completion endpoint
#[derive(Clone, Deserialize)]
pub struct CredentialRequest {
    pub api_key: String,
}

impl std::fmt::Debug for CredentialRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialRequest")
            .field("api_key", &"<redacted>")
            .finish()
    }
}
