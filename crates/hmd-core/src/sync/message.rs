//! Update protocol message types
//!
//! JSON bodies exchanged with the `{apiEndpoint}/update` endpoint.

use serde::{Deserialize, Serialize};

use crate::buffer::BufferId;
use crate::error::{SyncError, TransportError};

/// Body of an update request
///
/// Claims "I last saw version `buffer_hash`; here is my update."
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    /// Full buffer content
    pub content: String,
    pub buffer_id: BufferId,
    /// Client's last-known version token
    pub buffer_hash: String,
    pub token: String,
}

/// Body of an update response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResponse {
    /// New version token on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer_hash: Option<String>,
    /// Human-readable message on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UpdateResponse {
    pub fn accepted(buffer_hash: impl Into<String>) -> Self {
        Self {
            buffer_hash: Some(buffer_hash.into()),
            error: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            buffer_hash: None,
            error: Some(message.into()),
        }
    }

    /// Interpret the response
    ///
    /// An `error` field wins over a `bufferHash` field. A response with
    /// neither is malformed.
    pub fn into_result(self) -> Result<String, SyncError> {
        if let Some(message) = self.error {
            return Err(SyncError::Rejected(message));
        }
        self.buffer_hash
            .ok_or(SyncError::Transport(TransportError::MalformedResponse))
    }
}
