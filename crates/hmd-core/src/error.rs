//! Sync error handling
//!
//! Every failure of an update attempt ends up as a [`SyncError`]. Server-side
//! rejections (stale version, bad token, unknown buffer) arrive as the
//! response `error` field and are kept apart from failures to complete the
//! request at all.

use thiserror::Error;

/// Failures to complete an update request
#[derive(Error, Debug)]
pub enum TransportError {
    /// The HTTP request could not be sent or did not finish
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-success status with a body that is not a protocol response
    #[error("Server returned HTTP {status} without a readable response body")]
    Status { status: u16 },

    /// The response body was not valid JSON
    #[error("Could not decode server response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The response decoded but carried neither `bufferHash` nor `error`
    #[error("Server response carried neither a buffer hash nor an error")]
    MalformedResponse,

    /// The endpoint could not be reached
    #[error("Endpoint unreachable: {0}")]
    Unreachable(String),
}

/// Outcome of a failed sync attempt
#[derive(Error, Debug)]
pub enum SyncError {
    /// The server refused the update (version conflict or validation error)
    #[error("{0}")]
    Rejected(String),

    /// The request could not be completed
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// An attempt is already in flight
    #[error("A sync attempt is already in flight")]
    Busy,
}

impl SyncError {
    /// True when the server answered with an `error` field
    pub fn is_rejection(&self) -> bool {
        matches!(self, SyncError::Rejected(_))
    }

    /// True when no protocol answer was obtained
    pub fn is_transport(&self) -> bool {
        matches!(self, SyncError::Transport(_))
    }
}

/// Result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_display_is_server_message() {
        let err = SyncError::Rejected("stale version".to_string());
        assert_eq!(err.to_string(), "stale version");
        assert!(err.is_rejection());
        assert!(!err.is_transport());
    }

    #[test]
    fn test_transport_error_conversion() {
        let err: SyncError = TransportError::MalformedResponse.into();
        assert!(err.is_transport());
        assert!(err.to_string().starts_with("Transport error:"));
    }

    #[test]
    fn test_decode_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err = SyncError::from(TransportError::from(json_err));
        assert!(err.to_string().contains("Could not decode"));
    }

    #[test]
    fn test_status_display() {
        let err = TransportError::Status { status: 502 };
        assert!(err.to_string().contains("502"));
    }
}
