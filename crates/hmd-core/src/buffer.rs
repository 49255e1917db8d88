//! Buffer identity and session parameters
//!
//! A [`Buffer`] describes the document being edited: who it is, which
//! version of it the server last confirmed, and where and with which token to
//! send updates. It is created from [`SessionParams`], the parameters the
//! embedding host supplies when the session starts.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Opaque buffer identifier
///
/// Hosts identify buffers by number or by string; the value is sent back to
/// the server exactly as it was received.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BufferId {
    Number(i64),
    Text(String),
}

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferId::Number(n) => write!(f, "{}", n),
            BufferId::Text(s) => f.write_str(s),
        }
    }
}

/// Integers parse as numeric ids, anything else is kept as text
impl FromStr for BufferId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<i64>() {
            Ok(n) => BufferId::Number(n),
            Err(_) => BufferId::Text(s.to_string()),
        })
    }
}

impl From<i64> for BufferId {
    fn from(n: i64) -> Self {
        BufferId::Number(n)
    }
}

impl From<&str> for BufferId {
    fn from(s: &str) -> Self {
        BufferId::Text(s.to_string())
    }
}

impl From<String> for BufferId {
    fn from(s: String) -> Self {
        BufferId::Text(s)
    }
}

impl From<&BufferId> for BufferId {
    fn from(id: &BufferId) -> Self {
        id.clone()
    }
}

impl PartialEq<str> for BufferId {
    fn eq(&self, other: &str) -> bool {
        matches!(self, BufferId::Text(s) if s == other)
    }
}

impl PartialEq<&str> for BufferId {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

/// Parameters supplied by the host at session start
///
/// Only `buffer_id` is required. The other fields default to empty strings
/// and are passed through as-is; the server is responsible for rejecting
/// empty identifiers or tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionParams {
    /// Opaque identifier of the target document
    pub buffer_id: BufferId,

    /// Version token of the content the host loaded
    #[serde(default)]
    pub buffer_hash: String,

    /// Base URL of the update API
    #[serde(default)]
    pub api_uri: String,

    /// Opaque credential
    #[serde(default)]
    pub token: String,
}

impl SessionParams {
    pub fn new(buffer_id: impl Into<BufferId>) -> Self {
        Self {
            buffer_id: buffer_id.into(),
            buffer_hash: String::new(),
            api_uri: String::new(),
            token: String::new(),
        }
    }

    pub fn with_hash(mut self, buffer_hash: impl Into<String>) -> Self {
        self.buffer_hash = buffer_hash.into();
        self
    }

    pub fn with_api_uri(mut self, api_uri: impl Into<String>) -> Self {
        self.api_uri = api_uri.into();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    /// Parse parameters from a JSON object (`{"bufferId": ..., ...}`)
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Build the session's buffer
    pub fn into_buffer(self) -> Buffer {
        Buffer {
            buffer_id: self.buffer_id,
            buffer_hash: self.buffer_hash,
            api_endpoint: normalize_api_uri(&self.api_uri),
            auth_token: self.token,
        }
    }
}

/// The document being synchronized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    buffer_id: BufferId,
    buffer_hash: String,
    api_endpoint: String,
    auth_token: String,
}

impl Buffer {
    pub fn buffer_id(&self) -> &BufferId {
        &self.buffer_id
    }

    /// Version the client believes the server currently holds
    pub fn buffer_hash(&self) -> &str {
        &self.buffer_hash
    }

    pub fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }

    /// URL update requests are posted to
    pub fn update_url(&self) -> String {
        format!("{}/update", self.api_endpoint)
    }

    /// Adopt a version token returned by the server
    pub(crate) fn adopt_hash(&mut self, buffer_hash: String) {
        self.buffer_hash = buffer_hash;
    }
}

/// Drop a single trailing slash from the API base URL
fn normalize_api_uri(api_uri: &str) -> String {
    api_uri.strip_suffix('/').unwrap_or(api_uri).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_defaults_from_json() {
        let params = SessionParams::from_json(r#"{"bufferId": "7"}"#).unwrap();
        assert_eq!(params.buffer_id, "7");
        assert_eq!(params.buffer_hash, "");
        assert_eq!(params.api_uri, "");
        assert_eq!(params.token, "");
    }

    #[test]
    fn test_numeric_buffer_id_round_trips() {
        let params = SessionParams::from_json(r#"{"bufferId": 3}"#).unwrap();
        assert_eq!(params.buffer_id, BufferId::Number(3));

        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value["bufferId"], serde_json::json!(3));

        // The host's placeholder id
        let params = SessionParams::from_json(r#"{"bufferId": -1}"#).unwrap();
        assert_eq!(params.buffer_id.to_string(), "-1");
    }

    #[test]
    fn test_buffer_id_from_str() {
        assert_eq!("42".parse::<BufferId>().unwrap(), BufferId::Number(42));
        assert_eq!("notes".parse::<BufferId>().unwrap(), "notes");
    }

    #[test]
    fn test_params_require_buffer_id() {
        let result = SessionParams::from_json(r#"{"bufferHash": "h0"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_params_full_json() {
        let params = SessionParams::from_json(
            r#"{"bufferId": "1", "bufferHash": "h0", "apiUri": "http://localhost:8080/api/", "token": "secret"}"#,
        )
        .unwrap();

        let buffer = params.into_buffer();
        assert_eq!(buffer.buffer_id(), "1");
        assert_eq!(buffer.buffer_hash(), "h0");
        assert_eq!(buffer.api_endpoint(), "http://localhost:8080/api");
        assert_eq!(buffer.auth_token(), "secret");
    }

    #[test]
    fn test_trailing_slash_normalization() {
        assert_eq!(normalize_api_uri("http://host/api/"), "http://host/api");
        assert_eq!(normalize_api_uri("http://host/api"), "http://host/api");
        // Only one slash is stripped
        assert_eq!(normalize_api_uri("http://host//"), "http://host/");
        assert_eq!(normalize_api_uri(""), "");
    }

    #[test]
    fn test_update_url() {
        let buffer = SessionParams::new("1")
            .with_api_uri("http://localhost:9000/")
            .into_buffer();
        assert_eq!(buffer.update_url(), "http://localhost:9000/update");

        // Degraded mode: empty endpoint still yields a path
        let buffer = SessionParams::new("1").into_buffer();
        assert_eq!(buffer.update_url(), "/update");
    }

    #[test]
    fn test_adopt_hash() {
        let mut buffer = SessionParams::new("1").with_hash("h0").into_buffer();
        buffer.adopt_hash("h1".to_string());
        assert_eq!(buffer.buffer_hash(), "h1");
    }
}
