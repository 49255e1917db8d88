//! Update transports
//!
//! A [`Transport`] delivers one [`UpdateRequest`] and hands back the decoded
//! [`UpdateResponse`]. Interpreting the response (success vs. rejection) is
//! left to the sync client.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::message::{UpdateRequest, UpdateResponse};
use crate::error::TransportError;

/// Request/response facility used by the sync client
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Send an update to `update_url` (see [`Buffer::update_url`])
    ///
    /// [`Buffer::update_url`]: crate::buffer::Buffer::update_url
    async fn send_update(
        &self,
        update_url: &str,
        request: &UpdateRequest,
    ) -> Result<UpdateResponse, TransportError>;
}

/// JSON-over-HTTP transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with a per-request timeout
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Wrap an existing client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send_update(
        &self,
        update_url: &str,
        request: &UpdateRequest,
    ) -> Result<UpdateResponse, TransportError> {
        debug!("POST {} (buffer {})", update_url, request.buffer_id);

        let response = self.client.post(update_url).json(request).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        match serde_json::from_slice::<UpdateResponse>(&body) {
            Ok(decoded) => Ok(decoded),
            Err(_) if !status.is_success() => Err(TransportError::Status {
                status: status.as_u16(),
            }),
            Err(e) => Err(TransportError::Decode(e)),
        }
    }
}
