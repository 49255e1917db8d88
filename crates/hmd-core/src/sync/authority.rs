//! In-process authoritative copy
//!
//! [`LocalAuthority`] plays the server's role without a network: it keeps
//! the current content and version token of every registered buffer and
//! applies updates with the same optimistic-concurrency check a remote
//! endpoint performs. Hosts can embed it directly; tests use it to drive
//! whole sessions.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::message::{UpdateRequest, UpdateResponse};
use super::transport::Transport;
use crate::buffer::BufferId;
use crate::error::TransportError;

/// Error returned when the claimed version is not the current one
pub const STALE_VERSION: &str = "stale version";

#[derive(Debug, Clone)]
struct StoredBuffer {
    content: String,
    buffer_hash: String,
}

#[derive(Debug)]
struct AuthorityState {
    buffers: HashMap<BufferId, StoredBuffer>,
    token: Option<String>,
    reachable: bool,
    latency: Duration,
    requests: u64,
}

/// Authoritative buffer registry implementing [`Transport`]
#[derive(Debug)]
pub struct LocalAuthority {
    state: Mutex<AuthorityState>,
}

impl Default for LocalAuthority {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalAuthority {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(AuthorityState {
                buffers: HashMap::new(),
                token: None,
                reachable: true,
                latency: Duration::ZERO,
                requests: 0,
            }),
        }
    }

    /// Require this token on every update
    pub fn with_token(self, token: impl Into<String>) -> Self {
        self.lock().token = Some(token.into());
        self
    }

    /// Delay every response by `latency`
    pub fn with_latency(self, latency: Duration) -> Self {
        self.lock().latency = latency;
        self
    }

    /// Register a buffer and return its initial version token
    pub fn register(&self, buffer_id: impl Into<BufferId>, content: impl Into<String>) -> String {
        let buffer_hash = next_hash();
        self.lock().buffers.insert(
            buffer_id.into(),
            StoredBuffer {
                content: content.into(),
                buffer_hash: buffer_hash.clone(),
            },
        );
        buffer_hash
    }

    /// Current authoritative content
    pub fn content(&self, buffer_id: impl Into<BufferId>) -> Option<String> {
        self.lock()
            .buffers
            .get(&buffer_id.into())
            .map(|b| b.content.clone())
    }

    /// Current version token
    pub fn buffer_hash(&self, buffer_id: impl Into<BufferId>) -> Option<String> {
        self.lock()
            .buffers
            .get(&buffer_id.into())
            .map(|b| b.buffer_hash.clone())
    }

    /// Simulate the endpoint going away (or coming back)
    pub fn set_reachable(&self, reachable: bool) {
        self.lock().reachable = reachable;
    }

    /// Number of update requests received, including failed ones
    pub fn request_count(&self) -> u64 {
        self.lock().requests
    }

    /// Apply an update
    ///
    /// Accepts only when the claimed hash matches the current version, then
    /// stores the content under a fresh version token.
    pub fn apply(&self, request: &UpdateRequest) -> UpdateResponse {
        let mut state = self.lock();

        if let Some(ref token) = state.token {
            if token != &request.token {
                return UpdateResponse::rejected("invalid token");
            }
        }

        let Some(stored) = state.buffers.get_mut(&request.buffer_id) else {
            return UpdateResponse::rejected(format!("unknown buffer '{}'", request.buffer_id));
        };

        if stored.buffer_hash != request.buffer_hash {
            debug!(
                "Rejecting update for buffer {}: claimed {}, current {}",
                request.buffer_id, request.buffer_hash, stored.buffer_hash
            );
            return UpdateResponse::rejected(STALE_VERSION);
        }

        stored.content = request.content.clone();
        stored.buffer_hash = next_hash();
        UpdateResponse::accepted(stored.buffer_hash.clone())
    }

    fn lock(&self) -> MutexGuard<'_, AuthorityState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Transport for LocalAuthority {
    async fn send_update(
        &self,
        _update_url: &str,
        request: &UpdateRequest,
    ) -> Result<UpdateResponse, TransportError> {
        let (reachable, latency) = {
            let mut state = self.lock();
            state.requests += 1;
            (state.reachable, state.latency)
        };

        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        if !reachable {
            return Err(TransportError::Unreachable(
                "local authority is offline".to_string(),
            ));
        }

        Ok(self.apply(request))
    }
}

fn next_hash() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
