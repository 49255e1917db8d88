//! Sync state machine
//!
//! [`SyncMachine`] is the runtime-free core of a session. It decides when a
//! flush may send a request, records edits that arrive while a request is in
//! flight, and applies responses to the buffer. The session loop drives it;
//! tests can drive it directly.

use crate::buffer::Buffer;
use crate::error::SyncError;

use super::message::UpdateRequest;

/// Where the session is in the edit/flush cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// Nothing to send
    Idle,
    /// Edits are waiting for the quiet period to elapse
    ChangePending,
    /// An update request is awaiting its response
    InFlight,
}

/// One update request, captured when it was sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncAttempt {
    content_snapshot: String,
    claimed_hash: String,
}

impl SyncAttempt {
    pub fn content_snapshot(&self) -> &str {
        &self.content_snapshot
    }

    /// The version this attempt claims the server still holds
    pub fn claimed_hash(&self) -> &str {
        &self.claimed_hash
    }

    /// Build the request body for this attempt
    pub fn to_request(&self, buffer: &Buffer) -> UpdateRequest {
        UpdateRequest {
            content: self.content_snapshot.clone(),
            buffer_id: buffer.buffer_id().clone(),
            buffer_hash: self.claimed_hash.clone(),
            token: buffer.auth_token().to_string(),
        }
    }
}

/// What the session has to do after an attempt resolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Resolution {
    /// A flush was deferred during the attempt; re-arm the scheduler
    pub rearm: bool,
    /// The buffer is fully saved; clear the unsaved indicator
    pub saved: bool,
}

/// Tri-state sync machine owning the session's buffer
#[derive(Debug)]
pub struct SyncMachine {
    buffer: Buffer,
    status: SyncStatus,
    /// A flush fired while in flight
    flush_deferred: bool,
    /// An edit arrived while in flight
    changed_in_flight: bool,
}

impl SyncMachine {
    pub fn new(buffer: Buffer) -> Self {
        Self {
            buffer,
            status: SyncStatus::Idle,
            flush_deferred: false,
            changed_in_flight: false,
        }
    }

    pub fn status(&self) -> SyncStatus {
        self.status
    }

    pub fn is_in_flight(&self) -> bool {
        self.status == SyncStatus::InFlight
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn into_buffer(self) -> Buffer {
        self.buffer
    }

    /// Record an edit
    pub fn change_observed(&mut self) {
        match self.status {
            SyncStatus::InFlight => self.changed_in_flight = true,
            SyncStatus::Idle | SyncStatus::ChangePending => {
                self.status = SyncStatus::ChangePending;
            }
        }
    }

    /// Handle a flush trigger
    ///
    /// Returns the attempt to send, or `None` when an attempt is already in
    /// flight. In that case the flush is remembered and reported back through
    /// [`Resolution::rearm`]. `snapshot` is only called when a request will
    /// actually be sent, so the content is read at send time.
    pub fn begin_flush<F>(&mut self, snapshot: F) -> Option<SyncAttempt>
    where
        F: FnOnce() -> String,
    {
        if self.is_in_flight() {
            self.flush_deferred = true;
            return None;
        }

        let attempt = SyncAttempt {
            content_snapshot: snapshot(),
            claimed_hash: self.buffer.buffer_hash().to_string(),
        };
        self.status = SyncStatus::InFlight;
        Some(attempt)
    }

    /// Apply the outcome of the in-flight attempt
    ///
    /// Only a successful outcome touches the buffer hash, and only with the
    /// value the server returned.
    pub fn resolve(&mut self, outcome: &Result<String, SyncError>) -> Resolution {
        if !self.is_in_flight() {
            return Resolution::default();
        }

        if let Ok(buffer_hash) = outcome {
            self.buffer.adopt_hash(buffer_hash.clone());
        }

        let pending = self.changed_in_flight || self.flush_deferred;
        let resolution = Resolution {
            rearm: self.flush_deferred,
            saved: outcome.is_ok() && !pending,
        };

        self.status = if pending {
            SyncStatus::ChangePending
        } else {
            SyncStatus::Idle
        };
        self.flush_deferred = false;
        self.changed_in_flight = false;

        resolution
    }
}
