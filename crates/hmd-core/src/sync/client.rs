//! Sync client implementation
//!
//! Owns one editing session: the buffer, the sync state machine, the debounce
//! scheduler and the reporter. A spawned session runs a single event loop
//! that multiplexes edits, the debounce deadline and request completions, so
//! every state transition happens on one task and at most one update request
//! is ever in flight.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, warn};

use super::debounce::Debouncer;
use super::message::UpdateRequest;
use super::state::{SyncMachine, SyncStatus};
use super::transport::Transport;
use crate::buffer::{Buffer, SessionParams};
use crate::config::DEFAULT_QUIET_PERIOD_MS;
use crate::editor::Editor;
use crate::error::SyncError;
use crate::reporter::{Reporter, ReporterGate};

/// Events emitted by the sync client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// Sync status changed
    StatusChanged(SyncStatus),
    /// An update request was sent claiming this version
    RequestSent { claimed_hash: String },
    /// The server accepted an update
    Saved { buffer_hash: String },
    /// An attempt failed (rejection or transport)
    Failed(String),
}

/// Commands sent from handles to the session loop
#[derive(Debug)]
enum Command {
    Changed,
    FlushNow,
    Shutdown,
}

type Outcome = Result<String, SyncError>;

/// Sync client for one buffer
pub struct SyncClient {
    machine: SyncMachine,
    editor: Arc<dyn Editor>,
    transport: Arc<dyn Transport>,
    reporter: ReporterGate<Box<dyn Reporter>>,
    quiet_period: Duration,
    /// Current sync status
    status: watch::Sender<SyncStatus>,
    /// Status receiver for external monitoring
    status_rx: watch::Receiver<SyncStatus>,
    event_tx: mpsc::UnboundedSender<SyncEvent>,
    event_rx: Option<mpsc::UnboundedReceiver<SyncEvent>>,
}

impl SyncClient {
    /// Create a client for the buffer described by `params`
    pub fn new(
        params: SessionParams,
        editor: Arc<dyn Editor>,
        transport: Arc<dyn Transport>,
        reporter: impl Reporter,
    ) -> Self {
        let (status_tx, status_rx) = watch::channel(SyncStatus::Idle);
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        Self {
            machine: SyncMachine::new(params.into_buffer()),
            editor,
            transport,
            reporter: ReporterGate::new(Box::new(reporter)),
            quiet_period: Duration::from_millis(DEFAULT_QUIET_PERIOD_MS),
            status: status_tx,
            status_rx,
            event_tx,
            event_rx: Some(event_rx),
        }
    }

    /// Set the debounce quiet period
    pub fn with_quiet_period(mut self, quiet_period: Duration) -> Self {
        self.quiet_period = quiet_period;
        self
    }

    /// Get the current status
    pub fn status(&self) -> SyncStatus {
        *self.status_rx.borrow()
    }

    /// Subscribe to status changes
    pub fn subscribe_status(&self) -> watch::Receiver<SyncStatus> {
        self.status_rx.clone()
    }

    /// Take the event receiver (can only be called once)
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<SyncEvent>> {
        self.event_rx.take()
    }

    pub fn buffer(&self) -> &Buffer {
        self.machine.buffer()
    }

    /// Send the current content immediately, bypassing the scheduler
    ///
    /// Returns the new version token on success. The outcome is also
    /// reported and emitted like a scheduled flush.
    pub async fn sync_once(&mut self) -> Result<String, SyncError> {
        let editor = &self.editor;
        let Some(attempt) = self.machine.begin_flush(|| editor.content()) else {
            return Err(SyncError::Busy);
        };
        self.set_status(self.machine.status());

        let request = attempt.to_request(self.machine.buffer());
        let update_url = self.machine.buffer().update_url();
        self.emit(SyncEvent::RequestSent {
            claimed_hash: attempt.claimed_hash().to_string(),
        });

        let outcome = send_attempt(self.transport.as_ref(), &update_url, &request).await;
        self.finish(&outcome);
        outcome
    }

    /// Run the session loop on a background task
    pub fn spawn(self) -> SessionHandle {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let status_rx = self.status_rx.clone();
        let task = tokio::spawn(self.run(command_rx));

        SessionHandle {
            command_tx,
            status_rx,
            task,
        }
    }

    async fn run(mut self, mut command_rx: mpsc::UnboundedReceiver<Command>) -> Buffer {
        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Outcome>();
        let mut debouncer = Debouncer::new(self.quiet_period);
        let mut closing = false;

        info!(
            "Sync session started for buffer {} (quiet period {:?})",
            self.machine.buffer().buffer_id(),
            self.quiet_period
        );

        loop {
            tokio::select! {
                command = command_rx.recv(), if !closing => match command {
                    Some(Command::Changed) => {
                        self.on_change();
                        debouncer.notify();
                    }
                    Some(Command::FlushNow) => {
                        debouncer.cancel();
                        self.flush(&done_tx);
                    }
                    Some(Command::Shutdown) | None => {
                        debug!("Sync session closing");
                        debouncer.cancel();
                        closing = true;
                    }
                },
                _ = debouncer.expired() => {
                    self.flush(&done_tx);
                }
                Some(outcome) = done_rx.recv() => {
                    let rearm = self.finish(&outcome);
                    if rearm && !closing {
                        debouncer.notify();
                    }
                }
            }

            // In-flight requests are never abandoned
            if closing && !self.machine.is_in_flight() {
                break;
            }
        }

        info!(
            "Sync session ended for buffer {}, hash={}",
            self.machine.buffer().buffer_id(),
            self.machine.buffer().buffer_hash()
        );
        self.machine.into_buffer()
    }

    fn on_change(&mut self) {
        self.machine.change_observed();
        self.reporter.mark_unsaved();
        self.set_status(self.machine.status());
    }

    /// Start an attempt unless one is already in flight
    fn flush(&mut self, done_tx: &mpsc::UnboundedSender<Outcome>) {
        let editor = &self.editor;
        let Some(attempt) = self.machine.begin_flush(|| editor.content()) else {
            debug!("Flush deferred until the in-flight attempt resolves");
            return;
        };
        self.set_status(self.machine.status());

        let request = attempt.to_request(self.machine.buffer());
        let update_url = self.machine.buffer().update_url();
        debug!(
            "Sending update for buffer {} claiming {:?} ({} bytes)",
            request.buffer_id,
            request.buffer_hash,
            request.content.len()
        );
        self.emit(SyncEvent::RequestSent {
            claimed_hash: attempt.claimed_hash().to_string(),
        });

        let transport = Arc::clone(&self.transport);
        let done_tx = done_tx.clone();
        tokio::spawn(async move {
            let outcome = send_attempt(transport.as_ref(), &update_url, &request).await;
            let _ = done_tx.send(outcome);
        });
    }

    /// Apply an outcome; returns whether the scheduler must be re-armed
    fn finish(&mut self, outcome: &Outcome) -> bool {
        let resolution = self.machine.resolve(outcome);

        match outcome {
            Ok(buffer_hash) => {
                info!(
                    "Buffer {} saved, hash={}",
                    self.machine.buffer().buffer_id(),
                    buffer_hash
                );
                if resolution.saved {
                    self.reporter.mark_saved();
                }
                self.emit(SyncEvent::Saved {
                    buffer_hash: buffer_hash.clone(),
                });
            }
            Err(e) => {
                warn!(
                    "Sync of buffer {} failed: {}",
                    self.machine.buffer().buffer_id(),
                    e
                );
                self.reporter.report_error(e);
                self.emit(SyncEvent::Failed(e.to_string()));
            }
        }

        self.set_status(self.machine.status());
        resolution.rearm
    }

    fn set_status(&self, status: SyncStatus) {
        let changed = self.status.send_if_modified(|current| {
            if *current == status {
                false
            } else {
                *current = status;
                true
            }
        });
        if changed {
            self.emit(SyncEvent::StatusChanged(status));
        }
    }

    fn emit(&self, event: SyncEvent) {
        let _ = self.event_tx.send(event);
    }
}

async fn send_attempt(
    transport: &dyn Transport,
    update_url: &str,
    request: &UpdateRequest,
) -> Result<String, SyncError> {
    let response = transport.send_update(update_url, request).await?;
    response.into_result()
}

/// Handle for controlling a running session
pub struct SessionHandle {
    command_tx: mpsc::UnboundedSender<Command>,
    status_rx: watch::Receiver<SyncStatus>,
    task: JoinHandle<Buffer>,
}

impl SessionHandle {
    /// Report an edit to the session
    pub fn content_changed(&self) {
        let _ = self.command_tx.send(Command::Changed);
    }

    /// Flush now instead of waiting for the quiet period
    ///
    /// Still deferred if an attempt is in flight.
    pub fn flush_now(&self) {
        let _ = self.command_tx.send(Command::FlushNow);
    }

    /// Cloneable change notifier for editor adapters
    pub fn notifier(&self) -> ChangeNotifier {
        ChangeNotifier {
            command_tx: self.command_tx.clone(),
        }
    }

    pub fn status(&self) -> SyncStatus {
        *self.status_rx.borrow()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<SyncStatus> {
        self.status_rx.clone()
    }

    /// Stop the session and return the final buffer state
    ///
    /// Pending (not yet flushed) edits are not sent. An in-flight request is
    /// allowed to resolve first.
    pub async fn shutdown(self) -> Result<Buffer, JoinError> {
        let _ = self.command_tx.send(Command::Shutdown);
        self.task.await
    }
}

/// Sends change notifications into a session
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    command_tx: mpsc::UnboundedSender<Command>,
}

impl ChangeNotifier {
    /// Returns false once the session has ended
    pub fn notify(&self) -> bool {
        self.command_tx.send(Command::Changed).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::MemoryEditor;
    use crate::reporter::TracingReporter;
    use crate::sync::authority::LocalAuthority;

    fn client(authority: Arc<LocalAuthority>, hash: &str) -> SyncClient {
        SyncClient::new(
            SessionParams::new("doc").with_hash(hash),
            Arc::new(MemoryEditor::new("hello")),
            authority,
            TracingReporter,
        )
    }

    #[test]
    fn test_sync_client_new() {
        let authority = Arc::new(LocalAuthority::new());
        let client = client(authority, "h0");

        assert_eq!(client.status(), SyncStatus::Idle);
        assert_eq!(client.buffer().buffer_id(), "doc");
        assert_eq!(client.buffer().buffer_hash(), "h0");
    }

    #[test]
    fn test_take_events_once() {
        let authority = Arc::new(LocalAuthority::new());
        let mut client = client(authority, "h0");

        assert!(client.take_events().is_some());
        assert!(client.take_events().is_none());
    }

    #[tokio::test]
    async fn test_sync_once_success() {
        let authority = Arc::new(LocalAuthority::new());
        let h0 = authority.register("doc", "");
        let mut client = client(authority.clone(), &h0);
        let mut events = client.take_events().unwrap();

        let h1 = client.sync_once().await.unwrap();

        assert_eq!(client.buffer().buffer_hash(), h1);
        assert_eq!(authority.content("doc").as_deref(), Some("hello"));
        assert_eq!(client.status(), SyncStatus::Idle);

        assert_eq!(
            events.recv().await,
            Some(SyncEvent::StatusChanged(SyncStatus::InFlight))
        );
        assert_eq!(
            events.recv().await,
            Some(SyncEvent::RequestSent { claimed_hash: h0 })
        );
        assert_eq!(
            events.recv().await,
            Some(SyncEvent::Saved { buffer_hash: h1 })
        );
    }

    #[tokio::test]
    async fn test_sync_once_stale_hash() {
        let authority = Arc::new(LocalAuthority::new());
        authority.register("doc", "server text");
        let mut client = client(authority.clone(), "old");

        let err = client.sync_once().await.unwrap_err();

        assert!(err.is_rejection());
        assert_eq!(client.buffer().buffer_hash(), "old");
        assert_eq!(authority.content("doc").as_deref(), Some("server text"));
    }
}
