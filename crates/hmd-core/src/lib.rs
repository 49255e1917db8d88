//! hmd-core
//!
//! Synchronization engine for HyperMD editing sessions: keeps a locally
//! edited text buffer coherent with the authoritative copy on a server while
//! coalescing keystroke-rate edits into sparse update requests.
//!
//! # Architecture
//!
//! - **Debouncer**: trailing-edge quiet-period timer
//! - **SyncMachine**: `Idle` / `ChangePending` / `InFlight` state machine
//!   guaranteeing a single in-flight request
//! - **SyncClient**: session event loop and update protocol
//! - **Reporter**: user-visible sink for saved / unsaved / error
//!
//! Conflicts are detected with optimistic concurrency: every update claims
//! the version token (`bufferHash`) it was based on, and the server rejects
//! updates whose claim is stale. Conflicts are reported, never merged.
//!
//! # Modules
//!
//! - `sync`: session, state machine, scheduler, transports
//! - `buffer`: buffer identity and session parameters
//! - `editor`: editor adapter seam
//! - `reporter`: status reporting sinks
//! - `config`: application configuration
//! - `error`: sync error types

pub mod buffer;
pub mod config;
pub mod editor;
pub mod error;
pub mod reporter;
pub mod sync;

pub use buffer::{Buffer, BufferId, SessionParams};
pub use config::Config;
pub use editor::{Editor, MemoryEditor};
pub use error::{SyncError, SyncResult, TransportError};
pub use reporter::{Reporter, ReporterGate, TitleReporter, TracingReporter};
pub use sync::{SessionHandle, SyncClient, SyncEvent, SyncStatus};
