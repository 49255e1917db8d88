//! Buffer synchronization engine
//!
//! Keeps a locally edited buffer coherent with the authoritative copy held
//! by a server.
//!
//! ## Protocol
//!
//! 1. Edits re-arm a trailing-edge debounce timer
//! 2. When the quiet period elapses, the full content is POSTed to
//!    `{apiEndpoint}/update` together with the last-known `bufferHash`
//! 3. The server answers with a new `bufferHash` (accepted) or an `error`
//!    (stale version or other rejection)
//! 4. Only an accepted update advances the local `bufferHash`
//!
//! ## Usage
//!
//! ```ignore
//! let client = SyncClient::new(params, editor, Arc::new(transport), reporter);
//! let session = client.spawn();
//! session.content_changed();
//! let buffer = session.shutdown().await?;
//! ```

mod authority;
mod client;
mod debounce;
mod message;
mod state;
mod transport;

pub use authority::{LocalAuthority, STALE_VERSION};
pub use client::{ChangeNotifier, SessionHandle, SyncClient, SyncEvent};
pub use debounce::Debouncer;
pub use message::{UpdateRequest, UpdateResponse};
pub use state::{Resolution, SyncAttempt, SyncMachine, SyncStatus};
pub use transport::{HttpTransport, Transport};
