//! Status reporting sinks
//!
//! The sync client reports three things: the buffer has unsaved edits, the
//! buffer is saved, and an attempt failed. A [`Reporter`] turns those into
//! whatever the host shows the user.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{info, warn};

use crate::error::SyncError;

/// Marker prefixed to the title while edits are unsaved
pub const UNSAVED_MARKER: &str = "* ";

/// User-visible sink for sync outcomes
///
/// `report_error` is blocking: the session does not process further events
/// until it returns, so a host may wait for the user to acknowledge.
pub trait Reporter: Send + 'static {
    fn mark_unsaved(&mut self);
    fn mark_saved(&mut self);
    fn report_error(&mut self, error: &SyncError);
}

impl<R: Reporter + ?Sized> Reporter for Box<R> {
    fn mark_unsaved(&mut self) {
        (**self).mark_unsaved();
    }

    fn mark_saved(&mut self) {
        (**self).mark_saved();
    }

    fn report_error(&mut self, error: &SyncError) {
        (**self).report_error(error);
    }
}

/// Forwards `mark_unsaved` at most once per unsaved period
#[derive(Debug)]
pub struct ReporterGate<R> {
    inner: R,
    unsaved: bool,
}

impl<R: Reporter> ReporterGate<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            unsaved: false,
        }
    }

    pub fn is_unsaved(&self) -> bool {
        self.unsaved
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Reporter> Reporter for ReporterGate<R> {
    fn mark_unsaved(&mut self) {
        if !self.unsaved {
            self.unsaved = true;
            self.inner.mark_unsaved();
        }
    }

    fn mark_saved(&mut self) {
        self.unsaved = false;
        self.inner.mark_saved();
    }

    fn report_error(&mut self, error: &SyncError) {
        self.inner.report_error(error);
    }
}

/// Logs outcomes through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn mark_unsaved(&mut self) {
        info!("Buffer has unsaved changes");
    }

    fn mark_saved(&mut self) {
        info!("Buffer saved");
    }

    fn report_error(&mut self, error: &SyncError) {
        warn!("Sync failed: {}", error);
    }
}

#[derive(Debug, Default)]
struct TitleState {
    base: String,
    unsaved: bool,
    last_error: Option<String>,
}

/// Renders a document title carrying an unsaved marker
///
/// Clones share state, so the host keeps a clone to read the title while the
/// session owns another.
#[derive(Debug, Clone, Default)]
pub struct TitleReporter {
    state: Arc<Mutex<TitleState>>,
}

impl TitleReporter {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            state: Arc::new(Mutex::new(TitleState {
                base: base.into(),
                ..Default::default()
            })),
        }
    }

    /// Title derived from the editor page location
    pub fn for_location(location: &str) -> Self {
        Self::new(page_title(location))
    }

    pub fn title(&self) -> String {
        let state = self.lock();
        if state.unsaved {
            format!("{}{}", UNSAVED_MARKER, state.base)
        } else {
            state.base.clone()
        }
    }

    pub fn is_unsaved(&self) -> bool {
        self.lock().unsaved
    }

    /// Message of the most recent failure, if any
    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    fn lock(&self) -> MutexGuard<'_, TitleState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Reporter for TitleReporter {
    fn mark_unsaved(&mut self) {
        self.lock().unsaved = true;
    }

    fn mark_saved(&mut self) {
        let mut state = self.lock();
        state.unsaved = false;
        state.last_error = None;
    }

    fn report_error(&mut self, error: &SyncError) {
        self.lock().last_error = Some(error.to_string());
    }
}

/// Percent-decoded last path segment of a page location
///
/// `app://app/edit/home/me/My%20Notes.md` becomes `My Notes.md`. Segments
/// that don't decode to UTF-8 are returned as-is.
pub fn page_title(location: &str) -> String {
    let segment = location.rsplit('/').next().unwrap_or(location);
    match urlencoding::decode(segment) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => segment.to_string(),
    }
}
