//! Editor adapter seam
//!
//! The editing surface is opaque to the sync engine. It only has to answer
//! "what is the content right now"; change notifications travel the other
//! way, through the [`ChangeNotifier`](crate::sync::ChangeNotifier) a session
//! hands out.

use std::sync::{Arc, RwLock};

/// Content query exposed by an editing surface
pub trait Editor: Send + Sync + 'static {
    /// Current full content of the buffer
    fn content(&self) -> String;
}

/// In-memory editor surface
///
/// Cloning shares the same text, so a host can keep one handle for editing
/// while the session holds another.
#[derive(Debug, Clone, Default)]
pub struct MemoryEditor {
    text: Arc<RwLock<String>>,
}

impl MemoryEditor {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            text: Arc::new(RwLock::new(initial.into())),
        }
    }

    /// Replace the whole content
    pub fn set_content(&self, content: impl Into<String>) {
        *self.text.write().unwrap_or_else(|e| e.into_inner()) = content.into();
    }

    /// Append text at the end, like typing
    pub fn type_text(&self, text: &str) {
        self.text
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push_str(text);
    }
}

impl Editor for MemoryEditor {
    fn content(&self) -> String {
        self.text.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}
