//! File-backed editor surface
//!
//! The CLI treats a file on disk as the editing surface: whatever editor the
//! user runs writes to it, and a filesystem watcher turns content changes
//! into change notifications for the sync session.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use hmd_core::sync::ChangeNotifier;
use hmd_core::Editor;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Editor adapter reading buffer content from a file
///
/// Blank file content is never reported as a change. Editors that truncate
/// before rewriting would otherwise push an empty buffer over the server copy.
#[derive(Debug)]
pub struct FileEditor {
    path: PathBuf,
    /// Last non-blank content seen by a change check
    last_seen: Mutex<String>,
}

impl FileEditor {
    /// Open a file; it must exist and be valid UTF-8
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read buffer file: {:?}", path))?;

        Ok(Self {
            path,
            last_seen: Mutex::new(content),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the file; true when the content changed since the last check
    ///
    /// Read errors (e.g. an editor replacing the file) and blank content
    /// count as no change.
    pub fn refresh(&self) -> bool {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                debug!("Skipping change check for {:?}: {}", self.path, e);
                return false;
            }
        };

        if is_blank(&content) {
            debug!("Ignoring blank content in {:?}", self.path);
            return false;
        }

        let mut last_seen = self.last_seen();
        if *last_seen == content {
            return false;
        }
        *last_seen = content;
        true
    }

    fn last_seen(&self) -> MutexGuard<'_, String> {
        self.last_seen.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Editor for FileEditor {
    fn content(&self) -> String {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if !is_blank(&content) => content,
            Ok(_) => {
                debug!("{:?} is blank, sending last known content", self.path);
                self.last_seen().clone()
            }
            Err(e) => {
                warn!(
                    "Failed to read {:?}, sending last known content: {}",
                    self.path, e
                );
                self.last_seen().clone()
            }
        }
    }
}

fn is_blank(content: &str) -> bool {
    content.trim().is_empty()
}

/// Watches a buffer file and notifies the session on every content change
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    task: JoinHandle<()>,
}

impl FileWatcher {
    /// Start watching `editor`'s file
    ///
    /// The parent directory is watched so that editors saving through a
    /// rename are still seen. Forwarding ends when the session stops
    /// accepting notifications or the watcher is stopped.
    pub fn spawn(editor: Arc<FileEditor>, notifier: ChangeNotifier) -> Result<Self> {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let mut watcher = RecommendedWatcher::new(
            move |result: notify::Result<Event>| {
                let _ = events_tx.send(result);
            },
            Config::default(),
        )
        .context("Failed to create file watcher")?;

        let dir = watch_dir(editor.path());
        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch {:?}", dir))?;

        let task = tokio::spawn(forward_changes(editor, notifier, events_rx));

        Ok(Self {
            _watcher: watcher,
            task,
        })
    }

    pub fn stop(self) {
        self.task.abort();
    }
}

async fn forward_changes(
    editor: Arc<FileEditor>,
    notifier: ChangeNotifier,
    mut events_rx: mpsc::UnboundedReceiver<notify::Result<Event>>,
) {
    let file_name = editor.path().file_name().map(OsString::from);

    while let Some(result) = events_rx.recv().await {
        let event = match result {
            Ok(event) => event,
            Err(e) => {
                warn!("Watch error: {:?}", e);
                continue;
            }
        };

        if !is_relevant(&event, file_name.as_deref()) {
            continue;
        }

        // Duplicate and metadata-only events leave the content unchanged
        if editor.refresh() {
            debug!("Change detected in {:?}", editor.path());
            if !notifier.notify() {
                break;
            }
        }
    }
}

/// Content-affecting event touching the watched file
fn is_relevant(event: &Event, file_name: Option<&std::ffi::OsStr>) -> bool {
    match event.kind {
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {
            event.paths.iter().any(|p| p.file_name() == file_name)
        }
        _ => false,
    }
}

fn watch_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hmd_core::sync::{LocalAuthority, SyncClient};
    use hmd_core::{SessionParams, TracingReporter};
    use notify::event::{AccessKind, CreateKind, ModifyKind};
    use std::time::Duration;
    use tempfile::TempDir;

    async fn wait_for(authority: &LocalAuthority, expected: &str) {
        for _ in 0..300 {
            if authority.content("doc").as_deref() == Some(expected) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[test]
    fn test_open_missing_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let result = FileEditor::open(temp_dir.path().join("missing.md"));
        assert!(result.is_err());
    }

    #[test]
    fn test_refresh_detects_changes() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("notes.md");
        std::fs::write(&path, "# Notes\n").unwrap();

        let editor = FileEditor::open(&path).unwrap();
        assert!(!editor.refresh());

        std::fs::write(&path, "# Notes\n\nmore").unwrap();
        assert!(editor.refresh());
        assert!(!editor.refresh());
        assert_eq!(editor.content(), "# Notes\n\nmore");
    }

    #[test]
    fn test_content_falls_back_when_file_disappears() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("notes.md");
        std::fs::write(&path, "kept").unwrap();

        let editor = FileEditor::open(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(editor.content(), "kept");
        assert!(!editor.refresh());
    }

    #[test]
    fn test_truncated_file_is_not_a_change() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("notes.md");
        std::fs::write(&path, "important notes").unwrap();

        let editor = FileEditor::open(&path).unwrap();
        std::fs::write(&path, "").unwrap();
        assert!(!editor.refresh());
        assert_eq!(editor.content(), "important notes");

        std::fs::write(&path, "  \n\t").unwrap();
        assert!(!editor.refresh());
        assert_eq!(editor.content(), "important notes");

        // The rewrite that follows the truncation is picked up
        std::fs::write(&path, "important notes, edited").unwrap();
        assert!(editor.refresh());
        assert_eq!(editor.content(), "important notes, edited");
    }

    #[test]
    fn test_is_relevant_filters_kind_and_file() {
        let name = std::ffi::OsStr::new("notes.md");

        let modify = Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("/tmp/x/notes.md"));
        assert!(is_relevant(&modify, Some(name)));

        let create = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/tmp/x/notes.md"));
        assert!(is_relevant(&create, Some(name)));

        let other_file = Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("/tmp/x/other.md"));
        assert!(!is_relevant(&other_file, Some(name)));

        let access = Event::new(EventKind::Access(AccessKind::Any))
            .add_path(PathBuf::from("/tmp/x/notes.md"));
        assert!(!is_relevant(&access, Some(name)));
    }

    #[test]
    fn test_watch_dir() {
        assert_eq!(watch_dir(Path::new("/tmp/x/notes.md")), PathBuf::from("/tmp/x"));
        assert_eq!(watch_dir(Path::new("notes.md")), PathBuf::from("."));
    }

    #[tokio::test]
    async fn test_watcher_feeds_session() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("notes.md");
        std::fs::write(&path, "v1").unwrap();

        let authority = Arc::new(LocalAuthority::new());
        let h0 = authority.register("doc", "v1");
        let editor = Arc::new(FileEditor::open(&path).unwrap());
        let session = SyncClient::new(
            SessionParams::new("doc").with_hash(h0),
            editor.clone(),
            authority.clone(),
            TracingReporter,
        )
        .with_quiet_period(Duration::from_millis(20))
        .spawn();
        let watcher = FileWatcher::spawn(editor, session.notifier()).unwrap();

        std::fs::write(&path, "v2").unwrap();
        wait_for(&authority, "v2").await;
        assert_eq!(authority.content("doc").as_deref(), Some("v2"));

        watcher.stop();
        let buffer = session.shutdown().await.unwrap();
        assert_eq!(buffer.buffer_hash(), authority.buffer_hash("doc").unwrap());
    }

    #[tokio::test]
    async fn test_truncation_does_not_overwrite_server_copy() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("notes.md");
        std::fs::write(&path, "important notes").unwrap();

        let authority = Arc::new(LocalAuthority::new());
        let h0 = authority.register("doc", "important notes");
        let editor = Arc::new(FileEditor::open(&path).unwrap());
        let session = SyncClient::new(
            SessionParams::new("doc").with_hash(h0),
            editor.clone(),
            authority.clone(),
            TracingReporter,
        )
        .with_quiet_period(Duration::from_millis(20))
        .spawn();
        let watcher = FileWatcher::spawn(editor, session.notifier()).unwrap();

        std::fs::write(&path, "").unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(authority.content("doc").as_deref(), Some("important notes"));
        assert_eq!(authority.request_count(), 0);

        std::fs::write(&path, "important notes, edited").unwrap();
        wait_for(&authority, "important notes, edited").await;
        assert_eq!(
            authority.content("doc").as_deref(),
            Some("important notes, edited")
        );

        watcher.stop();
        session.shutdown().await.unwrap();
    }
}
