//! Terminal status reporter
//!
//! Prints the buffer title with its unsaved marker whenever the save state
//! changes, and failures as prominent notices on stderr.

use hmd_core::reporter::page_title;
use hmd_core::{Reporter, SyncError, TitleReporter};

use crate::output::Output;

pub struct TerminalReporter {
    output: Output,
    title: TitleReporter,
}

impl TerminalReporter {
    /// Reporter titled after the last segment of `location`
    pub fn new(output: Output, location: &str) -> Self {
        Self {
            output,
            title: TitleReporter::new(page_title(location)),
        }
    }

    pub fn title(&self) -> String {
        self.title.title()
    }
}

impl Reporter for TerminalReporter {
    fn mark_unsaved(&mut self) {
        self.title.mark_unsaved();
        self.output.message(&format!("{} (unsaved)", self.title.title()));
    }

    fn mark_saved(&mut self) {
        self.title.mark_saved();
        self.output.success(&format!("{} saved", self.title.title()));
    }

    fn report_error(&mut self, error: &SyncError) {
        self.title.report_error(error);
        let hint = if error.is_rejection() {
            "the server copy changed; local edits are kept, reload to resolve"
        } else {
            "not saved; the next edit will retry"
        };
        self.output
            .error(&format!("{}: {} ({})", self.title.title(), error, hint));
    }
}
