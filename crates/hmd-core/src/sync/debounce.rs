//! Trailing-edge debounce scheduler
//!
//! Turns a dense stream of change notifications into a single flush once the
//! stream has been quiet for the configured period. The scheduler owns one
//! deadline; every `notify()` pushes it out, `cancel()` clears it, and
//! [`Debouncer::expired`] resolves when it passes.

use std::time::Duration;

use tokio::time::Instant;

/// Single-deadline debounce timer
#[derive(Debug)]
pub struct Debouncer {
    quiet_period: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            deadline: None,
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Restart the quiet period from now, replacing any armed deadline
    pub fn notify(&mut self) {
        self.deadline = Some(Instant::now() + self.quiet_period);
    }

    /// Disarm without firing
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Wait for the armed deadline, then disarm
    ///
    /// Pends forever while unarmed. Safe to use as a `tokio::select!` branch:
    /// if another branch wins, the deadline stays armed.
    pub async fn expired(&mut self) {
        match self.deadline {
            Some(deadline) => {
                tokio::time::sleep_until(deadline).await;
                self.deadline = None;
            }
            None => std::future::pending::<()>().await,
        }
    }
}
