//! Scoped capture of console output into a reply channel.
//!
//! A command that shells out to the console can wrap the call in
//! [`PrintRedirection::redirect`]; while the guard lives, every
//! console-print hook appends to an internal buffer, and dropping the guard
//! flushes the buffer as one reply to the destination. The flush happens on
//! every exit path, including unwinds, because it rides on `Drop`.
//!
//! Only one redirection is active at a time; installing a new destination
//! replaces the previous one for the duration of its scope.

use crate::types::ReplyTarget;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Default)]
struct RedirectState {
    target: Option<ReplyTarget>,
    buffer: String,
}

/// Holds the active redirection destination and its accumulated buffer.
#[derive(Default)]
pub struct PrintRedirection {
    state: Mutex<RedirectState>,
}

impl PrintRedirection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `target` as the redirection destination and returns the
    /// guard that flushes on drop. The last-installed destination wins.
    pub fn redirect(self: &Arc<Self>, target: ReplyTarget) -> RedirectGuard {
        self.state.lock().target = Some(Arc::clone(&target));
        RedirectGuard {
            redirection: Arc::clone(self),
            target,
        }
    }

    /// Appends console text to the buffer when a redirection is active.
    pub fn capture(&self, text: &str) {
        let mut state = self.state.lock();
        if state.target.is_some() {
            state.buffer.push_str(text);
        }
    }

    pub fn is_active(&self) -> bool {
        self.state.lock().target.is_some()
    }

    fn flush_and_clear(&self) -> String {
        let mut state = self.state.lock();
        state.target = None;
        std::mem::take(&mut state.buffer)
    }
}

/// Scope guard for an active redirection. Dropping it replies with the
/// captured buffer and deactivates the redirection.
pub struct RedirectGuard {
    redirection: Arc<PrintRedirection>,
    target: ReplyTarget,
}

impl Drop for RedirectGuard {
    fn drop(&mut self) {
        let buffer = self.redirection.flush_and_clear();
        self.target.reply(&buffer);
    }
}
