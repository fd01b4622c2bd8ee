//! Signal to the surrounding shell that leaving now would lose edits.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Receives navigation-block changes from an editing session.
pub trait NavigationBlocker: Send + Sync {
    fn set_blocked(&self, blocked: bool);
}

/// Ignores every signal.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopBlocker;

impl NavigationBlocker for NoopBlocker {
    fn set_blocked(&self, _blocked: bool) {}
}

/// Keeps the latest signal so the shell can poll it.
#[derive(Debug, Default)]
pub struct BlockFlag {
    blocked: AtomicBool,
}

impl BlockFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }
}

impl NavigationBlocker for BlockFlag {
    fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }
}

impl<T: NavigationBlocker + ?Sized> NavigationBlocker for Arc<T> {
    fn set_blocked(&self, blocked: bool) {
        (**self).set_blocked(blocked)
    }
}
