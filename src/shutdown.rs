//! Process-wide shutdown flag set by the Ctrl-C handler.
//! The batch checks it between entries, so an entry is never abandoned halfway.

use std::sync::atomic::{AtomicBool, Ordering};

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Request a cooperative shutdown (idempotent).
#[inline]
pub fn request() {
    SHUTDOWN.store(true, Ordering::Relaxed);
}

#[inline]
pub fn is_requested() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

/// Clear the flag (tests and long-lived embedders).
#[inline]
pub fn reset() {
    SHUTDOWN.store(false, Ordering::Relaxed);
}
