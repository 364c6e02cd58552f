//! Request deadline and cancellation for store calls.
//!
//! # Responsibility
//! - Carry a request's time budget and cancel flag into blocking store work.
//! - Interrupt running SQLite statements once either one trips.
//!
//! # Invariants
//! - An interrupted statement surfaces as `SQLITE_INTERRUPT`; see
//!   `DbError::is_interrupted`.
//! - Cancellation is sticky: once set it is never cleared.

use super::open::BUSY_TIMEOUT;
use rusqlite::Connection;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Number of SQLite VM instructions between deadline checks.
const PROGRESS_CHECK_OPS: i32 = 1_000;

/// Time budget plus cancel flag for one request.
#[derive(Debug, Clone)]
pub struct Deadline {
    expires_at: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

impl Deadline {
    /// Deadline expiring `timeout` from now.
    pub fn after(timeout: Duration) -> Self {
        Self {
            expires_at: Instant::now().checked_add(timeout),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Deadline that only trips on explicit cancellation.
    pub fn unbounded() -> Self {
        Self {
            expires_at: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Returns whether the budget is spent or the request was cancelled.
    pub fn is_expired(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
            || self
                .expires_at
                .is_some_and(|expires_at| Instant::now() >= expires_at)
    }

    /// Marks the request as cancelled.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Returns a guard that cancels this deadline when dropped.
    ///
    /// Held by the async side of a request so that dropping the request
    /// future (client went away) stops the blocking store work.
    pub fn cancel_on_drop(&self) -> CancelGuard {
        CancelGuard {
            cancelled: Arc::clone(&self.cancelled),
            armed: true,
        }
    }

    /// Time left before the budget runs out; `None` when unbounded.
    pub fn remaining(&self) -> Option<Duration> {
        if self.cancelled.load(Ordering::Relaxed) {
            return Some(Duration::ZERO);
        }
        self.expires_at
            .map(|expires_at| expires_at.saturating_duration_since(Instant::now()))
    }

    /// Installs this deadline on a connection.
    ///
    /// Running statements are interrupted through a progress handler; lock
    /// waits are capped by shrinking the busy timeout to the time left.
    pub fn install(&self, conn: &mut Connection) -> rusqlite::Result<()> {
        let busy_timeout = self
            .remaining()
            .map_or(BUSY_TIMEOUT, |remaining| remaining.min(BUSY_TIMEOUT));
        conn.busy_timeout(busy_timeout)?;

        let expires_at = self.expires_at;
        let cancelled = Arc::clone(&self.cancelled);
        conn.progress_handler(
            PROGRESS_CHECK_OPS,
            Some(move || {
                cancelled.load(Ordering::Relaxed)
                    || expires_at.is_some_and(|expires_at| Instant::now() >= expires_at)
            }),
        );
        Ok(())
    }
}

/// Cancels the owning deadline on drop unless disarmed.
#[derive(Debug)]
pub struct CancelGuard {
    cancelled: Arc<AtomicBool>,
    armed: bool,
}

impl CancelGuard {
    /// Keeps the deadline alive after the guard is dropped.
    pub fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        if self.armed {
            self.cancelled.store(true, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Deadline;
    use std::time::Duration;

    #[test]
    fn zero_timeout_is_expired_immediately() {
        let deadline = Deadline::after(Duration::ZERO);
        assert!(deadline.is_expired());
    }

    #[test]
    fn dropping_armed_guard_cancels_deadline() {
        let deadline = Deadline::unbounded();
        assert!(!deadline.is_expired());
        drop(deadline.cancel_on_drop());
        assert!(deadline.is_expired());
    }

    #[test]
    fn remaining_is_capped_by_cancellation() {
        let deadline = Deadline::after(Duration::from_secs(60));
        assert!(deadline.remaining().is_some_and(|left| left > Duration::ZERO));
        deadline.cancel();
        assert_eq!(deadline.remaining(), Some(Duration::ZERO));
        assert_eq!(Deadline::unbounded().remaining(), None);
    }

    #[test]
    fn disarmed_guard_leaves_deadline_running() {
        let deadline = Deadline::unbounded();
        deadline.cancel_on_drop().disarm();
        assert!(!deadline.is_expired());
    }
}
