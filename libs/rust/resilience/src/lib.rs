//! Run-control primitives: cooperative cancellation with an optional deadline.
//!
//! A `CancellationToken` is cheap to clone; every clone observes the same flag.
//! Long-running work polls `check()` at safe points (between objective calls,
//! before a fan-out) and unwinds with a `ResilienceError` when the run is over.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use parking_lot::RwLock;
use tracing::{debug, warn};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ResilienceError {
    #[error("run cancelled")] Cancelled,
    #[error("deadline exceeded")] DeadlineExceeded,
}

#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
    deadline: Arc<RwLock<Option<Instant>>>,
}

impl CancellationToken {
    pub fn new() -> Self { Self::default() }

    /// Token that expires on its own once `timeout` has elapsed.
    pub fn with_timeout(timeout: Duration) -> Self {
        let token = Self::new();
        token.set_deadline(Instant::now() + timeout);
        token
    }

    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) { warn!("cancellation_requested"); }
    }

    pub fn set_deadline(&self, at: Instant) { *self.deadline.write() = Some(at); debug!(?at, "deadline_set"); }

    pub fn clear_deadline(&self) { *self.deadline.write() = None; }

    pub fn is_cancelled(&self) -> bool { self.check().is_err() }

    /// Ok while the run may continue.
    pub fn check(&self) -> Result<(), ResilienceError> {
        if self.cancelled.load(Ordering::SeqCst) { return Err(ResilienceError::Cancelled); }
        match *self.deadline.read() {
            Some(at) if Instant::now() >= at => Err(ResilienceError::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}
