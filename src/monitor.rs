#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! Progress reporting and cooperative cancellation for long-running analyses.

use crate::error::{Error, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// A progress sink with a cancellation poll.
///
/// Analyses call [`Monitor::worked`] after each unit of work and
/// [`Monitor::checkpoint`] at the points where stopping leaves no half-written state.
pub trait Monitor {
    /// Records `units` of completed work.
    fn worked(&self, units: u64);

    /// Whether the caller asked the analysis to stop.
    fn is_cancelled(&self) -> bool;

    /// Returns [`Error::Cancelled`] once cancellation has been requested.
    ///
    /// # Errors
    ///
    /// [`Error::Cancelled`] if [`Monitor::is_cancelled`] is true.
    fn checkpoint(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Ignores progress and never cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullMonitor;

impl Monitor for NullMonitor {
    fn worked(&self, _: u64) {}

    fn is_cancelled(&self) -> bool {
        false
    }
}

/// A cloneable handle that lets another thread cancel an analysis and read its progress.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
    work: Arc<AtomicU64>,
}

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Takes effect at the next checkpoint.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Units of work reported so far.
    #[must_use]
    pub fn work_done(&self) -> u64 {
        self.work.load(Ordering::Relaxed)
    }
}

impl Monitor for CancellationToken {
    fn worked(&self, units: u64) {
        self.work.fetch_add(units, Ordering::Relaxed);
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Logs progress every `every` units at `info` level.
#[derive(Debug)]
pub struct LogMonitor {
    label: &'static str,
    every: u64,
    work: AtomicU64,
}

impl LogMonitor {
    #[must_use]
    pub fn new(label: &'static str, every: u64) -> Self {
        Self {
            label,
            every: every.max(1),
            work: AtomicU64::new(0),
        }
    }
}

impl Monitor for LogMonitor {
    fn worked(&self, units: u64) {
        let before = self.work.fetch_add(units, Ordering::Relaxed);
        let after = before + units;
        if before / self.every != after / self.every {
            log::info!("{}: {} units of work done", self.label, after);
        }
    }

    fn is_cancelled(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_cancels_across_clones() {
        let token = CancellationToken::new();
        let handle = token.clone();
        assert!(token.checkpoint().is_ok());

        handle.cancel();
        assert!(matches!(token.checkpoint(), Err(Error::Cancelled)));
    }

    #[test]
    fn test_token_counts_work() {
        let token = CancellationToken::new();
        token.worked(3);
        token.clone().worked(2);
        assert_eq!(token.work_done(), 5);
    }
}
