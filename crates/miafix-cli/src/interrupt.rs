//! Ctrl-C handling.
//!
//! While DATs are being processed, the first Ctrl-C lets the current DAT
//! finish and stops the run. Anywhere else (the path prompt, the report,
//! the backup prompt), or on a second press, the process exits at once.

use miafix_core::CancellationToken;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Exit status used for an interrupted run.
pub const EXIT_INTERRUPTED: i32 = 130;

/// What the signal handler should do for one Ctrl-C.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalAction {
    /// Let the DAT in flight finish, then stop.
    StopAfterCurrent,
    /// Exit the process immediately.
    Exit,
}

/// Shared state between `main` and the signal handler.
#[derive(Debug, Clone, Default)]
pub struct Interrupts {
    cancel: CancellationToken,
    processing: Arc<AtomicBool>,
}

impl Interrupts {
    /// Create handler state with no run in progress.
    pub fn new() -> Self {
        Self::default()
    }

    /// Token checked by the reconciler between DATs.
    pub fn token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Mark the start of DAT processing.
    pub fn begin_processing(&self) {
        self.processing.store(true, Ordering::SeqCst);
    }

    /// Mark the end of DAT processing.
    pub fn end_processing(&self) {
        self.processing.store(false, Ordering::SeqCst);
    }

    /// Record one Ctrl-C and decide how to react to it.
    pub fn on_signal(&self) -> SignalAction {
        let first_press = !self.cancel.is_cancelled();
        self.cancel.cancel();
        if first_press && self.processing.load(Ordering::SeqCst) {
            SignalAction::StopAfterCurrent
        } else {
            SignalAction::Exit
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_outside_processing_exits() {
        let interrupts = Interrupts::new();
        assert_eq!(interrupts.on_signal(), SignalAction::Exit);
        assert!(interrupts.token().is_cancelled());
    }

    #[test]
    fn test_first_signal_while_processing_stops_after_current() {
        let interrupts = Interrupts::new();
        interrupts.begin_processing();
        assert_eq!(interrupts.on_signal(), SignalAction::StopAfterCurrent);
        assert!(interrupts.token().is_cancelled());
        assert_eq!(interrupts.on_signal(), SignalAction::Exit);
    }

    #[test]
    fn test_signal_after_processing_exits() {
        let interrupts = Interrupts::new();
        interrupts.begin_processing();
        interrupts.end_processing();
        assert_eq!(interrupts.on_signal(), SignalAction::Exit);
    }
}
