//! Mode change notification
//!
//! The controller pushes every mode change to a [`ModeObserver`]. The
//! indicator strip is the main observer; the notification carries only the
//! mode value.

use crate::state::Mode;

/// Receives mode change notifications from the controller
pub trait ModeObserver {
    /// Called after each mode change with the new mode
    fn on_mode_change(&mut self, mode: Mode);
}

/// Observer that ignores all notifications
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ModeObserver for NoopObserver {
    fn on_mode_change(&mut self, _mode: Mode) {}
}

impl<F: FnMut(Mode)> ModeObserver for F {
    fn on_mode_change(&mut self, mode: Mode) {
        self(mode)
    }
}
