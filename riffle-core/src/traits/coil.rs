//! Coil driver trait
//!
//! A coil driver owns the four control lines of one unipolar stepper
//! (typically through a ULN2003 darlington array) and energizes them
//! according to a [`PhasePattern`].

use crate::motion::PhasePattern;

/// Errors that can occur while driving coil lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CoilError {
    /// Writing a line failed; holds the line index (0-3)
    LineWrite(u8),
}

/// Trait for a bank of four coil lines bound to one motor
///
/// Lines are bound once at initialization and held for the lifetime of
/// the driver.
pub trait CoilDriver {
    /// Drive all four lines to the given pattern, in table order (A, B, C, D)
    fn apply(&mut self, pattern: PhasePattern) -> Result<(), CoilError>;

    /// The pattern most recently applied
    fn pattern(&self) -> PhasePattern;

    /// De-energize all four lines
    fn release(&mut self) -> Result<(), CoilError> {
        self.apply(PhasePattern::OFF)
    }

    /// Check if any line is currently energized
    fn is_energized(&self) -> bool {
        self.pattern() != PhasePattern::OFF
    }
}
