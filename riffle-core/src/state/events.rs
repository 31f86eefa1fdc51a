//! Events that trigger mode transitions

use super::machine::ErrorKind;

/// Events that can trigger mode transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    // Lifecycle events
    /// Configuration loaded and network ready
    BootComplete,

    // Front end events
    /// The control page was served to an operator
    ClientActive,
    /// No request arrived within the input timeout
    InputTimeout,

    // Job admission events
    /// A valid job request was accepted
    JobAccepted,
    /// A job request failed validation
    RequestRejected,
    /// The rejection notice has been shown long enough
    NoticeCleared,

    // Procedure events
    /// Shuffle procedure completed
    ShuffleFinished,
    /// Deal procedure completed
    DealFinished,

    // Fault events
    /// Unrecoverable error detected
    ErrorDetected(ErrorKind),
}
