//! Mode definition
//!
//! Admission of new jobs, motor permission and the indicator color are all
//! functions of the current mode.

use super::events::Event;

/// Machine modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Power-on, configuration and network bring-up
    Init,
    /// Ready for a job request
    Idle,
    /// An operator has the control page open
    WaitingInput,
    /// Shuffle procedure running
    Shuffling,
    /// Deal procedure running
    Dealing,
    /// Error shown; see [`ErrorKind`] for whether it clears
    Error(ErrorKind),
}

/// Kinds of error the machine can show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    /// A job request was rejected by validation (clears back to Idle)
    InvalidRequest,
    /// The network never became ready
    NetworkUnavailable,
    /// Writing a coil line failed during a job
    HardwareFault,
    /// Machine configuration is unusable
    ConfigError,
}

impl ErrorKind {
    /// Check if this error only needs to be shown briefly
    pub fn is_notice(&self) -> bool {
        matches!(self, ErrorKind::InvalidRequest)
    }
}

impl Mode {
    /// Check if a new job may be accepted in this mode
    pub fn accepts_jobs(&self) -> bool {
        matches!(self, Mode::Idle | Mode::WaitingInput)
    }

    /// Check if this is an error mode
    pub fn is_error(&self) -> bool {
        matches!(self, Mode::Error(_))
    }

    /// Check if this is an error that only a reboot clears
    pub fn is_fault(&self) -> bool {
        matches!(self, Mode::Error(kind) if !kind.is_notice())
    }

    /// Short uppercase name, as shown on the control page
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Init => "INIT",
            Mode::Idle => "IDLE",
            Mode::WaitingInput => "WAITING_INPUT",
            Mode::Shuffling => "SHUFFLING",
            Mode::Dealing => "DEALING",
            Mode::Error(_) => "ERROR",
        }
    }

    /// Process an event and return the next mode
    ///
    /// Unlisted (mode, event) pairs leave the mode unchanged.
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use Mode::*;

        match (self, event) {
            // A fault is sticky; a notice can be overridden by a fault
            (Error(kind), ErrorDetected(new)) if kind.is_notice() => Error(new),
            (Error(_), ErrorDetected(_)) => self,
            (_, ErrorDetected(kind)) => Error(kind),

            // Boot transitions
            (Init, BootComplete) => Idle,

            // Operator presence
            (Idle, ClientActive) => WaitingInput,
            (WaitingInput, InputTimeout) => Idle,

            // Job admission
            (Idle | WaitingInput, JobAccepted) => Shuffling,
            (Idle | WaitingInput, RequestRejected) => Error(ErrorKind::InvalidRequest),

            // Job progress
            (Shuffling, ShuffleFinished) => Dealing,
            (Dealing, DealFinished) => Idle,

            // Validation notice shown long enough
            (Error(ErrorKind::InvalidRequest), NoticeCleared) => Idle,

            // Default: stay in current mode
            _ => self,
        }
    }
}
