//! Jobs and the procedures that run them
//!
//! A job is one players/cards request. It is validated into a [`Job`],
//! then run as a [`ShuffleProcedure`] followed by a [`DealProcedure`].
//! Both procedures are built only from sequencer steps, sequencer pauses
//! and random draws.

pub mod deal;
pub mod request;
pub mod shuffle;

pub use deal::DealProcedure;
pub use request::{Job, JobRequest, RejectReason, ValidationError};
pub use shuffle::{MotorAlternator, ShuffleProcedure};

use crate::motion::sequencer::StepError;
use crate::motion::MotorId;
use crate::state::{ErrorKind, Mode};

/// Errors that stop a procedure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JobError {
    /// Procedure started in a mode that does not allow it
    WrongMode(Mode),
    /// Coil line write failed; the job is aborted
    Fault(StepError),
}

impl JobError {
    /// Error mode entered when a job stops with this error
    pub fn error_kind(&self) -> ErrorKind {
        match self {
            JobError::Fault(_) => ErrorKind::HardwareFault,
            JobError::WrongMode(_) => ErrorKind::ConfigError,
        }
    }
}

impl From<StepError> for JobError {
    fn from(error: StepError) -> Self {
        JobError::Fault(error)
    }
}

/// Outcome of a completed procedure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProcedureReport {
    /// Movements that ran
    pub movements: u32,
    /// Sequencer calls skipped because the motor is unbound
    pub skipped: u32,
    /// First unbound motor seen
    pub unbound: Option<MotorId>,
}

impl ProcedureReport {
    /// Fold a sequencer result into the report
    ///
    /// Unbound motors are recorded and the procedure goes on; returns
    /// whether the call touched the motor. Coil faults are passed back.
    pub(crate) fn absorb(&mut self, result: Result<(), StepError>) -> Result<bool, StepError> {
        match result {
            Ok(()) => Ok(true),
            Err(StepError::Unbound(motor)) => {
                self.skipped += 1;
                self.unbound.get_or_insert(motor);
                Ok(false)
            }
            Err(error) => Err(error),
        }
    }

    /// Check if every sequencer call reached its motor
    pub fn is_complete(&self) -> bool {
        self.skipped == 0
    }
}

/// Reports of a job that ran to the end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JobReport {
    pub shuffle: ProcedureReport,
    pub deal: ProcedureReport,
}

impl JobReport {
    /// First unbound motor seen by either procedure
    pub fn unbound(&self) -> Option<MotorId> {
        self.shuffle.unbound.or(self.deal.unbound)
    }
}
