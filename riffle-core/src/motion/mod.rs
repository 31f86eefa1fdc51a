//! Stepper motion primitives
//!
//! Motor identifiers, the 8-phase half-step table and the sequencer that
//! walks a motor through it.

pub mod phase;
pub mod sequencer;

pub use phase::{PhaseIndex, PhasePattern, PHASE_COUNT, PHASE_TABLE};
pub use sequencer::{StepError, StepSequencer};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of motors the machine drives
pub const MOTOR_COUNT: usize = 3;

/// Motor identifier
///
/// Motors are numbered 1-3 in configuration and on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub enum MotorId {
    Motor1,
    Motor2,
    Motor3,
}

impl MotorId {
    /// All motors in numbering order
    pub const ALL: [MotorId; MOTOR_COUNT] = [MotorId::Motor1, MotorId::Motor2, MotorId::Motor3];

    /// Zero-based slot index
    pub const fn index(self) -> usize {
        match self {
            MotorId::Motor1 => 0,
            MotorId::Motor2 => 1,
            MotorId::Motor3 => 2,
        }
    }

    /// One-based motor number as used in configuration
    pub const fn number(self) -> u8 {
        self.index() as u8 + 1
    }
}

/// Error for motor numbers outside 1-3
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnknownMotor(pub u8);

impl core::fmt::Display for UnknownMotor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "unknown motor number {}", self.0)
    }
}

impl TryFrom<u8> for MotorId {
    type Error = UnknownMotor;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        match number {
            1 => Ok(MotorId::Motor1),
            2 => Ok(MotorId::Motor2),
            3 => Ok(MotorId::Motor3),
            n => Err(UnknownMotor(n)),
        }
    }
}

impl From<MotorId> for u8 {
    fn from(motor: MotorId) -> u8 {
        motor.number()
    }
}

/// Direction of travel through the phase table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Advance through the table (+1 per step)
    #[default]
    Forward,
    /// Walk the table backwards (-1 per step)
    Backward,
}

impl Direction {
    /// Signed phase offset for one step
    pub const fn offset(self) -> i8 {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}
