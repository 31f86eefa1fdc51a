//! Motion and timing configuration
//!
//! Defaults match the calibration of the first prototype. They are
//! starting points only and must be tuned per machine.

use crate::motion::sequencer::DEFAULT_STEP_DELAY_US;
use crate::motion::MotorId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Sequencer timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MotionConfig {
    /// Delay between phases in microseconds (smaller = faster, less torque)
    pub step_delay_us: u32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            step_delay_us: DEFAULT_STEP_DELAY_US,
        }
    }
}

/// Shuffle procedure configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ShuffleConfig {
    /// The two release motors; the first one is the starting choice
    pub motors: [MotorId; 2],
    /// Number of release moves per shuffle
    pub moves: u16,
    /// Steps for one card release
    pub steps_per_release: u32,
    /// Pause after each move in milliseconds
    pub move_pause_ms: u32,
}

impl Default for ShuffleConfig {
    fn default() -> Self {
        Self {
            motors: [MotorId::Motor1, MotorId::Motor2],
            moves: 5,
            steps_per_release: 4000,
            move_pause_ms: 50,
        }
    }
}

/// Deal procedure configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DealConfig {
    /// Motor that pushes cards out
    pub motor: MotorId,
    /// Steps to deal roughly one card
    pub steps_per_card: u32,
    /// Pause after the deal movement, before powering down (ms)
    pub settle_ms: u32,
    /// Pause between cards of the same hand (ms)
    pub card_pause_ms: u32,
    /// Pause after the last card of a hand (ms)
    pub hand_pause_ms: u32,
}

impl Default for DealConfig {
    fn default() -> Self {
        Self {
            motor: MotorId::Motor3,
            steps_per_card: 4000,
            settle_ms: 100,
            card_pause_ms: 100,
            hand_pause_ms: 1000,
        }
    }
}

/// Operator-facing timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct UiConfig {
    /// How long a rejected request shows the error color (ms)
    pub notice_ms: u32,
    /// Return from WaitingInput to Idle after this long without a request (ms)
    pub input_timeout_ms: u32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            notice_ms: 2000,
            input_timeout_ms: 30_000,
        }
    }
}
