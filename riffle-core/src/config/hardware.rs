//! Hardware configuration types
//!
//! Pin bindings for the coil lines plus the indicator strip and network
//! link settings, and the top-level [`MachineConfig`].

use heapless::{String, Vec};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::types::{DealConfig, MotionConfig, ShuffleConfig, UiConfig};
use crate::motion::{MotorId, MOTOR_COUNT};

/// Number of GPIOs on the RP2040
pub const MAX_GPIO: u8 = 30;

/// Current configuration version
pub const CONFIG_VERSION: u8 = 1;

/// Maximum SSID length
pub const MAX_SSID_LEN: usize = 32;

/// Maximum passphrase length
pub const MAX_PASSWORD_LEN: usize = 64;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The configuration text could not be parsed (1-based line, 0 if unknown)
    Parse { line: u32 },
    /// Config version mismatch
    VersionMismatch(u8),
    /// The same motor is bound twice
    DuplicateMotor(MotorId),
    /// Pin number out of range
    InvalidPin(u8),
    /// A pin is used by more than one coil line
    PinConflict(u8),
    /// Both shuffle motors are the same
    SameShuffleMotors,
    /// Deal motor is also a shuffle motor
    DealMotorShared,
    /// A count or step setting is zero
    ZeroSetting(&'static str),
}

/// Coil line binding for one motor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MotorBinding {
    /// Which motor these lines drive
    pub motor: MotorId,
    /// GPIO numbers for coil lines A, B, C, D (ULN2003 IN1-IN4)
    pub pins: [u8; 4],
}

impl MotorBinding {
    pub const fn new(motor: MotorId, pins: [u8; 4]) -> Self {
        Self { motor, pins }
    }
}

/// Indicator strip configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IndicatorConfig {
    /// Number of pixels on the strip
    pub pixels: u8,
    /// Global brightness scale (255 = palette as-is)
    pub brightness: u8,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            pixels: 16,
            brightness: 255,
        }
    }
}

/// Wireless link configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NetworkConfig {
    /// Access point name
    pub ssid: String<MAX_SSID_LEN>,
    /// Access point passphrase
    pub password: String<MAX_PASSWORD_LEN>,
    /// HTTP port
    pub port: u16,
    /// Join attempts (one second apart) before giving up
    pub join_attempts: u8,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            ssid: String::new(),
            password: String::new(),
            port: 80,
            join_attempts: 10,
        }
    }
}

/// Complete machine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MachineConfig {
    /// Configuration version for compatibility checks
    pub version: u8,
    /// Coil line bindings
    pub motors: Vec<MotorBinding, MOTOR_COUNT>,
    /// Sequencer timing
    pub motion: MotionConfig,
    /// Shuffle procedure
    pub shuffle: ShuffleConfig,
    /// Deal procedure
    pub deal: DealConfig,
    /// Operator timing
    pub ui: UiConfig,
    /// Indicator strip
    pub indicator: IndicatorConfig,
    /// Wireless link
    pub network: NetworkConfig,
}

/// Coil bindings used when `machine.toml` lists no motors
pub const DEFAULT_MOTORS: [MotorBinding; MOTOR_COUNT] = [
    MotorBinding::new(MotorId::Motor1, [2, 3, 4, 5]),
    MotorBinding::new(MotorId::Motor2, [6, 7, 8, 9]),
    MotorBinding::new(MotorId::Motor3, [10, 11, 12, 13]),
];

impl Default for MachineConfig {
    fn default() -> Self {
        // DEFAULT_MOTORS has one entry per slot
        let motors = Vec::from_slice(&DEFAULT_MOTORS).unwrap_or_default();

        Self {
            version: CONFIG_VERSION,
            motors,
            motion: MotionConfig::default(),
            shuffle: ShuffleConfig::default(),
            deal: DealConfig::default(),
            ui: UiConfig::default(),
            indicator: IndicatorConfig::default(),
            network: NetworkConfig::default(),
        }
    }
}

impl MachineConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the binding for a motor
    pub fn binding(&self, motor: MotorId) -> Option<&MotorBinding> {
        self.motors.iter().find(|b| b.motor == motor)
    }

    /// Motors used by the procedures that have no binding
    ///
    /// These are not rejected by [`validate`](Self::validate); the
    /// sequencer reports them at run time.
    pub fn unbound_motors(&self) -> impl Iterator<Item = MotorId> + '_ {
        let used = [self.shuffle.motors[0], self.shuffle.motors[1], self.deal.motor];
        used.into_iter().filter(move |m| self.binding(*m).is_none())
    }

    /// Check the configuration for structural errors
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::VersionMismatch(self.version));
        }

        let mut seen_pins = [false; MAX_GPIO as usize];
        for (i, binding) in self.motors.iter().enumerate() {
            if self.motors[..i].iter().any(|b| b.motor == binding.motor) {
                return Err(ConfigError::DuplicateMotor(binding.motor));
            }
            for &pin in &binding.pins {
                if pin >= MAX_GPIO {
                    return Err(ConfigError::InvalidPin(pin));
                }
                if seen_pins[pin as usize] {
                    return Err(ConfigError::PinConflict(pin));
                }
                seen_pins[pin as usize] = true;
            }
        }

        if self.shuffle.motors[0] == self.shuffle.motors[1] {
            return Err(ConfigError::SameShuffleMotors);
        }
        if self.shuffle.motors.contains(&self.deal.motor) {
            return Err(ConfigError::DealMotorShared);
        }

        if self.motion.step_delay_us == 0 {
            return Err(ConfigError::ZeroSetting("motion.step_delay_us"));
        }
        if self.shuffle.moves == 0 {
            return Err(ConfigError::ZeroSetting("shuffle.moves"));
        }
        if self.shuffle.steps_per_release == 0 {
            return Err(ConfigError::ZeroSetting("shuffle.steps_per_release"));
        }
        if self.deal.steps_per_card == 0 {
            return Err(ConfigError::ZeroSetting("deal.steps_per_card"));
        }

        Ok(())
    }
}
