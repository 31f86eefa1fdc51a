//! GPIO coil bank
//!
//! Four push-pull outputs feeding a ULN2003 darlington array. A high line
//! energizes the matching coil.

use embedded_hal::digital::{OutputPin, PinState};
use riffle_core::motion::PhasePattern;
use riffle_core::traits::{CoilDriver, CoilError};

/// The four coil lines of one motor
pub struct GpioCoilBank<P> {
    lines: [P; 4],
    /// Last pattern written to all four lines
    pattern: PhasePattern,
}

impl<P: OutputPin> GpioCoilBank<P> {
    /// Bind four lines (A, B, C, D) and drive them all low
    pub fn new(lines: [P; 4]) -> Result<Self, CoilError> {
        let mut bank = Self {
            lines,
            pattern: PhasePattern::OFF,
        };
        bank.release()?;
        Ok(bank)
    }
}

impl<P: OutputPin> CoilDriver for GpioCoilBank<P> {
    fn apply(&mut self, pattern: PhasePattern) -> Result<(), CoilError> {
        for (index, (line, on)) in self.lines.iter_mut().zip(pattern.lines()).enumerate() {
            line.set_state(PinState::from(on))
                .map_err(|_| CoilError::LineWrite(index as u8))?;
        }
        self.pattern = pattern;
        Ok(())
    }

    fn pattern(&self) -> PhasePattern {
        self.pattern
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::{ErrorKind, ErrorType};
    use riffle_core::motion::PHASE_TABLE;

    /// Mock GPIO pin for testing
    struct MockPin {
        high: bool,
    }

    impl MockPin {
        fn new(high: bool) -> Self {
            Self { high }
        }
    }

    impl ErrorType for MockPin {
        type Error = Infallible;
    }

    impl OutputPin for MockPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.high = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.high = true;
            Ok(())
        }
    }

    /// Pin whose writes always fail
    struct BrokenPin;

    impl ErrorType for BrokenPin {
        type Error = ErrorKind;
    }

    impl OutputPin for BrokenPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            Err(ErrorKind::Other)
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            Err(ErrorKind::Other)
        }
    }

    fn levels(bank: &GpioCoilBank<MockPin>) -> [bool; 4] {
        [
            bank.lines[0].high,
            bank.lines[1].high,
            bank.lines[2].high,
            bank.lines[3].high,
        ]
    }

    #[test]
    fn test_new_drives_lines_low() {
        let bank = GpioCoilBank::new([true, true, false, true].map(MockPin::new)).unwrap();
        assert_eq!(levels(&bank), [false; 4]);
        assert!(!bank.is_energized());
    }

    #[test]
    fn test_apply_writes_lines_in_order() {
        let mut bank = GpioCoilBank::new([false; 4].map(MockPin::new)).unwrap();

        bank.apply(PHASE_TABLE[1]).unwrap();
        assert_eq!(levels(&bank), [true, true, false, false]);

        bank.apply(PHASE_TABLE[7]).unwrap();
        assert_eq!(levels(&bank), [true, false, false, true]);
        assert_eq!(bank.pattern(), PHASE_TABLE[7]);
        assert!(bank.is_energized());

        bank.release().unwrap();
        assert_eq!(levels(&bank), [false; 4]);
    }

    #[test]
    fn test_write_failure() {
        let result = GpioCoilBank::new([BrokenPin, BrokenPin, BrokenPin, BrokenPin]);
        assert!(matches!(result, Err(CoilError::LineWrite(0))));
    }
}
