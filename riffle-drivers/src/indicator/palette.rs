//! Mode colors
//!
//! Low values on purpose; the strip sits right next to the operator.

use riffle_core::state::Mode;
use smart_leds::RGB8;

pub const OFF: RGB8 = RGB8::new(0, 0, 0);
pub const WHITE: RGB8 = RGB8::new(5, 5, 5);
pub const GREEN: RGB8 = RGB8::new(0, 10, 0);
pub const BLUE: RGB8 = RGB8::new(0, 0, 10);
pub const ORANGE: RGB8 = RGB8::new(10, 5, 0);
pub const CYAN: RGB8 = RGB8::new(0, 10, 10);
pub const RED: RGB8 = RGB8::new(20, 0, 0);

/// Color shown for a mode
pub const fn mode_color(mode: Mode) -> RGB8 {
    match mode {
        Mode::Init => WHITE,
        Mode::Idle => GREEN,
        Mode::WaitingInput => BLUE,
        Mode::Shuffling => ORANGE,
        Mode::Dealing => CYAN,
        Mode::Error(_) => RED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use riffle_core::state::ErrorKind;

    #[test]
    fn test_every_error_is_red() {
        for kind in [
            ErrorKind::InvalidRequest,
            ErrorKind::NetworkUnavailable,
            ErrorKind::HardwareFault,
            ErrorKind::ConfigError,
        ] {
            assert_eq!(mode_color(Mode::Error(kind)), RED);
        }
    }

    #[test]
    fn test_modes_are_distinct() {
        let modes = [
            Mode::Init,
            Mode::Idle,
            Mode::WaitingInput,
            Mode::Shuffling,
            Mode::Dealing,
            Mode::Error(ErrorKind::InvalidRequest),
        ];
        for (i, a) in modes.iter().enumerate() {
            for b in &modes[i + 1..] {
                assert_ne!(mode_color(*a), mode_color(*b));
            }
        }
    }
}
