//! Config-driven pin allocation
//!
//! Coil lines come from `machine.toml`, so GPIOs are handed out by number
//! at boot. Pins the board wires to fixed functions are never in the bank.

use embassy_rp::gpio::AnyPin;
use embassy_rp::Peri;

/// Number of GPIOs on the RP2040
pub const GPIO_COUNT: usize = 30;

/// GPIOs wired to the ESP-AT UART (0, 1) and the indicator strip (16)
pub const RESERVED_PINS: [u8; 3] = [0, 1, 16];

/// Error when requesting a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// Pin number out of range (0-29 valid)
    InvalidPin(u8),
    /// Pin already taken
    AlreadyTaken(u8),
    /// Pin reserved for a board function
    Reserved(u8),
}

/// Pin bank that allows taking free GPIOs by number
pub struct PinBank {
    pins: [Option<Peri<'static, AnyPin>>; GPIO_COUNT],
}

impl PinBank {
    /// Create a bank; reserved slots must be `None`
    pub fn new(pins: [Option<Peri<'static, AnyPin>>; GPIO_COUNT]) -> Self {
        Self { pins }
    }

    /// Take a pin by number
    pub fn take(&mut self, pin: u8) -> Result<Peri<'static, AnyPin>, PinError> {
        if RESERVED_PINS.contains(&pin) {
            return Err(PinError::Reserved(pin));
        }
        self.pins
            .get_mut(pin as usize)
            .ok_or(PinError::InvalidPin(pin))?
            .take()
            .ok_or(PinError::AlreadyTaken(pin))
    }
}

/// Build the bank from every GPIO not in [`RESERVED_PINS`]
#[macro_export]
macro_rules! pin_bank {
    ($p:expr) => {
        $crate::pins::PinBank::new([
            None, // GPIO0: UART0 TX to ESP-AT
            None, // GPIO1: UART0 RX from ESP-AT
            Some(embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_2)),
            Some(embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_3)),
            Some(embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_4)),
            Some(embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_5)),
            Some(embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_6)),
            Some(embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_7)),
            Some(embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_8)),
            Some(embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_9)),
            Some(embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_10)),
            Some(embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_11)),
            Some(embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_12)),
            Some(embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_13)),
            Some(embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_14)),
            Some(embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_15)),
            None, // GPIO16: WS2812 data
            Some(embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_17)),
            Some(embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_18)),
            Some(embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_19)),
            Some(embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_20)),
            Some(embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_21)),
            Some(embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_22)),
            Some(embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_23)),
            Some(embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_24)),
            Some(embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_25)),
            Some(embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_26)),
            Some(embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_27)),
            Some(embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_28)),
            Some(embassy_rp::Peri::<embassy_rp::gpio::AnyPin>::from($p.PIN_29)),
        ])
    };
}
