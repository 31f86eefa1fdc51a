//! Machine assembly
//!
//! Turns the parsed configuration and the free GPIOs into a [`Dealer`].

use defmt::*;
use embassy_rp::gpio::{Level, Output};
use embassy_time::Delay;
use rand::rngs::SmallRng;

use riffle_core::config::{MachineConfig, MotorBinding};
use riffle_core::motion::MOTOR_COUNT;
use riffle_core::traits::CoilError;
use riffle_core::{Dealer, StepSequencer};
use riffle_drivers::coil::GpioCoilBank;
use riffle_drivers::indicator::Indicator;

use crate::indicator::{Ws2812Strip, MAX_PIXELS};
use crate::pins::{PinBank, PinError};

/// Four coil lines of one motor
pub type Coils = GpioCoilBank<Output<'static>>;

pub type MachineIndicator = Indicator<Ws2812Strip, MAX_PIXELS>;

pub type MachineDealer = Dealer<Coils, Delay, SmallRng, MachineIndicator>;

/// Failure while claiming coil lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum BindError {
    Pin(PinError),
    Coil(CoilError),
}

impl From<PinError> for BindError {
    fn from(e: PinError) -> Self {
        BindError::Pin(e)
    }
}

impl From<CoilError> for BindError {
    fn from(e: CoilError) -> Self {
        BindError::Coil(e)
    }
}

/// Claim the coil lines of every configured motor
///
/// Stops at the first motor that cannot be bound; motors bound before it
/// stay usable.
pub fn bind_motors(
    config: &MachineConfig,
    bank: &mut PinBank,
) -> ([Option<Coils>; MOTOR_COUNT], Result<(), BindError>) {
    let mut coils: [Option<Coils>; MOTOR_COUNT] = [None, None, None];

    for binding in &config.motors {
        match bind_motor(binding, bank) {
            Ok(lines) => {
                info!("Motor {} on GPIO {}", binding.motor.number(), binding.pins);
                coils[binding.motor.index()] = Some(lines);
            }
            Err(e) => {
                error!("Motor {} not bound: {}", binding.motor.number(), e);
                return (coils, Err(e));
            }
        }
    }

    (coils, Ok(()))
}

fn bind_motor(binding: &MotorBinding, bank: &mut PinBank) -> Result<Coils, BindError> {
    let [a, b, c, d] = binding.pins;
    let lines = [
        Output::new(bank.take(a)?, Level::Low),
        Output::new(bank.take(b)?, Level::Low),
        Output::new(bank.take(c)?, Level::Low),
        Output::new(bank.take(d)?, Level::Low),
    ];
    Ok(GpioCoilBank::new(lines)?)
}

/// Assemble the dealer; the indicator shows `INIT` right away
pub fn build_dealer(
    config: &MachineConfig,
    coils: [Option<Coils>; MOTOR_COUNT],
    strip: Ws2812Strip,
    rng: SmallRng,
) -> MachineDealer {
    let sequencer = StepSequencer::new(coils, Delay, config.motion.step_delay_us);
    let indicator = Indicator::new(strip, config.indicator.pixels, config.indicator.brightness);
    Dealer::new(config, sequencer, rng, indicator)
}
