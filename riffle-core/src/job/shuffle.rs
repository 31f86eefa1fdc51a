//! Shuffle procedure
//!
//! Releases cards alternately from the two shuffle stacks. Before each
//! move a number is drawn uniformly from 1..=10; a draw above 3 switches
//! to the other stack, so consecutive moves switch with probability 0.7.

use embedded_hal::delay::DelayNs;
use rand::{Rng, RngCore};

use super::{JobError, ProcedureReport};
use crate::config::ShuffleConfig;
use crate::motion::{Direction, MotorId, StepSequencer};
use crate::state::Mode;
use crate::traits::CoilDriver;

/// Draws above this value switch motors
pub const SWITCH_ABOVE: u32 = 3;

/// Randomized choice between the two shuffle motors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorAlternator {
    motors: [MotorId; 2],
    current: usize,
}

impl MotorAlternator {
    /// Start on the first motor of the pair
    pub fn new(motors: [MotorId; 2]) -> Self {
        Self { motors, current: 0 }
    }

    /// Motor chosen for the last move (or the starting motor)
    pub fn current(&self) -> MotorId {
        self.motors[self.current]
    }

    /// Draw and return the motor for the next move
    pub fn next_move<R: RngCore>(&mut self, rng: &mut R) -> MotorId {
        if rng.random_range(1..=10u32) > SWITCH_ABOVE {
            self.current = 1 - self.current;
        }
        self.current()
    }
}

/// Shuffle procedure
#[derive(Debug, Clone, Copy)]
pub struct ShuffleProcedure {
    config: ShuffleConfig,
}

impl ShuffleProcedure {
    pub fn new(config: ShuffleConfig) -> Self {
        Self { config }
    }

    /// Run all shuffle moves, then power down both shuffle motors
    ///
    /// Only allowed in [`Mode::Shuffling`].
    pub fn run<C, D, R>(
        &self,
        mode: Mode,
        sequencer: &mut StepSequencer<C, D>,
        rng: &mut R,
    ) -> Result<ProcedureReport, JobError>
    where
        C: CoilDriver,
        D: DelayNs,
        R: RngCore,
    {
        if mode != Mode::Shuffling {
            return Err(JobError::WrongMode(mode));
        }

        let mut report = ProcedureReport::default();
        let mut alternator = MotorAlternator::new(self.config.motors);

        for _move in 0..self.config.moves {
            let motor = alternator.next_move(rng);

            #[cfg(feature = "defmt")]
            defmt::debug!(
                "Shuffle move {}/{}, motor {}",
                _move + 1,
                self.config.moves,
                motor.number()
            );

            let result = sequencer.step(motor, self.config.steps_per_release, Direction::Forward);
            if report.absorb(result)? {
                report.movements += 1;
            }
            sequencer.pause_ms(self.config.move_pause_ms);
        }

        for motor in self.config.motors {
            report.absorb(sequencer.release(motor))?;
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{bound_sequencer, MockCoils, MockDelay, TraceLog};
    use crate::motion::sequencer::StepError;
    use crate::motion::PhasePattern;
    use crate::traits::CoilError;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn test_config() -> ShuffleConfig {
        ShuffleConfig {
            steps_per_release: 8,
            ..ShuffleConfig::default()
        }
    }

    #[test]
    fn test_switch_probability() {
        let mut rng = SmallRng::seed_from_u64(0x5eed);
        let mut alternator = MotorAlternator::new([MotorId::Motor1, MotorId::Motor2]);

        let draws = 10_000;
        let mut switches = 0;
        let mut previous = alternator.current();
        for _ in 0..draws {
            let motor = alternator.next_move(&mut rng);
            if motor != previous {
                switches += 1;
            }
            previous = motor;
        }

        let ratio = switches as f64 / draws as f64;
        assert!((0.67..0.73).contains(&ratio), "switch ratio {}", ratio);
    }

    #[test]
    fn test_only_shuffle_motors_move() {
        let log = TraceLog::default();
        let mut seq = bound_sequencer(&log);
        let mut rng = SmallRng::seed_from_u64(1);

        let report = ShuffleProcedure::new(test_config())
            .run(Mode::Shuffling, &mut seq, &mut rng)
            .unwrap();

        assert_eq!(report.movements, 5);
        assert!(report.is_complete());
        assert_eq!(log.steps(MotorId::Motor1) + log.steps(MotorId::Motor2), 5 * 8);
        assert_eq!(log.steps(MotorId::Motor3), 0);
        assert_eq!(log.pauses(), vec![50; 5]);
    }

    #[test]
    fn test_both_motors_released_at_end() {
        let log = TraceLog::default();
        let mut seq = bound_sequencer(&log);
        let mut rng = SmallRng::seed_from_u64(2);

        ShuffleProcedure::new(test_config())
            .run(Mode::Shuffling, &mut seq, &mut rng)
            .unwrap();

        for motor in [MotorId::Motor1, MotorId::Motor2] {
            assert_eq!(log.coil_writes(motor).last(), Some(&PhasePattern::OFF));
        }
    }

    #[test]
    fn test_same_seed_same_moves() {
        let run = |seed| {
            let log = TraceLog::default();
            let mut seq = bound_sequencer(&log);
            let mut rng = SmallRng::seed_from_u64(seed);
            ShuffleProcedure::new(test_config())
                .run(Mode::Shuffling, &mut seq, &mut rng)
                .unwrap();
            log.entries()
        };
        assert_eq!(run(42), run(42));
    }

    #[test]
    fn test_wrong_mode() {
        let log = TraceLog::default();
        let mut seq = bound_sequencer(&log);
        let mut rng = SmallRng::seed_from_u64(3);

        let result = ShuffleProcedure::new(test_config()).run(Mode::Idle, &mut seq, &mut rng);

        assert_eq!(result, Err(JobError::WrongMode(Mode::Idle)));
        assert!(log.entries().is_empty());
    }

    #[test]
    fn test_unbound_motor_is_skipped() {
        let log = TraceLog::default();
        let mut seq = StepSequencer::new(
            [Some(MockCoils::new(MotorId::Motor1, &log)), None, None],
            MockDelay::new(&log),
            1_000,
        );
        let mut rng = SmallRng::seed_from_u64(4);

        let report = ShuffleProcedure::new(test_config())
            .run(Mode::Shuffling, &mut seq, &mut rng)
            .unwrap();

        assert_eq!(report.unbound, Some(MotorId::Motor2));
        // Every move plus the final release of motor 1 and motor 2
        assert_eq!(report.movements + report.skipped, 5 + 1);
        assert_eq!(log.steps(MotorId::Motor1), report.movements as usize * 8);
        assert_eq!(log.pauses().len(), 5);
    }

    #[test]
    fn test_coil_fault_aborts() {
        let log = TraceLog::default();
        let mut seq = StepSequencer::new(
            [
                Some(MockCoils::failing_after(MotorId::Motor1, &log, 0)),
                Some(MockCoils::failing_after(MotorId::Motor2, &log, 0)),
                Some(MockCoils::new(MotorId::Motor3, &log)),
            ],
            MockDelay::new(&log),
            1_000,
        );
        let mut rng = SmallRng::seed_from_u64(5);

        let result = ShuffleProcedure::new(test_config()).run(Mode::Shuffling, &mut seq, &mut rng);

        let Err(JobError::Fault(StepError::Coil { error, .. })) = result else {
            panic!("expected coil fault, got {:?}", result);
        };
        assert_eq!(error, CoilError::LineWrite(0));
        assert!(log.pauses().is_empty());
    }
}
