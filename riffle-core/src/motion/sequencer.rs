//! Step sequencer
//!
//! Drives a motor's coil lines through [`PHASE_TABLE`](super::PHASE_TABLE)
//! one phase per step, waiting a fixed inter-step delay between phases.
//! This is the only place raw coil timing happens; the shuffle and deal
//! procedures are built from [`StepSequencer::step`] and
//! [`StepSequencer::pause_ms`].
//!
//! Every call ends with the motor de-energized, so coils never hold
//! current between movements. The phase index is kept, so the next
//! movement continues from the last energized phase.

use embedded_hal::delay::DelayNs;

use super::{Direction, MotorId, PhaseIndex, MOTOR_COUNT};
use crate::traits::{CoilDriver, CoilError};

/// Default delay between phases in microseconds
pub const DEFAULT_STEP_DELAY_US: u32 = 1_000;

/// Errors from a sequencer call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepError {
    /// No coil lines are bound to this motor; no line was touched
    Unbound(MotorId),
    /// A coil line could not be written
    Coil { motor: MotorId, error: CoilError },
}

impl StepError {
    /// Check if this error is a hardware fault (as opposed to configuration)
    pub fn is_hardware_fault(&self) -> bool {
        matches!(self, StepError::Coil { .. })
    }
}

/// Sequencer owning the coil drivers of all motors
pub struct StepSequencer<C, D> {
    coils: [Option<C>; MOTOR_COUNT],
    phases: [PhaseIndex; MOTOR_COUNT],
    delay: D,
    step_delay_us: u32,
}

impl<C: CoilDriver, D: DelayNs> StepSequencer<C, D> {
    /// Create a sequencer
    ///
    /// `coils` is indexed by [`MotorId::index`]; `None` leaves a motor
    /// unbound. All phase indices start at 0.
    pub fn new(coils: [Option<C>; MOTOR_COUNT], delay: D, step_delay_us: u32) -> Self {
        Self {
            coils,
            phases: [PhaseIndex::default(); MOTOR_COUNT],
            delay,
            step_delay_us,
        }
    }

    /// Move a motor by `steps` phases in `direction`, then de-energize it
    ///
    /// `steps == 0` performs no motion and only de-energizes the motor.
    pub fn step(
        &mut self,
        motor: MotorId,
        steps: u32,
        direction: Direction,
    ) -> Result<(), StepError> {
        let slot = motor.index();
        let Some(coils) = self.coils[slot].as_mut() else {
            #[cfg(feature = "defmt")]
            defmt::warn!("Step request for unbound motor {}", motor.number());
            return Err(StepError::Unbound(motor));
        };

        let mut result = Ok(());
        for _ in 0..steps {
            let phase = self.phases[slot].advance(direction.offset());
            self.phases[slot] = phase;

            if let Err(error) = coils.apply(phase.pattern()) {
                result = Err(StepError::Coil { motor, error });
                break;
            }

            self.delay.delay_us(self.step_delay_us);
        }

        // Always power down, even after a failed write
        let released = coils.release().map_err(|error| StepError::Coil { motor, error });
        result.and(released)
    }

    /// De-energize a motor without moving it
    pub fn release(&mut self, motor: MotorId) -> Result<(), StepError> {
        self.step(motor, 0, Direction::Forward)
    }

    /// Blocking pause between movements
    pub fn pause_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    /// Current phase index of a motor
    pub fn phase(&self, motor: MotorId) -> PhaseIndex {
        self.phases[motor.index()]
    }

    /// Check if coil lines are bound to a motor
    pub fn is_bound(&self, motor: MotorId) -> bool {
        self.coils[motor.index()].is_some()
    }

    /// Coil driver of a motor, if bound
    pub fn coils(&self, motor: MotorId) -> Option<&C> {
        self.coils[motor.index()].as_ref()
    }

    /// Configured inter-step delay in microseconds
    pub fn step_delay_us(&self) -> u32 {
        self.step_delay_us
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{bound_sequencer, MockCoils, MockDelay, Trace, TraceLog};
    use crate::motion::{PhasePattern, PHASE_COUNT, PHASE_TABLE};
    use proptest::prelude::*;

    #[test]
    fn test_forward_walks_table_then_releases() {
        let log = TraceLog::default();
        let mut seq = bound_sequencer(&log);

        seq.step(MotorId::Motor1, 3, Direction::Forward).unwrap();

        assert_eq!(
            log.coil_writes(MotorId::Motor1),
            vec![PHASE_TABLE[1], PHASE_TABLE[2], PHASE_TABLE[3], PhasePattern::OFF]
        );
        assert_eq!(seq.phase(MotorId::Motor1).get(), 3);
        assert!(!seq.coils(MotorId::Motor1).unwrap().is_energized());
    }

    #[test]
    fn test_delay_after_each_phase() {
        let log = TraceLog::default();
        let mut seq = bound_sequencer(&log);

        seq.step(MotorId::Motor2, 2, Direction::Forward).unwrap();

        assert_eq!(
            log.entries(),
            vec![
                Trace::Coil(MotorId::Motor2, PHASE_TABLE[1]),
                Trace::DelayUs(DEFAULT_STEP_DELAY_US),
                Trace::Coil(MotorId::Motor2, PHASE_TABLE[2]),
                Trace::DelayUs(DEFAULT_STEP_DELAY_US),
                Trace::Coil(MotorId::Motor2, PhasePattern::OFF),
            ]
        );
    }

    #[test]
    fn test_backward_from_zero_wraps() {
        let log = TraceLog::default();
        let mut seq = bound_sequencer(&log);

        seq.step(MotorId::Motor3, 1, Direction::Backward).unwrap();

        assert_eq!(seq.phase(MotorId::Motor3).get(), PHASE_COUNT - 1);
        assert_eq!(log.coil_writes(MotorId::Motor3)[0], PHASE_TABLE[7]);
    }

    #[test]
    fn test_phase_continues_across_calls() {
        let log = TraceLog::default();
        let mut seq = bound_sequencer(&log);

        seq.step(MotorId::Motor1, 5, Direction::Forward).unwrap();
        log.clear();
        seq.step(MotorId::Motor1, 1, Direction::Forward).unwrap();

        assert_eq!(log.coil_writes(MotorId::Motor1)[0], PHASE_TABLE[6]);
    }

    #[test]
    fn test_zero_steps_only_releases() {
        let log = TraceLog::default();
        let mut seq = bound_sequencer(&log);
        seq.step(MotorId::Motor1, 2, Direction::Forward).unwrap();
        log.clear();

        seq.step(MotorId::Motor1, 0, Direction::Backward).unwrap();

        assert_eq!(log.entries(), vec![Trace::Coil(MotorId::Motor1, PhasePattern::OFF)]);
        assert_eq!(seq.phase(MotorId::Motor1).get(), 2);
    }

    #[test]
    fn test_only_target_motor_changes() {
        let log = TraceLog::default();
        let mut seq = bound_sequencer(&log);

        seq.step(MotorId::Motor2, 9, Direction::Forward).unwrap();

        assert_eq!(seq.phase(MotorId::Motor1).get(), 0);
        assert_eq!(seq.phase(MotorId::Motor3).get(), 0);
        assert!(log.coil_writes(MotorId::Motor1).is_empty());
        assert!(log.coil_writes(MotorId::Motor3).is_empty());
    }

    #[test]
    fn test_unbound_motor_touches_nothing() {
        let log = TraceLog::default();
        let mut seq = StepSequencer::new(
            [Some(MockCoils::new(MotorId::Motor1, &log)), None, None],
            MockDelay::new(&log),
            DEFAULT_STEP_DELAY_US,
        );

        let result = seq.step(MotorId::Motor3, 10, Direction::Forward);

        assert_eq!(result, Err(StepError::Unbound(MotorId::Motor3)));
        assert!(log.entries().is_empty());
        assert_eq!(seq.phase(MotorId::Motor3).get(), 0);
        assert!(!seq.is_bound(MotorId::Motor3));
    }

    #[test]
    fn test_write_failure_still_releases() {
        let log = TraceLog::default();
        let mut seq = StepSequencer::new(
            [Some(MockCoils::failing_after(MotorId::Motor1, &log, 2)), None, None],
            MockDelay::new(&log),
            DEFAULT_STEP_DELAY_US,
        );

        let result = seq.step(MotorId::Motor1, 10, Direction::Forward);

        assert_eq!(
            result,
            Err(StepError::Coil {
                motor: MotorId::Motor1,
                error: CoilError::LineWrite(0),
            })
        );
        assert!(result.unwrap_err().is_hardware_fault());
        assert_eq!(log.coil_writes(MotorId::Motor1).last(), Some(&PhasePattern::OFF));
    }

    #[test]
    fn test_pause_uses_delay() {
        let log = TraceLog::default();
        let mut seq = bound_sequencer(&log);

        seq.pause_ms(50);

        assert_eq!(log.entries(), vec![Trace::DelayMs(50)]);
    }

    proptest! {
        #[test]
        fn prop_phase_index_tracks_steps(
            motor in 1u8..=3,
            warmup in 0u32..40,
            steps in 0u32..200,
            forward in any::<bool>(),
        ) {
            let motor = MotorId::try_from(motor).unwrap();
            let direction = if forward { Direction::Forward } else { Direction::Backward };
            let log = TraceLog::default();
            let mut seq = bound_sequencer(&log);

            seq.step(motor, warmup, Direction::Forward).unwrap();
            let initial = seq.phase(motor).get() as i64;

            seq.step(motor, steps, direction).unwrap();

            let expected = (initial + direction.offset() as i64 * steps as i64)
                .rem_euclid(PHASE_COUNT as i64);
            prop_assert_eq!(seq.phase(motor).get() as i64, expected);
            prop_assert_eq!(seq.coils(motor).unwrap().pattern(), PhasePattern::OFF);
        }
    }
}
