//! Test doubles shared by the unit tests
//!
//! Coils and delay write into one shared trace so tests can check the
//! exact interleaving of coil writes and pauses.

use std::cell::RefCell;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;

use crate::motion::sequencer::DEFAULT_STEP_DELAY_US;
use crate::motion::{MotorId, PhasePattern, StepSequencer};
use crate::traits::{CoilDriver, CoilError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trace {
    Coil(MotorId, PhasePattern),
    DelayUs(u32),
    DelayMs(u32),
}

#[derive(Debug, Clone, Default)]
pub struct TraceLog(Rc<RefCell<Vec<Trace>>>);

impl TraceLog {
    pub fn push(&self, trace: Trace) {
        self.0.borrow_mut().push(trace);
    }

    pub fn entries(&self) -> Vec<Trace> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    pub fn coil_writes(&self, motor: MotorId) -> Vec<PhasePattern> {
        self.0
            .borrow()
            .iter()
            .filter_map(|t| match t {
                Trace::Coil(m, p) if *m == motor => Some(*p),
                _ => None,
            })
            .collect()
    }

    /// Energizing writes (steps) for a motor
    pub fn steps(&self, motor: MotorId) -> usize {
        self.coil_writes(motor)
            .iter()
            .filter(|p| **p != PhasePattern::OFF)
            .count()
    }

    /// Separate movements (runs of energizing writes) for a motor
    pub fn movements(&self, motor: MotorId) -> usize {
        let mut count = 0;
        let mut energized = false;
        for pattern in self.coil_writes(motor) {
            let on = pattern != PhasePattern::OFF;
            if on && !energized {
                count += 1;
            }
            energized = on;
        }
        count
    }

    /// Millisecond pauses in order
    pub fn pauses(&self) -> Vec<u32> {
        self.0
            .borrow()
            .iter()
            .filter_map(|t| match t {
                Trace::DelayMs(ms) => Some(*ms),
                _ => None,
            })
            .collect()
    }
}

pub struct MockCoils {
    motor: MotorId,
    pattern: PhasePattern,
    log: TraceLog,
    fail_after: Option<usize>,
    writes: usize,
}

impl MockCoils {
    pub fn new(motor: MotorId, log: &TraceLog) -> Self {
        Self {
            motor,
            pattern: PhasePattern::OFF,
            log: log.clone(),
            fail_after: None,
            writes: 0,
        }
    }

    /// Energizing writes start failing after `n` successful ones
    pub fn failing_after(motor: MotorId, log: &TraceLog, n: usize) -> Self {
        Self {
            fail_after: Some(n),
            ..Self::new(motor, log)
        }
    }
}

impl CoilDriver for MockCoils {
    fn apply(&mut self, pattern: PhasePattern) -> Result<(), CoilError> {
        if pattern != PhasePattern::OFF {
            if let Some(limit) = self.fail_after {
                if self.writes >= limit {
                    return Err(CoilError::LineWrite(0));
                }
            }
            self.writes += 1;
        }
        self.pattern = pattern;
        self.log.push(Trace::Coil(self.motor, pattern));
        Ok(())
    }

    fn pattern(&self) -> PhasePattern {
        self.pattern
    }
}

pub struct MockDelay {
    log: TraceLog,
}

impl MockDelay {
    pub fn new(log: &TraceLog) -> Self {
        Self { log: log.clone() }
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.log.push(Trace::DelayUs(ns / 1_000));
    }

    fn delay_us(&mut self, us: u32) {
        self.log.push(Trace::DelayUs(us));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.log.push(Trace::DelayMs(ms));
    }
}

/// Sequencer with all three motors bound to mock coils
pub fn bound_sequencer(log: &TraceLog) -> StepSequencer<MockCoils, MockDelay> {
    StepSequencer::new(
        MotorId::ALL.map(|m| Some(MockCoils::new(m, log))),
        MockDelay::new(log),
        DEFAULT_STEP_DELAY_US,
    )
}

/// Observer recording every mode it is told about
#[derive(Debug, Clone, Default)]
pub struct ModeLog(Rc<RefCell<Vec<crate::state::Mode>>>);

impl ModeLog {
    pub fn modes(&self) -> Vec<crate::state::Mode> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

impl crate::traits::ModeObserver for ModeLog {
    fn on_mode_change(&mut self, mode: crate::state::Mode) {
        self.0.borrow_mut().push(mode);
    }
}
