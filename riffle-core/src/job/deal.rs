//! Deal procedure
//!
//! Pushes out one card at a time from the deal motor. There is no card
//! sensing: one card per `steps_per_card` is a calibration assumption.

use embedded_hal::delay::DelayNs;

use super::{Job, JobError, ProcedureReport};
use crate::config::DealConfig;
use crate::motion::{Direction, StepSequencer};
use crate::state::Mode;
use crate::traits::CoilDriver;

/// Deal procedure
#[derive(Debug, Clone, Copy)]
pub struct DealProcedure {
    config: DealConfig,
}

impl DealProcedure {
    pub fn new(config: DealConfig) -> Self {
        Self { config }
    }

    /// Deal `players × cards_per_player` cards
    ///
    /// Each card: move, settle, power down, then a short pause or a hand
    /// pause after the last card of a hand. Only allowed in
    /// [`Mode::Dealing`].
    pub fn run<C, D>(
        &self,
        mode: Mode,
        job: &Job,
        sequencer: &mut StepSequencer<C, D>,
    ) -> Result<ProcedureReport, JobError>
    where
        C: CoilDriver,
        D: DelayNs,
    {
        if mode != Mode::Dealing {
            return Err(JobError::WrongMode(mode));
        }

        let motor = self.config.motor;
        let total = job.total_cards();
        let mut report = ProcedureReport::default();

        for card in 0..total {
            #[cfg(feature = "defmt")]
            defmt::debug!("Dealing card {}/{}", card + 1, total);

            let result = sequencer.step(motor, self.config.steps_per_card, Direction::Forward);
            let moved = report.absorb(result)?;
            sequencer.pause_ms(self.config.settle_ms);

            if moved {
                report.movements += 1;
                report.absorb(sequencer.release(motor))?;
            }

            if job.ends_hand(card) {
                sequencer.pause_ms(self.config.hand_pause_ms);
            } else {
                sequencer.pause_ms(self.config.card_pause_ms);
            }
        }

        Ok(report)
    }
}
