//! Dealer controller
//!
//! Owns the machine mode, the last job request and the sequencer, and is
//! the only entry point for starting a job. A submission runs to the end
//! before [`Dealer::submit_job`] returns.

use core::fmt::{self, Write};

use embedded_hal::delay::DelayNs;
use heapless::String;
use rand::RngCore;

use crate::config::MachineConfig;
use crate::job::{
    DealProcedure, Job, JobError, JobReport, JobRequest, RejectReason, ShuffleProcedure,
    ValidationError,
};
use crate::motion::StepSequencer;
use crate::state::{ErrorKind, Event, Mode};
use crate::traits::{CoilDriver, ModeObserver};

/// Maximum length of a status line
pub const STATUS_LEN: usize = 64;

/// How an accepted job ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JobOutcome {
    /// Both procedures ran to the end
    Completed(JobReport),
    /// The job was aborted and the machine is in an error mode
    Aborted(JobError),
}

/// Result of [`Dealer::submit_job`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Submission {
    Accepted(JobOutcome),
    Rejected(RejectReason),
}

impl Submission {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Submission::Accepted(_))
    }
}

/// Last thing that happened to a request, for the status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LastResult {
    Finished(JobOutcome),
    Invalid(ValidationError),
}

/// Card shuffler/dealer controller
pub struct Dealer<C, D, R, O> {
    mode: Mode,
    job: JobRequest,
    last: Option<LastResult>,
    sequencer: StepSequencer<C, D>,
    rng: R,
    observer: O,
    shuffle: ShuffleProcedure,
    deal: DealProcedure,
    notice_ms: u32,
}

impl<C, D, R, O> Dealer<C, D, R, O>
where
    C: CoilDriver,
    D: DelayNs,
    R: RngCore,
    O: ModeObserver,
{
    /// Create a controller in [`Mode::Init`]
    ///
    /// The observer is told about `Init` right away.
    pub fn new(
        config: &MachineConfig,
        sequencer: StepSequencer<C, D>,
        rng: R,
        mut observer: O,
    ) -> Self {
        observer.on_mode_change(Mode::Init);
        Self {
            mode: Mode::Init,
            job: JobRequest::default(),
            last: None,
            sequencer,
            rng,
            observer,
            shuffle: ShuffleProcedure::new(config.shuffle),
            deal: DealProcedure::new(config.deal),
            notice_ms: config.ui.notice_ms,
        }
    }

    /// Current mode
    pub fn current_mode(&self) -> Mode {
        self.mode
    }

    /// Last stored job request (display only)
    pub fn current_job(&self) -> JobRequest {
        self.job
    }

    /// Outcome of the last accepted job
    pub fn last_outcome(&self) -> Option<JobOutcome> {
        match self.last {
            Some(LastResult::Finished(outcome)) => Some(outcome),
            _ => None,
        }
    }

    pub fn sequencer(&self) -> &StepSequencer<C, D> {
        &self.sequencer
    }

    /// Mode observer, for output outside of mode changes (fault blink)
    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Start-up finished; the machine is ready for requests
    pub fn boot_complete(&mut self) -> Mode {
        self.apply(Event::BootComplete)
    }

    /// Enter an error mode from outside a job (network, configuration)
    pub fn fault(&mut self, kind: ErrorKind) -> Mode {
        self.apply(Event::ErrorDetected(kind))
    }

    /// An operator opened the control page
    pub fn client_active(&mut self) -> Mode {
        self.apply(Event::ClientActive)
    }

    /// No request arrived within the input timeout
    pub fn input_timeout(&mut self) -> Mode {
        self.apply(Event::InputTimeout)
    }

    /// Submit a players/cards request
    ///
    /// Blocks until the job is finished, or until the rejection notice
    /// has been shown.
    pub fn submit_job(&mut self, players: i32, cards_per_player: i32) -> Submission {
        if !self.mode.accepts_jobs() {
            #[cfg(feature = "defmt")]
            defmt::warn!("Machine busy ({}), request dropped", self.mode.label());
            return Submission::Rejected(RejectReason::Busy(self.mode));
        }

        let request = JobRequest::new(players, cards_per_player);
        self.job = request;

        let job = match request.validate() {
            Ok(job) => job,
            Err(error) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Request rejected: {}", error.message());
                self.last = Some(LastResult::Invalid(error));
                self.apply(Event::RequestRejected);
                self.sequencer.pause_ms(self.notice_ms);
                self.apply(Event::NoticeCleared);
                return Submission::Rejected(error.into());
            }
        };

        #[cfg(feature = "defmt")]
        defmt::info!(
            "Job accepted: {} players, {} cards each",
            job.players(),
            job.cards_per_player()
        );

        self.apply(Event::JobAccepted);
        let outcome = match self.run(&job) {
            Ok(report) => JobOutcome::Completed(report),
            Err(error) => {
                #[cfg(feature = "defmt")]
                defmt::error!("Job aborted: {}", error);
                self.apply(Event::ErrorDetected(error.error_kind()));
                JobOutcome::Aborted(error)
            }
        };

        self.last = Some(LastResult::Finished(outcome));
        Submission::Accepted(outcome)
    }

    /// Human-readable status line
    pub fn status(&self) -> String<STATUS_LEN> {
        let mut status = String::new();
        if self.write_status(&mut status).is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("Status line truncated: {}", status.as_str());
        }
        status
    }

    fn write_status<W: Write>(&self, out: &mut W) -> fmt::Result {
        match (self.mode, self.last) {
            (Mode::Init, _) => out.write_str("Starting"),
            (Mode::Shuffling, _) => out.write_str("Busy: shuffling"),
            (Mode::Dealing, _) => out.write_str("Busy: dealing"),
            (Mode::Error(ErrorKind::InvalidRequest), Some(LastResult::Invalid(error))) => {
                write!(out, "Rejected: {}", error.message())
            }
            (Mode::Error(ErrorKind::InvalidRequest), _) => out.write_str("Rejected"),
            (Mode::Error(ErrorKind::HardwareFault), _) => {
                out.write_str("Fault: motor line write failed")
            }
            (Mode::Error(ErrorKind::NetworkUnavailable), _) => {
                out.write_str("Fault: network unavailable")
            }
            (Mode::Error(ErrorKind::ConfigError), _) => {
                out.write_str("Fault: configuration invalid")
            }
            (_, Some(LastResult::Invalid(error))) => {
                write!(out, "Ready (last request rejected: {})", error.message())
            }
            (_, Some(LastResult::Finished(JobOutcome::Completed(report)))) => {
                match report.unbound() {
                    Some(motor) => write!(out, "Ready (motor {} not configured)", motor.number()),
                    None => out.write_str("Ready (last job done)"),
                }
            }
            _ => out.write_str("Ready"),
        }
    }

    fn run(&mut self, job: &Job) -> Result<JobReport, JobError> {
        let shuffle = self.shuffle.run(self.mode, &mut self.sequencer, &mut self.rng)?;
        self.apply(Event::ShuffleFinished);

        let deal = self.deal.run(self.mode, job, &mut self.sequencer)?;
        self.apply(Event::DealFinished);

        Ok(JobReport { shuffle, deal })
    }

    fn apply(&mut self, event: Event) -> Mode {
        let next = self.mode.transition(event);
        if next != self.mode {
            #[cfg(feature = "defmt")]
            defmt::info!("Mode {} -> {}", self.mode.label(), next.label());
            self.mode = next;
            self.observer.on_mode_change(next);
        }
        self.mode
    }
}
