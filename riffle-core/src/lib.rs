//! Board-agnostic core logic for the Riffle card shuffler/dealer
//!
//! This crate contains everything that does not depend on a specific
//! board:
//!
//! - Coil and indicator traits implemented by the drivers crate
//! - The 8-phase step sequencer for 4-wire unipolar steppers
//! - The machine mode state machine
//! - Shuffle and deal procedures
//! - The [`Dealer`] controller that admits jobs and runs them
//! - Configuration type definitions

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod controller;
pub mod job;
pub mod motion;
pub mod state;
pub mod traits;

pub use controller::{Dealer, JobOutcome, Submission};
pub use job::{JobRequest, RejectReason};
pub use motion::{MotorId, StepSequencer};
pub use state::{ErrorKind, Event, Mode};

#[cfg(test)]
pub(crate) mod mock;
