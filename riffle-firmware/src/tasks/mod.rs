//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod controller;
pub mod link;

pub use controller::controller_task;
pub use link::link_task;
