//! Inter-task communication channels
//!
//! The link task turns HTTP requests into [`ControlRequest`]s; the
//! controller task owns the dealer, handles one request at a time and
//! answers with a [`Snapshot`] for the page.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use heapless::String;

use riffle_core::controller::STATUS_LEN;
use riffle_core::{JobRequest, Mode};

/// Channel capacity for control requests
const CONTROL_CHANNEL_SIZE: usize = 4;

/// Requests from the link task to the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlRequest {
    /// WiFi joined and the server is listening
    LinkUp,
    /// Bring-up gave up
    LinkFailed,
    /// The control page was requested
    ShowPage,
    /// A job was submitted from the form
    SetDeal { players: i32, cards: i32 },
}

impl ControlRequest {
    /// Check if the link task waits for a [`Snapshot`] after this request
    pub fn wants_reply(&self) -> bool {
        matches!(self, ControlRequest::ShowPage | ControlRequest::SetDeal { .. })
    }
}

/// Machine state rendered on the page
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Snapshot {
    pub mode: Mode,
    pub job: JobRequest,
    pub status: String<STATUS_LEN>,
}

/// Control requests from the link task
pub static CONTROL_CHANNEL: Channel<CriticalSectionRawMutex, ControlRequest, CONTROL_CHANNEL_SIZE> =
    Channel::new();

/// Controller answer to the last page or job request
pub static CONTROL_REPLY: Signal<CriticalSectionRawMutex, Snapshot> = Signal::new();
