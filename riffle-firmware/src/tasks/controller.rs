//! Main controller task
//!
//! Owns the dealer. Requests from the link task are handled one at a
//! time; a job blocks this task until the deal is finished.

use defmt::*;
use embassy_time::{with_timeout, Duration, Timer};

use riffle_core::{ErrorKind, Mode, Submission};
use riffle_drivers::indicator::palette::{OFF, RED};

use crate::channels::{ControlRequest, Snapshot, CONTROL_CHANNEL, CONTROL_REPLY};
use crate::machine::MachineDealer;

/// On and off time of the halt blink
const HALT_BLINK: Duration = Duration::from_secs(1);

/// Controller task - main coordination loop
#[embassy_executor::task]
pub async fn controller_task(mut dealer: MachineDealer, input_timeout_ms: u32) {
    info!("Controller task started");

    let input_timeout = Duration::from_millis(input_timeout_ms as u64);

    loop {
        let request = if dealer.current_mode() == Mode::WaitingInput {
            match with_timeout(input_timeout, CONTROL_CHANNEL.receive()).await {
                Ok(request) => request,
                Err(_) => {
                    debug!("No input for {} ms", input_timeout_ms);
                    dealer.input_timeout();
                    continue;
                }
            }
        } else {
            CONTROL_CHANNEL.receive().await
        };

        match request {
            ControlRequest::LinkUp => {
                let mode = dealer.boot_complete();
                info!("Link up, mode {}", mode.label());
            }
            ControlRequest::LinkFailed => {
                dealer.fault(ErrorKind::NetworkUnavailable);
                halt(&mut dealer).await;
            }
            ControlRequest::ShowPage => {
                dealer.client_active();
            }
            ControlRequest::SetDeal { players, cards } => {
                match dealer.submit_job(players, cards) {
                    Submission::Accepted(outcome) => info!("Job finished: {}", outcome),
                    Submission::Rejected(reason) => warn!("Job rejected: {}", reason),
                }
            }
        }

        if request.wants_reply() {
            CONTROL_REPLY.signal(snapshot(&dealer));
        }
    }
}

fn snapshot(dealer: &MachineDealer) -> Snapshot {
    Snapshot {
        mode: dealer.current_mode(),
        job: dealer.current_job(),
        status: dealer.status(),
    }
}

/// Blink red forever; nothing clears a network failure but a reset
async fn halt(dealer: &mut MachineDealer) {
    error!("Network unavailable, halting");
    let indicator = dealer.observer_mut();
    loop {
        indicator.show_color(RED);
        Timer::after(HALT_BLINK).await;
        indicator.show_color(OFF);
        Timer::after(HALT_BLINK).await;
    }
}
