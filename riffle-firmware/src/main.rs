//! Riffle - Card Shuffler/Dealer Firmware
//!
//! Main firmware binary for an RP2040 driving three unipolar steppers
//! (two shuffle feeders, one dealer), a WS2812 status strip and an ESP-AT
//! WiFi module that carries the control page.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::clocks::RoscRng;
use embassy_rp::peripherals::{PIO0, UART0};
use embassy_rp::pio::Pio;
use embassy_rp::pio_programs::ws2812::{PioWs2812, PioWs2812Program};
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use riffle_core::config::{parse_config, MachineConfig};
use riffle_core::ErrorKind;

mod channels;
mod indicator;
mod machine;
mod pins;
mod tasks;

/// Embedded machine configuration (compiled into firmware)
/// Edit machine.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../machine.toml");

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    PIO0_IRQ_0 => embassy_rp::pio::InterruptHandler<PIO0>;
});

// Static cells for UART buffers (must live forever)
// RX holds a whole HTTP request arriving while a job runs
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 2048]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Riffle firmware starting...");

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let (config, config_ok) = load_config();

    // Status strip on PIO0 (GPIO16)
    let Pio {
        mut common, sm0, ..
    } = Pio::new(p.PIO0, Irqs);
    let program = PioWs2812Program::new(&mut common);
    let ws = PioWs2812::new(&mut common, sm0, p.DMA_CH0, p.PIN_16, &program);
    let strip = indicator::Ws2812Strip::new(ws);

    // Coil lines from config
    let mut bank = pin_bank!(p);
    let (coils, bound) = machine::bind_motors(&config, &mut bank);
    for motor in config.unbound_motors() {
        warn!("Motor {} has no coil binding, its moves will be skipped", motor.number());
    }

    let seed = RoscRng.next_u64();
    debug!("Shuffle seed {=u64:x}", seed);
    let rng = SmallRng::seed_from_u64(seed);

    let mut dealer = machine::build_dealer(&config, coils, strip, rng);

    // Setup UART for the ESP-AT module
    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 2048]);
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, UartConfig::default());
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    info!("UART initialized for ESP-AT");

    if !config_ok || bound.is_err() {
        // Stays in Error; the link still comes up so the page shows the fault
        dealer.fault(ErrorKind::ConfigError);
    }

    // Spawn tasks
    spawner
        .spawn(tasks::controller_task(dealer, config.ui.input_timeout_ms))
        .unwrap();
    spawner
        .spawn(tasks::link_task(uart, config.network.clone()))
        .unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

/// Parse the embedded configuration
///
/// An unusable file falls back to the built-in defaults so the indicator
/// and control page can still report the error.
fn load_config() -> (MachineConfig, bool) {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Parsed embedded configuration successfully");
            (config, true)
        }
        Err(e) => {
            error!("Failed to parse embedded config: {}", e);
            error!("Using built-in defaults");
            (MachineConfig::default(), false)
        }
    }
}
