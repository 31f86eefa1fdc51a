//! WS2812 strip behind the indicator
//!
//! The strip is driven by a PIO state machine with DMA. The indicator
//! renders at most `pixels` LEDs; the rest of the frame stays dark.

use embassy_rp::peripherals::PIO0;
use embassy_rp::pio_programs::ws2812::PioWs2812;
use smart_leds::RGB8;

use riffle_drivers::indicator::{LedDriver, OFF};

/// Longest strip the firmware drives
pub const MAX_PIXELS: usize = 32;

/// [`LedDriver`] over the PIO WS2812 program
pub struct Ws2812Strip {
    ws: PioWs2812<'static, PIO0, 0, MAX_PIXELS>,
    frame: [RGB8; MAX_PIXELS],
}

impl Ws2812Strip {
    pub fn new(ws: PioWs2812<'static, PIO0, 0, MAX_PIXELS>) -> Self {
        Self {
            ws,
            frame: [OFF; MAX_PIXELS],
        }
    }
}

impl LedDriver for Ws2812Strip {
    fn write(&mut self, colors: &[RGB8]) {
        for (slot, color) in self
            .frame
            .iter_mut()
            .zip(colors.iter().copied().chain(core::iter::repeat(OFF)))
        {
            *slot = color;
        }
        // DMA transfer of a few hundred bytes; completes in well under 1 ms
        embassy_futures::block_on(self.ws.write(&self.frame));
    }
}
