//! Mode indicator strip
//!
//! Fills a WS2812 strip with one color per machine mode. The strip is
//! written through [`LedDriver`] so the board crate can plug in its PIO
//! or SPI backend.

pub mod palette;

pub use palette::{mode_color, OFF};

use riffle_core::state::Mode;
use riffle_core::traits::ModeObserver;
use smart_leds::{brightness, RGB8};

/// Abstract LED strip writer
pub trait LedDriver {
    /// Write colors to the strip, first pixel first
    fn write(&mut self, colors: &[RGB8]);
}

/// Mode indicator over a strip of up to `N` pixels
pub struct Indicator<L, const N: usize> {
    driver: L,
    frame: [RGB8; N],
    pixels: usize,
    brightness: u8,
}

impl<L: LedDriver, const N: usize> Indicator<L, N> {
    /// Create an indicator lighting the first `pixels` pixels
    ///
    /// `pixels` is clamped to `N`.
    pub fn new(driver: L, pixels: u8, brightness: u8) -> Self {
        Self {
            driver,
            frame: [OFF; N],
            pixels: usize::from(pixels).min(N),
            brightness,
        }
    }

    /// Fill the strip with one color
    pub fn show_color(&mut self, color: RGB8) {
        let scaled = brightness(core::iter::repeat(color).take(self.pixels), self.brightness);
        for (pixel, value) in self.frame.iter_mut().zip(scaled) {
            *pixel = value;
        }
        self.driver.write(&self.frame[..self.pixels]);
    }

    /// Show the color of a mode
    pub fn show_mode(&mut self, mode: Mode) {
        self.show_color(mode_color(mode));
    }

    /// Turn every pixel off
    pub fn clear(&mut self) {
        self.show_color(OFF);
    }

    /// Last frame written
    pub fn frame(&self) -> &[RGB8] {
        &self.frame[..self.pixels]
    }
}

impl<L: LedDriver, const N: usize> ModeObserver for Indicator<L, N> {
    fn on_mode_change(&mut self, mode: Mode) {
        self.show_mode(mode);
    }
}
