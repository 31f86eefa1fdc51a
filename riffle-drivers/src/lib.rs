//! Hardware driver implementations
//!
//! Concrete implementations of the traits defined in riffle-core:
//!
//! - Coil lines of a ULN2003-driven 28BYJ-48 stepper on four GPIOs
//! - Mode indicator on a WS2812 strip

#![no_std]
#![deny(unsafe_code)]

pub mod coil;
pub mod indicator;
