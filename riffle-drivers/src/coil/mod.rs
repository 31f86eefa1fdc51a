//! Coil line drivers

pub mod gpio;

pub use gpio::GpioCoilBank;
