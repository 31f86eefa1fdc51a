//! Hardware abstraction traits
//!
//! These traits define the interface between the sequencing logic and the
//! board-specific implementations in `riffle-drivers` and the firmware.

pub mod coil;
pub mod indicator;

pub use coil::{CoilDriver, CoilError};
pub use indicator::{ModeObserver, NoopObserver};
