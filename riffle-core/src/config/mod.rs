//! Configuration types
//!
//! Board-agnostic configuration read once at boot. The firmware embeds a
//! `machine.toml`; every movement constant lives here. Card handling is
//! open-loop and depends on physical calibration.
//!
//! Two readers exist: [`parse_config`] runs on the device without an
//! allocator, `from_toml` (feature `toml`) uses serde and the `toml` crate
//! for host tools and the firmware build script.

pub mod hardware;
pub mod text;
pub mod types;

#[cfg(feature = "toml")]
mod loader;

pub use hardware::*;
pub use text::parse_config;
pub use types::*;

#[cfg(feature = "toml")]
pub use loader::from_toml;
