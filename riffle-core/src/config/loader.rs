//! TOML configuration loading

use super::{ConfigError, MachineConfig};

/// Parse and validate a `machine.toml` document
///
/// Missing sections take their defaults. Unknown motor numbers fail
/// to parse.
pub fn from_toml(input: &str) -> Result<MachineConfig, ConfigError> {
    let config: MachineConfig = toml::from_str(input).map_err(|e| ConfigError::Parse {
        line: e.span().map_or(0, |span| line_of(input, span.start)),
    })?;
    config.validate()?;
    Ok(config)
}

/// 1-based line number of a byte offset
fn line_of(input: &str, offset: usize) -> u32 {
    let offset = offset.min(input.len());
    let newlines = input.as_bytes()[..offset].iter().filter(|b| **b == b'\n').count();
    newlines as u32 + 1
}
