//! Line-oriented `machine.toml` reader
//!
//! A small reader for the subset of TOML that `machine.toml` uses, for
//! targets where the `toml` crate is not available. Needs no allocator.
//!
//! Supported:
//! - `key = value` with integers (`_` separators, `+` sign and
//!   `0x`/`0o`/`0b` prefixes allowed), quoted strings and flat integer
//!   arrays
//! - `[section]` headers and the `[[motors]]` array of tables
//! - quoted keys, and `section.key` dotted keys before the first header
//! - `#` comments
//!
//! Not supported: escapes inside strings, inline tables, multi-line
//! values, deeper dotted keys. Those are parse errors, never skipped, so a
//! document either reads the same as with the serde loader or fails.
//! Unknown sections and bare keys are ignored, like the serde loader.

use super::{ConfigError, MachineConfig, MotorBinding};
use crate::motion::MotorId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Motor,
    Motion,
    Shuffle,
    Deal,
    Ui,
    Indicator,
    Network,
    Unknown,
}

/// `[[motors]]` table being read
#[derive(Debug, Clone, Copy)]
struct PendingMotor {
    header_line: u32,
    motor: Option<MotorId>,
    pins: Option<[u8; 4]>,
}

/// Parse and validate a `machine.toml` document
pub fn parse_config(input: &str) -> Result<MachineConfig, ConfigError> {
    let mut config = MachineConfig::new();
    let mut section = Section::Root;
    let mut pending: Option<PendingMotor> = None;
    let mut motors_listed = false;

    for (index, raw) in input.lines().enumerate() {
        let line_no = index as u32 + 1;
        let error = ConfigError::Parse { line: line_no };
        let line = strip_comment(raw).trim();

        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') {
            finish_motor(&mut config, pending.take())?;

            if line == "[[motors]]" {
                // Listing motors replaces the default bindings
                if !motors_listed {
                    config.motors.clear();
                    motors_listed = true;
                }
                pending = Some(PendingMotor {
                    header_line: line_no,
                    motor: None,
                    pins: None,
                });
                section = Section::Motor;
                continue;
            }

            let name = line
                .strip_prefix('[')
                .and_then(|l| l.strip_suffix(']'))
                .ok_or(error)?;
            section = parse_section(name.trim());
            continue;
        }

        let (key, value) = line.split_once('=').ok_or(error)?;
        let (key, value) = (key.trim(), value.trim());
        if key.is_empty() || value.is_empty() {
            return Err(error);
        }

        let (target, key) = resolve_key(section, key).ok_or(error)?;
        let applied = match target {
            Section::Motor => pending.as_mut().and_then(|m| apply_motor(m, key, value)),
            _ => apply_value(&mut config, target, key, value),
        };
        applied.ok_or(error)?;
    }

    finish_motor(&mut config, pending)?;
    config.validate()?;
    Ok(config)
}

fn parse_section(name: &str) -> Section {
    match name {
        "motion" => Section::Motion,
        "shuffle" => Section::Shuffle,
        "deal" => Section::Deal,
        "ui" => Section::Ui,
        "indicator" => Section::Indicator,
        "network" => Section::Network,
        _ => Section::Unknown,
    }
}

fn finish_motor(
    config: &mut MachineConfig,
    pending: Option<PendingMotor>,
) -> Result<(), ConfigError> {
    let Some(pending) = pending else {
        return Ok(());
    };
    let error = ConfigError::Parse {
        line: pending.header_line,
    };
    let (Some(motor), Some(pins)) = (pending.motor, pending.pins) else {
        return Err(error);
    };
    config
        .motors
        .push(MotorBinding::new(motor, pins))
        .map_err(|_| error)
}

fn apply_motor(pending: &mut PendingMotor, key: &str, value: &str) -> Option<()> {
    match key {
        "motor" => pending.motor = Some(parse_motor(value)?),
        "pins" => pending.pins = Some(parse_array(value)?),
        _ => {}
    }
    Some(())
}

/// Apply one key; `None` means the value did not parse
fn apply_value(config: &mut MachineConfig, section: Section, key: &str, value: &str) -> Option<()> {
    match (section, key) {
        (Section::Root, "version") => config.version = parse_int(value)?,

        (Section::Motion, "step_delay_us") => config.motion.step_delay_us = parse_int(value)?,

        (Section::Shuffle, "motors") => {
            let [a, b]: [u8; 2] = parse_array(value)?;
            config.shuffle.motors = [MotorId::try_from(a).ok()?, MotorId::try_from(b).ok()?];
        }
        (Section::Shuffle, "moves") => config.shuffle.moves = parse_int(value)?,
        (Section::Shuffle, "steps_per_release") => {
            config.shuffle.steps_per_release = parse_int(value)?
        }
        (Section::Shuffle, "move_pause_ms") => config.shuffle.move_pause_ms = parse_int(value)?,

        (Section::Deal, "motor") => config.deal.motor = parse_motor(value)?,
        (Section::Deal, "steps_per_card") => config.deal.steps_per_card = parse_int(value)?,
        (Section::Deal, "settle_ms") => config.deal.settle_ms = parse_int(value)?,
        (Section::Deal, "card_pause_ms") => config.deal.card_pause_ms = parse_int(value)?,
        (Section::Deal, "hand_pause_ms") => config.deal.hand_pause_ms = parse_int(value)?,

        (Section::Ui, "notice_ms") => config.ui.notice_ms = parse_int(value)?,
        (Section::Ui, "input_timeout_ms") => config.ui.input_timeout_ms = parse_int(value)?,

        (Section::Indicator, "pixels") => config.indicator.pixels = parse_int(value)?,
        (Section::Indicator, "brightness") => config.indicator.brightness = parse_int(value)?,

        (Section::Network, "ssid") => config.network.ssid = parse_string(value)?.try_into().ok()?,
        (Section::Network, "password") => {
            config.network.password = parse_string(value)?.try_into().ok()?
        }
        (Section::Network, "port") => config.network.port = parse_int(value)?,
        (Section::Network, "join_attempts") => config.network.join_attempts = parse_int(value)?,

        _ => {}
    }
    Some(())
}

/// Resolve quoted and dotted keys to the section they address
///
/// `None` for keys this reader cannot place exactly.
fn resolve_key(section: Section, key: &str) -> Option<(Section, &str)> {
    if let Some(bare) = unquote_key(key) {
        return Some((section, bare));
    }
    match key.split_once('.') {
        None if is_bare_key(key) => Some((section, key)),
        Some((table, key)) if section == Section::Root => {
            let (table, key) = (table.trim(), key.trim());
            if !is_bare_key(table) || !is_bare_key(key) || table == "motors" {
                return None;
            }
            Some((parse_section(table), key))
        }
        _ => None,
    }
}

/// `"name"` or `'name'` holding a bare key
fn unquote_key(key: &str) -> Option<&str> {
    let inner = key
        .strip_prefix('"')
        .and_then(|k| k.strip_suffix('"'))
        .or_else(|| key.strip_prefix('\'').and_then(|k| k.strip_suffix('\'')))?;
    is_bare_key(inner).then_some(inner)
}

fn is_bare_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Drop a trailing comment that is not inside a string
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

fn parse_string(value: &str) -> Option<&str> {
    value.strip_prefix('"')?.strip_suffix('"')
}

/// Parse a non-negative integer the way TOML writes them
///
/// `_` only between digits, no leading zeros in decimal.
fn parse_int<T: TryFrom<u32>>(value: &str) -> Option<T> {
    let (radix, digits) = match value.get(..2) {
        Some("0x") => (16, &value[2..]),
        Some("0o") => (8, &value[2..]),
        Some("0b") => (2, &value[2..]),
        _ => {
            let digits = value.strip_prefix('+').unwrap_or(value);
            if digits.len() > 1 && digits.starts_with('0') {
                return None;
            }
            (10, digits)
        }
    };
    if digits.is_empty()
        || digits.starts_with('_')
        || digits.ends_with('_')
        || digits.contains("__")
    {
        return None;
    }

    let mut result: u32 = 0;
    for c in digits.chars().filter(|c| *c != '_') {
        let digit = c.to_digit(radix)?;
        result = result.checked_mul(radix)?.checked_add(digit)?;
    }
    T::try_from(result).ok()
}

fn parse_motor(value: &str) -> Option<MotorId> {
    MotorId::try_from(parse_int::<u8>(value)?).ok()
}

/// Parse `[a, b, ...]` with exactly `N` integers
fn parse_array<const N: usize>(value: &str) -> Option<[u8; N]> {
    let inner = value.strip_prefix('[')?.strip_suffix(']')?;
    let mut out = [0u8; N];
    let mut count = 0;
    for item in inner.split(',').map(str::trim) {
        if item.is_empty() {
            // Trailing comma
            continue;
        }
        *out.get_mut(count)? = parse_int(item)?;
        count += 1;
    }
    (count == N).then_some(out)
}
