//! Build script for riffle-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates machine.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use riffle_core::config::{from_toml, parse_config, ConfigError};

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate machine.toml with both readers; the firmware boots with `parse_config`
fn validate_config() {
    println!("cargo:rerun-if-changed=machine.toml");

    let config_path = Path::new("machine.toml");
    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail(&[
            "ERROR: Failed to read machine.toml",
            "",
            &format!("Error: {}", e),
        ]),
    };

    let config = match from_toml(&content) {
        Ok(config) => config,
        Err(e) => fail(&["ERROR: Invalid machine.toml", "", &describe(&e)]),
    };

    // The device reads the file with the allocation-free reader
    match parse_config(&content) {
        Ok(device) if device == config => {}
        Ok(_) => fail(&[
            "ERROR: machine.toml reads differently on the device",
            "",
            "Use plain `key = value` lines under [section] headers",
        ]),
        Err(e) => fail(&[
            "ERROR: machine.toml is not readable on the device",
            "",
            &describe(&e),
            "Use plain `key = value` lines under [section] headers",
        ]),
    }

    for motor in config.unbound_motors() {
        println!(
            "cargo:warning=machine.toml: motor {} is used but has no pins",
            motor.number()
        );
    }
    for binding in &config.motors {
        for pin in binding.pins {
            if matches!(pin, 0 | 1 | 16) {
                fail(&[
                    "ERROR: Reserved pin in machine.toml",
                    "",
                    &format!("Motor {} uses GPIO {}", binding.motor.number(), pin),
                    "GPIO 0/1 drive the ESP-AT UART and GPIO 16 the indicator",
                ]);
            }
        }
    }
    if config.indicator.pixels > 32 {
        println!(
            "cargo:warning=machine.toml: only the first 32 of {} pixels are driven",
            config.indicator.pixels
        );
    }
    if config.network.ssid.is_empty() {
        println!("cargo:warning=machine.toml: network.ssid is empty");
    }

    println!("cargo:warning=machine.toml validated successfully");
}

fn describe(error: &ConfigError) -> String {
    match error {
        ConfigError::Parse { line } => format!("Syntax or value error near line {}", line),
        ConfigError::VersionMismatch(v) => format!("Unsupported config version {}", v),
        ConfigError::DuplicateMotor(m) => format!("Motor {} is listed twice", m.number()),
        ConfigError::InvalidPin(p) => format!("GPIO {} does not exist (0-29)", p),
        ConfigError::PinConflict(p) => format!("GPIO {} is used twice", p),
        ConfigError::SameShuffleMotors => "shuffle.motors must name two different motors".into(),
        ConfigError::DealMotorShared => "deal.motor must not be a shuffle motor".into(),
        ConfigError::ZeroSetting(key) => format!("{} must be greater than zero", key),
    }
}

/// Abort the build with a boxed error message
fn fail(lines: &[&str]) -> ! {
    let mut message = String::from(
        "\n╔══════════════════════════════════════════════════════════════════╗\n",
    );
    for line in lines {
        let line = if line.chars().count() > 64 {
            format!("{}...", line.chars().take(61).collect::<String>())
        } else {
            line.to_string()
        };
        message.push_str(&format!("║  {:<64} ║\n", line));
    }
    message.push_str("╚══════════════════════════════════════════════════════════════════╝\n");
    panic!("{}", message);
}
