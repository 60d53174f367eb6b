//! Build script for ecodash-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates ecodash.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

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

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate ecodash.toml configuration at compile time
fn validate_config() {
    // Re-run if ecodash.toml changes
    println!("cargo:rerun-if-changed=ecodash.toml");

    let config_path = Path::new("ecodash.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: ecodash.toml not found!                                  ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds ecodash.toml at build time.                 ║\n\
            ║  Please create one in the ecodash-firmware directory.            ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read ecodash.toml                              ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Parse and validate TOML syntax
    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in ecodash.toml                      ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_wifi(&config, &mut errors);
    validate_collector(&config, &mut errors);
    validate_panel(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid ecodash.toml configuration                       ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=ecodash.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Validate the [wifi] section
fn validate_wifi(config: &toml::Value, errors: &mut Vec<String>) {
    let wifi = match config.get("wifi") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            errors.push("[wifi] must be a table".to_string());
            return;
        }
        None => {
            errors.push("Missing [wifi] section".to_string());
            return;
        }
    };

    for key in ["ssid", "psk"] {
        match wifi.get(key) {
            Some(toml::Value::String(_)) => {}
            Some(_) => errors.push(format!("[wifi] {} must be a string", key)),
            None => errors.push(format!("[wifi] missing '{}'", key)),
        }
    }
}

/// Validate the [collector] section
fn validate_collector(config: &toml::Value, errors: &mut Vec<String>) {
    let collector = match config.get("collector") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            errors.push("[collector] must be a table".to_string());
            return;
        }
        None => {
            errors.push("Missing [collector] section".to_string());
            return;
        }
    };

    match collector.get("url") {
        Some(toml::Value::String(url)) => {
            let rest = url.strip_prefix("tcp://").unwrap_or(url);
            let has_port = rest
                .rsplit_once(':')
                .is_some_and(|(host, port)| !host.is_empty() && port.parse::<u16>().is_ok());
            if !has_port {
                errors.push("[collector] url must be tcp://host:port".to_string());
            }
        }
        Some(_) => errors.push("[collector] url must be a string".to_string()),
        None => errors.push("[collector] missing 'url'".to_string()),
    }
}

/// Validate the [panel] section
fn validate_panel(config: &toml::Value, errors: &mut Vec<String>) {
    let panel = match config.get("panel") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            errors.push("[panel] must be a table".to_string());
            return;
        }
        None => return, // optional section; firmware uses defaults
    };

    if let Some(value) = panel.get("backlight") {
        match value {
            toml::Value::Integer(pct) if (0..=100).contains(pct) => {}
            _ => errors.push("[panel] backlight must be 0-100".to_string()),
        }
    }
}
