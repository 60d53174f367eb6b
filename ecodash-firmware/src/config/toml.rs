//! Simple TOML parser for the dashboard configuration
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! Ecodash configuration. It does NOT support the full TOML spec.
//!
//! Supported features:
//! - Key = value pairs (string, integer)
//! - [section] headers
//! - Comments (# ...)
//!
//! NOT supported:
//! - Multi-line strings
//! - Arrays, inline tables, nested sections
//! - Datetime values

use ecodash_core::config::{parse_endpoint, DashConfig};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum ConfigError {
    /// Unknown section header
    InvalidSection,
    /// Line is not a key = value pair
    InvalidLine,
    /// Value has the wrong type, is malformed, or exceeds its capacity
    InvalidValue,
}

/// Current parsing context
#[derive(Debug, Clone, Copy)]
enum Section {
    Root,
    Wifi,
    Collector,
    Panel,
}

/// Parse TOML configuration into DashConfig
///
/// Unknown keys inside known sections are skipped so a newer config file
/// still loads on older firmware.
pub fn parse_config(input: &str) -> Result<DashConfig, ConfigError> {
    let mut config = DashConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Check for section header
        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(&line[1..line.len() - 1])?;
            continue;
        }

        let (key, value) = line.split_once('=').ok_or(ConfigError::InvalidLine)?;
        let key = key.trim();
        let value = value.trim();

        match section {
            Section::Root => return Err(ConfigError::InvalidLine),
            Section::Wifi => match key {
                "ssid" => config.wifi.ssid = parse_string(value)?,
                "psk" => config.wifi.psk = parse_string(value)?,
                _ => {}
            },
            Section::Collector => match key {
                "url" => {
                    let (host, port) =
                        parse_endpoint(parse_str(value)?).ok_or(ConfigError::InvalidValue)?;
                    config.collector.host = host;
                    config.collector.port = port;
                }
                "device" => config.collector.device = parse_string(value)?,
                _ => {}
            },
            Section::Panel => match key {
                "backlight" => {
                    let percent = parse_int(value)?;
                    if !(0..=100).contains(&percent) {
                        return Err(ConfigError::InvalidValue);
                    }
                    config.panel.backlight = percent as u8;
                }
                _ => {}
            },
        }
    }

    Ok(config)
}

fn parse_section_header(name: &str) -> Result<Section, ConfigError> {
    match name.trim() {
        "wifi" => Ok(Section::Wifi),
        "collector" => Ok(Section::Collector),
        "panel" => Ok(Section::Panel),
        _ => Err(ConfigError::InvalidSection),
    }
}

/// Strip the quotes from a TOML string value
fn parse_str(value: &str) -> Result<&str, ConfigError> {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        Ok(&value[1..value.len() - 1])
    } else {
        Err(ConfigError::InvalidValue)
    }
}

fn parse_string<const N: usize>(value: &str) -> Result<heapless::String<N>, ConfigError> {
    let mut out = heapless::String::new();
    out.push_str(parse_str(value)?)
        .map_err(|_| ConfigError::InvalidValue)?;
    Ok(out)
}

fn parse_int(value: &str) -> Result<i32, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue)
}
