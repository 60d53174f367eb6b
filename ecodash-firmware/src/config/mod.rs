//! Configuration loading and parsing
//!
//! The configuration document is embedded at build time and parsed once at
//! startup by a custom no_std TOML-subset parser. There is no runtime
//! persistence: a bad document falls back to `DashConfig::default()` and
//! the dashboard proceeds display-only rather than refusing to boot.

pub mod toml;

pub use toml::{parse_config, ConfigError};

use defmt::*;

use ecodash_core::config::DashConfig;

/// Parse the embedded configuration, falling back to safe defaults
pub fn load(embedded: &str) -> DashConfig {
    match parse_config(embedded) {
        Ok(config) => {
            info!("Configuration loaded");
            config
        }
        Err(e) => {
            warn!("Invalid embedded configuration ({:?}), using defaults", e);
            DashConfig::default()
        }
    }
}
