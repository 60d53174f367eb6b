//! Configuration type definitions
//!
//! A fixed-schema view of `ecodash.toml`. The firmware parses the
//! embedded document into these types at boot; any load failure falls
//! back to `DashConfig::default()` and the dashboard proceeds without an
//! uplink rather than refusing to start.

use heapless::String;

/// Maximum network name length
pub const MAX_SSID_LEN: usize = 32;

/// Maximum shared secret length
pub const MAX_PSK_LEN: usize = 64;

/// Maximum collector host name length
pub const MAX_HOST_LEN: usize = 64;

/// Maximum device identifier length
pub const MAX_DEVICE_LEN: usize = 24;

/// Wireless credentials
///
/// Defaults are empty: with no SSID configured the link monitor's join
/// requests are skipped and the dashboard runs display-only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WifiConfig {
    /// Network identifier
    pub ssid: String<MAX_SSID_LEN>,
    /// Shared secret; empty means an open network
    pub psk: String<MAX_PSK_LEN>,
}

/// Remote collector endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CollectorConfig {
    /// Collector host name or IPv4 literal
    pub host: String<MAX_HOST_LEN>,
    /// Collector TCP port
    pub port: u16,
    /// Device identifier sent in the hello line
    pub device: String<MAX_DEVICE_LEN>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        let mut device = String::new();
        let _ = device.push_str("ecodash");
        Self {
            host: String::new(),
            port: 9000,
            device,
        }
    }
}

impl CollectorConfig {
    /// Whether an endpoint is configured at all
    pub fn is_configured(&self) -> bool {
        !self.host.is_empty() && self.port != 0
    }
}

/// Display panel settings
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PanelConfig {
    /// Backlight brightness in percent (0-100)
    pub backlight: u8,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self { backlight: 80 }
    }
}

/// Complete dashboard configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DashConfig {
    pub wifi: WifiConfig,
    pub collector: CollectorConfig,
    pub panel: PanelConfig,
}

/// Parse a collector endpoint of the form `tcp://host:port` or `host:port`
///
/// Returns the host and port, or `None` if the string has no usable port.
pub fn parse_endpoint(url: &str) -> Option<(String<MAX_HOST_LEN>, u16)> {
    let rest = url.strip_prefix("tcp://").unwrap_or(url);
    let (host, port) = rest.rsplit_once(':')?;
    if host.is_empty() {
        return None;
    }
    let port: u16 = port.parse().ok()?;

    let mut host_str = String::new();
    host_str.push_str(host).ok()?;
    Some((host_str, port))
}
