//! Text protocol for the remote telemetry collector
//!
//! The collector speaks newline-terminated ASCII lines over a persistent
//! TCP connection. On connect the client introduces itself with a hello
//! line; afterwards each tick with an open session produces one report
//! line carrying both speed values.

use core::fmt::Write;

use heapless::String;

/// Protocol revision sent in the hello line
pub const PROTOCOL_VERSION: u8 = 1;

/// Maximum length of any line sent to the collector
pub const MAX_LINE_LEN: usize = 64;

/// Errors that can occur while encoding a collector line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineError {
    /// Encoded line exceeds the line capacity
    TooLong,
}

/// Build the hello line sent once per handshake
pub fn hello_line(device: &str) -> Result<String<MAX_LINE_LEN>, LineError> {
    let mut line = String::new();
    write!(line, "HELLO {} {}\n", device, PROTOCOL_VERSION).map_err(|_| LineError::TooLong)?;
    Ok(line)
}

/// Build one telemetry report line: `"<speed> <ground-speed>\n"`
pub fn report_line(speed: u32, ground_speed: &str) -> Result<String<MAX_LINE_LEN>, LineError> {
    let mut line = String::new();
    write!(line, "{} {}\n", speed, ground_speed).map_err(|_| LineError::TooLong)?;
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hello_line_format() {
        let line = hello_line("ecodash").unwrap();
        assert_eq!(line.as_str(), "HELLO ecodash 1\n");
    }

    #[test]
    fn test_report_line_carries_both_values() {
        let line = report_line(20, "36.4").unwrap();
        assert_eq!(line.as_bytes(), b"20 36.4\n");
    }

    #[test]
    fn test_report_line_with_empty_ground_speed() {
        let line = report_line(7, "").unwrap();
        assert_eq!(line.as_str(), "7 \n");
    }

    #[test]
    fn test_overlong_device_rejected() {
        let device = core::str::from_utf8(&[b'x'; MAX_LINE_LEN]).unwrap();
        assert_eq!(hello_line(device), Err(LineError::TooLong));
    }
}
