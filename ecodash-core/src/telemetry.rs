//! Telemetry snapshot
//!
//! The merged per-tick view of everything the dashboard knows. Each
//! source updates its own field when it produced data this tick; a silent
//! source leaves its previous value in place, so the panel never flickers
//! back to a placeholder just because one read came up empty.

use heapless::String;

use ecodash_protocol::nmea::{PositionSentence, MAX_FIELD_LEN};

/// The merged telemetry state, rebuilt once per tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetrySnapshot {
    /// Latest instrument-bus speed value
    pub speed: u32,
    /// Latest GPS ground speed, verbatim receiver text
    pub ground_speed: String<MAX_FIELD_LEN>,
}

impl Default for TelemetrySnapshot {
    fn default() -> Self {
        Self {
            speed: 0,
            ground_speed: String::new(),
        }
    }
}

impl TelemetrySnapshot {
    /// Merge a fresh instrument-bus sample
    pub fn update_speed(&mut self, speed: u32) {
        self.speed = speed;
    }

    /// Merge a fresh positioning record
    pub fn update_position(&mut self, sentence: &PositionSentence) {
        self.ground_speed = sentence.ground_speed.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_snapshot() {
        let snapshot = TelemetrySnapshot::default();
        assert_eq!(snapshot.speed, 0);
        assert!(snapshot.ground_speed.is_empty());
    }

    #[test]
    fn test_updates_are_independent() {
        let mut snapshot = TelemetrySnapshot::default();
        snapshot.update_speed(20);

        let mut ground_speed = String::new();
        ground_speed.push_str("36.4").unwrap();
        snapshot.update_position(&PositionSentence { ground_speed });

        assert_eq!(snapshot.speed, 20);
        assert_eq!(snapshot.ground_speed.as_str(), "36.4");

        // A later speed update leaves the position field alone.
        snapshot.update_speed(21);
        assert_eq!(snapshot.ground_speed.as_str(), "36.4");
    }
}
