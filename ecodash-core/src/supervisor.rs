//! Per-tick supervisor logic
//!
//! The supervisor owns every piece of connectivity and telemetry state:
//! link monitor, session state, sentence assembler, and the current
//! snapshot. It is driven once per tick by the firmware task in a fixed
//! order (link, session, serial ingest, display, uplink send) and is
//! deliberately free of I/O so the whole tick is testable on the host.
//!
//! Failure policy: nothing here is fatal. Malformed serial data is
//! discarded and counted; handshake and send failures only move the
//! session state machine. The dashboard keeps rendering no matter what
//! the uplink is doing.

use ecodash_protocol::nmea::{SentenceAssembler, SentenceError};
use ecodash_protocol::speed;

use crate::link::{LinkEvent, LinkMonitor, LinkState, RadioStatus};
use crate::session::{SessionEvent, SessionState};
use crate::telemetry::TelemetrySnapshot;

/// Counters for serial decode outcomes, reported in the periodic log
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecodeStats {
    /// Complete speed frames decoded
    pub speed_frames: u32,
    /// Position sentences decoded and consumed
    pub sentences: u32,
    /// Well-formed sentences of a type we do not consume
    pub ignored: u32,
    /// Sentences discarded as malformed
    pub errors: u32,
}

/// Connectivity and telemetry state for one dashboard
pub struct Supervisor {
    /// Link-layer monitor
    link: LinkMonitor,
    /// Collector session state
    session: SessionState,
    /// Positioning sentence reassembly
    assembler: SentenceAssembler,
    /// Current merged telemetry
    snapshot: TelemetrySnapshot,
    /// Decode statistics
    stats: DecodeStats,
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl Supervisor {
    /// Create a supervisor with everything down and empty
    pub fn new() -> Self {
        Self {
            link: LinkMonitor::new(),
            session: SessionState::Closed,
            assembler: SentenceAssembler::new(),
            snapshot: TelemetrySnapshot::default(),
            stats: DecodeStats::default(),
        }
    }

    /// Current link state
    pub fn link_state(&self) -> LinkState {
        self.link.state()
    }

    /// Current session state
    pub fn session_state(&self) -> SessionState {
        self.session
    }

    /// Current merged telemetry
    pub fn snapshot(&self) -> &TelemetrySnapshot {
        &self.snapshot
    }

    /// Decode counters
    pub fn stats(&self) -> DecodeStats {
        self.stats
    }

    /// Step 1: process one radio status observation
    ///
    /// Tears down a live session when the link drops underneath it; the
    /// returned event tells the driver to log or to fire a join request.
    pub fn observe_link(&mut self, status: RadioStatus) -> Option<LinkEvent> {
        let event = self.link.observe(status);
        if self.link.state() != LinkState::Connected {
            self.session = self.session.transition(SessionEvent::LinkLost);
        }
        event
    }

    /// Step 2a: normalize a torn-down session for retry
    ///
    /// Returns true exactly once per loss so the driver can log it and
    /// discard the dead socket.
    pub fn session_retry(&mut self) -> bool {
        if self.session == SessionState::Failed {
            self.session = self.session.transition(SessionEvent::Retry);
            return true;
        }
        false
    }

    /// Step 2b: should the driver attempt a handshake this tick?
    pub fn wants_handshake(&self) -> bool {
        self.session == SessionState::Closed && self.link.state() == LinkState::Connected
    }

    /// The driver is about to run the handshake
    pub fn handshake_started(&mut self) {
        self.session = self.session.transition(SessionEvent::HandshakeStarted);
    }

    /// Report the handshake outcome
    pub fn handshake_result(&mut self, ok: bool) {
        let event = if ok {
            SessionEvent::HandshakeOk
        } else {
            SessionEvent::HandshakeFailed
        };
        self.session = self.session.transition(event);
    }

    /// The liveness probe found the collector closed the connection
    pub fn peer_closed(&mut self) {
        self.session = self.session.transition(SessionEvent::PeerClosed);
    }

    /// Step 3a: ingest one instrument-bus read
    ///
    /// A short or empty read is a normal polling outcome, not an error;
    /// the previous speed value simply stays current.
    pub fn ingest_speed(&mut self, chunk: &[u8]) {
        if let Some(value) = speed::decode(chunk) {
            self.snapshot.update_speed(value);
            self.stats.speed_frames += 1;
        }
    }

    /// Step 3b: ingest one positioning-receiver read
    ///
    /// This is the single point where sentence decode errors are
    /// deliberately discarded: a bad sentence costs nothing but a counter
    /// bump and a stale field.
    pub fn ingest_gps(&mut self, chunk: &[u8]) {
        for &byte in chunk {
            match self.assembler.feed(byte) {
                Ok(Some(sentence)) => {
                    self.snapshot.update_position(&sentence);
                    self.stats.sentences += 1;
                }
                Ok(None) => {}
                Err(SentenceError::WrongTag) => self.stats.ignored += 1,
                Err(_) => self.stats.errors += 1,
            }
        }
    }

    /// Step 5: is a telemetry send allowed this tick?
    pub fn should_send(&self) -> bool {
        self.session.is_open()
    }

    /// Report the send outcome
    pub fn send_result(&mut self, ok: bool) {
        let event = if ok {
            SessionEvent::SendOk
        } else {
            SessionEvent::SendFailed
        };
        self.session = self.session.transition(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connect_link(supervisor: &mut Supervisor) {
        assert_eq!(
            supervisor.observe_link(RadioStatus::HasAddress),
            Some(LinkEvent::CameUp)
        );
    }

    fn open_session(supervisor: &mut Supervisor) {
        connect_link(supervisor);
        assert!(supervisor.wants_handshake());
        supervisor.handshake_started();
        supervisor.handshake_result(true);
        assert_eq!(supervisor.session_state(), SessionState::Open);
    }

    #[test]
    fn test_speed_frame_reaches_snapshot() {
        let mut supervisor = Supervisor::new();
        supervisor.ingest_speed(b"\x00\x00\x00\x14");

        assert_eq!(supervisor.snapshot().speed, 20);
        assert_eq!(supervisor.stats().speed_frames, 1);
    }

    #[test]
    fn test_empty_read_keeps_previous_speed() {
        let mut supervisor = Supervisor::new();
        supervisor.ingest_speed(b"\x00\x00\x00\x14");
        supervisor.ingest_speed(b"");
        supervisor.ingest_speed(b"\x00\x01");

        assert_eq!(supervisor.snapshot().speed, 20);
        assert_eq!(supervisor.stats().speed_frames, 1);
    }

    #[test]
    fn test_gps_sentence_across_chunks() {
        let sentence = b"$GPGGA,1,2,3,4,5,6,7,36.4\r\n";
        let mut supervisor = Supervisor::new();
        supervisor.ingest_gps(&sentence[..7]);
        supervisor.ingest_gps(&sentence[7..20]);
        supervisor.ingest_gps(&sentence[20..]);

        assert_eq!(supervisor.snapshot().ground_speed.as_str(), "36.4");
        assert_eq!(supervisor.stats().sentences, 1);
    }

    #[test]
    fn test_malformed_gps_counted_not_propagated() {
        let mut supervisor = Supervisor::new();
        supervisor.ingest_gps(b"$GPGGA,1,2,3,4,5,6,7,36.4\r\n");
        supervisor.ingest_gps(b"$GPRMC,1,2,3,4,5,6,7,99.9\r\n"); // ignored type
        supervisor.ingest_gps(b"$GPGGA,1,2\r\n"); // too short

        let stats = supervisor.stats();
        assert_eq!(stats.sentences, 1);
        assert_eq!(stats.ignored, 1);
        assert_eq!(stats.errors, 1);
        // The snapshot still holds the last good value.
        assert_eq!(supervisor.snapshot().ground_speed.as_str(), "36.4");
    }

    #[test]
    fn test_link_down_requests_connect_once() {
        let mut supervisor = Supervisor::new();

        assert_eq!(
            supervisor.observe_link(RadioStatus::Idle),
            Some(LinkEvent::RequestConnect)
        );
        assert_eq!(supervisor.observe_link(RadioStatus::Idle), None);
        assert_eq!(supervisor.link_state(), LinkState::Connecting);
    }

    #[test]
    fn test_no_handshake_without_link() {
        let mut supervisor = Supervisor::new();
        assert!(!supervisor.wants_handshake());

        supervisor.observe_link(RadioStatus::Associating);
        assert!(!supervisor.wants_handshake());

        connect_link(&mut supervisor);
        assert!(supervisor.wants_handshake());
    }

    #[test]
    fn test_handshake_retry_next_tick() {
        let mut supervisor = Supervisor::new();
        connect_link(&mut supervisor);

        // Tick 1: handshake raises.
        supervisor.handshake_started();
        supervisor.handshake_result(false);
        assert_eq!(supervisor.session_state(), SessionState::Closed);

        // Tick 2: handshake succeeds.
        supervisor.observe_link(RadioStatus::HasAddress);
        assert!(supervisor.wants_handshake());
        supervisor.handshake_started();
        supervisor.handshake_result(true);
        assert_eq!(supervisor.session_state(), SessionState::Open);
    }

    #[test]
    fn test_send_failure_closes_and_keeps_snapshot() {
        let mut supervisor = Supervisor::new();
        open_session(&mut supervisor);
        supervisor.ingest_speed(b"\x00\x00\x00\x14");
        let before = supervisor.snapshot().clone();

        assert!(supervisor.should_send());
        supervisor.send_result(false);

        assert_eq!(supervisor.session_state(), SessionState::Closed);
        assert!(!supervisor.should_send());
        assert_eq!(supervisor.snapshot(), &before);
    }

    #[test]
    fn test_peer_closure_blocks_send() {
        let mut supervisor = Supervisor::new();
        open_session(&mut supervisor);

        supervisor.peer_closed();
        assert_eq!(supervisor.session_state(), SessionState::Closed);
        assert!(!supervisor.should_send());
    }

    #[test]
    fn test_link_loss_tears_down_session() {
        let mut supervisor = Supervisor::new();
        open_session(&mut supervisor);

        supervisor.observe_link(RadioStatus::Idle);
        assert_eq!(supervisor.session_state(), SessionState::Failed);
        assert!(!supervisor.should_send());

        // One retry notification, then back to Closed for the next
        // handshake once the link returns.
        assert!(supervisor.session_retry());
        assert!(!supervisor.session_retry());
        assert_eq!(supervisor.session_state(), SessionState::Closed);
    }

    #[test]
    fn test_display_values_never_depend_on_uplink() {
        let mut supervisor = Supervisor::new();

        // No link, no session: telemetry still flows to the snapshot.
        supervisor.observe_link(RadioStatus::Idle);
        supervisor.ingest_speed(b"\x00\x00\x00\x2A");
        supervisor.ingest_gps(b"$GPGGA,1,2,3,4,5,6,7,12.5\r\n");

        assert_eq!(supervisor.snapshot().speed, 42);
        assert_eq!(supervisor.snapshot().ground_speed.as_str(), "12.5");
        assert!(!supervisor.should_send());
    }
}
