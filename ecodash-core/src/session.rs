//! Collector session state machine
//!
//! The application-layer connection to the telemetry collector. The
//! session is a function of the current state and an event, in the same
//! shape as the link machine: no I/O here, the driver performs the
//! handshake and sends and feeds the outcomes back as events.
//!
//! Invariants:
//! - `Open` is reachable only from `Handshaking`; the supervisor guards
//!   that a handshake is only started while the link is connected.
//! - A failed handshake or send lands in `Closed`, never half-open; the
//!   next tick is free to retry.
//! - `Failed` marks a session torn down by link loss underneath it. It
//!   normalizes to `Closed` on the next session step, which gives the
//!   supervisor one observable edge to log the loss on.

/// Collector session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionState {
    /// No connection; eligible for a handshake attempt
    Closed,
    /// Handshake in progress this tick
    Handshaking,
    /// Connection established; sends are allowed
    Open,
    /// Torn down by link loss; pending normalization to Closed
    Failed,
}

/// Events driving session transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionEvent {
    /// The driver is about to run the handshake
    HandshakeStarted,
    /// Handshake completed successfully
    HandshakeOk,
    /// Handshake raised or the collector refused
    HandshakeFailed,
    /// A telemetry send completed
    SendOk,
    /// A telemetry send failed; the connection is gone
    SendFailed,
    /// The liveness probe reported the peer closed the connection
    PeerClosed,
    /// The link layer dropped underneath the session
    LinkLost,
    /// Per-tick normalization step
    Retry,
}

impl SessionState {
    /// Whether sends are currently allowed
    pub fn is_open(&self) -> bool {
        matches!(self, SessionState::Open)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: SessionEvent) -> Self {
        use SessionEvent::*;
        use SessionState::*;

        match (self, event) {
            (Closed, HandshakeStarted) => Handshaking,

            (Handshaking, HandshakeOk) => Open,
            (Handshaking, HandshakeFailed) => Closed,
            (Handshaking, LinkLost) => Failed,

            (Open, SendOk) => Open,
            (Open, SendFailed) => Closed,
            (Open, PeerClosed) => Closed,
            (Open, LinkLost) => Failed,

            (Failed, Retry) => Closed,

            // Default: stay in current state
            _ => self,
        }
    }
}
