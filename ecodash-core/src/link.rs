//! Link-layer state machine and reconnect policy
//!
//! The radio subsystem is polled once per tick for a coarse status. The
//! monitor owns `LinkState` exclusively; no other component may set it,
//! and it only ever changes in response to an observed status. Reconnect
//! requests are fire-and-forget: a failed join surfaces as the status
//! staying down on later polls, and the only retry throttle is the tick
//! cadence plus a short debounce while a join is believed in flight.

/// Coarse status reported by the radio subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioStatus {
    /// Associated and holding an address; the link is usable
    HasAddress,
    /// Association or address acquisition in progress
    Associating,
    /// Not associated (includes dropped, failed, and powered-down)
    Idle,
}

/// Link-layer connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    /// No association and no join in flight
    Disconnected,
    /// Join requested or association in progress
    Connecting,
    /// Link usable for traffic
    Connected,
}

/// Actions the monitor asks its driver to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    /// The link just became usable (log once)
    CameUp,
    /// Issue a join request with the configured credentials
    RequestConnect,
}

/// Idle polls tolerated while Connecting before the pending join is
/// considered dead and a fresh request is issued
pub const IDLE_POLLS_BEFORE_RETRY: u8 = 4;

/// Polls radio status into `LinkState` and decides when to reconnect
#[derive(Debug, Clone)]
pub struct LinkMonitor {
    state: LinkState,
    idle_polls: u8,
}

impl Default for LinkMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkMonitor {
    /// Create a monitor with the link assumed down
    pub fn new() -> Self {
        Self {
            state: LinkState::Disconnected,
            idle_polls: 0,
        }
    }

    /// Current link state
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Process one status observation
    ///
    /// Returns an action for the driver: a one-time `CameUp` on the
    /// transition into `Connected`, or `RequestConnect` when the link is
    /// down and no join is already in flight. While `Connecting`, repeat
    /// `Idle` observations are debounced for a few polls so a join that is
    /// still being processed is not duplicated.
    pub fn observe(&mut self, status: RadioStatus) -> Option<LinkEvent> {
        match status {
            RadioStatus::HasAddress => {
                let was_connected = self.state == LinkState::Connected;
                self.state = LinkState::Connected;
                self.idle_polls = 0;
                (!was_connected).then_some(LinkEvent::CameUp)
            }
            RadioStatus::Associating => {
                self.state = LinkState::Connecting;
                self.idle_polls = 0;
                None
            }
            RadioStatus::Idle => {
                if self.state == LinkState::Connecting
                    && self.idle_polls < IDLE_POLLS_BEFORE_RETRY
                {
                    self.idle_polls += 1;
                    return None;
                }
                // Dropped, never associated, or a stale join: request a
                // join, then latch Connecting so the next tick does not
                // request another.
                self.state = LinkState::Connecting;
                self.idle_polls = 0;
                Some(LinkEvent::RequestConnect)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_requests_connect_once() {
        let mut monitor = LinkMonitor::new();

        assert_eq!(
            monitor.observe(RadioStatus::Idle),
            Some(LinkEvent::RequestConnect)
        );
        assert_eq!(monitor.state(), LinkState::Connecting);

        // Second poll sees Connecting and issues nothing.
        assert_eq!(monitor.observe(RadioStatus::Idle), None);
        assert_eq!(monitor.state(), LinkState::Connecting);
    }

    #[test]
    fn test_came_up_reported_once() {
        let mut monitor = LinkMonitor::new();

        assert_eq!(
            monitor.observe(RadioStatus::HasAddress),
            Some(LinkEvent::CameUp)
        );
        assert_eq!(monitor.state(), LinkState::Connected);
        assert_eq!(monitor.observe(RadioStatus::HasAddress), None);
    }

    #[test]
    fn test_drop_after_connected_reconnects() {
        let mut monitor = LinkMonitor::new();
        monitor.observe(RadioStatus::HasAddress);

        assert_eq!(
            monitor.observe(RadioStatus::Idle),
            Some(LinkEvent::RequestConnect)
        );
        assert_eq!(monitor.state(), LinkState::Connecting);

        // Link recovers: CameUp fires again for the new association.
        assert_eq!(
            monitor.observe(RadioStatus::HasAddress),
            Some(LinkEvent::CameUp)
        );
    }

    #[test]
    fn test_associating_never_requests() {
        let mut monitor = LinkMonitor::new();
        assert_eq!(monitor.observe(RadioStatus::Associating), None);
        assert_eq!(monitor.state(), LinkState::Connecting);
    }

    #[test]
    fn test_dead_join_is_retried_after_debounce() {
        let mut monitor = LinkMonitor::new();
        assert_eq!(
            monitor.observe(RadioStatus::Idle),
            Some(LinkEvent::RequestConnect)
        );

        // The radio never even starts associating; after the debounce
        // window the monitor asks again.
        let mut requests = 0;
        for _ in 0..IDLE_POLLS_BEFORE_RETRY + 1 {
            if monitor.observe(RadioStatus::Idle) == Some(LinkEvent::RequestConnect) {
                requests += 1;
            }
        }
        assert_eq!(requests, 1);
    }

    #[test]
    fn test_associating_resets_debounce() {
        let mut monitor = LinkMonitor::new();
        monitor.observe(RadioStatus::Idle);
        monitor.observe(RadioStatus::Idle);
        monitor.observe(RadioStatus::Associating);

        // Progress was observed, so the idle debounce starts over.
        for _ in 0..IDLE_POLLS_BEFORE_RETRY {
            assert_eq!(monitor.observe(RadioStatus::Idle), None);
        }
        assert_eq!(
            monitor.observe(RadioStatus::Idle),
            Some(LinkEvent::RequestConnect)
        );
    }
}
