//! Inter-task communication channels
//!
//! Defines the static signals used for communication between Embassy tasks.
//! Uses embassy-sync primitives for safe async communication.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use ecodash_core::telemetry::TelemetrySnapshot;

/// Latest telemetry snapshot for the panel task
///
/// A Signal rather than a queue: the panel only ever wants the newest
/// snapshot, and a full-value swap keeps each read atomic at snapshot
/// granularity.
pub static SNAPSHOT: Signal<CriticalSectionRawMutex, TelemetrySnapshot> = Signal::new();

/// Fire-and-forget join request from the supervisor to the radio task
pub static CONNECT_REQUEST: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Panel task finished its boot sequence; the supervisor may start
pub static PANEL_READY: Signal<CriticalSectionRawMutex, ()> = Signal::new();
