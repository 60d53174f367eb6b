//! Wire formats for the Ecodash vehicle dashboard
//!
//! This crate defines every byte-level format the dashboard speaks:
//!
//! - `speed` - the fixed-width binary frame the vehicle's instrument bus
//!   emits on UART (big-endian speed value, fire-and-forget).
//! - `nmea` - reassembly and field extraction for the positioning
//!   receiver's `$`-started, `\r\n`-terminated sentence stream.
//! - `frame` / `panel` - the framed byte protocol sent to the display
//!   panel. The panel acts as a "dumb gauge cluster": it receives field
//!   values and renders them, all dashboard logic stays on the controller.
//! - `collector` - the line-oriented text protocol spoken to the remote
//!   telemetry collector (hello on connect, one report line per tick).
//!
//! # Panel frame format
//!
//! ```text
//! ┌───────┬────────┬──────┬─────────────┬──────────┐
//! │ START │ LENGTH │ TYPE │ PAYLOAD     │ CHECKSUM │
//! │ 1B    │ 1B     │ 1B   │ 0-48B       │ 1B       │
//! └───────┴────────┴──────┴─────────────┴──────────┘
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod collector;
pub mod frame;
pub mod nmea;
pub mod panel;
pub mod speed;

pub use frame::{Frame, FrameError, FRAME_START, MAX_PAYLOAD_SIZE};
pub use nmea::{PositionSentence, SentenceAssembler, SentenceError};
pub use panel::{FieldId, PanelMessage};
