//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod net;
pub mod panel;
pub mod supervisor;

pub use net::{join_task, net_task, radio_task};
pub use panel::panel_task;
pub use supervisor::supervisor_task;
