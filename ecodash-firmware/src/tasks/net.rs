//! Radio and network stack tasks
//!
//! Runs the CYW43 driver and the embassy-net stack, and services join
//! requests from the supervisor. Joins are fire-and-forget from the
//! supervisor's point of view: a failure here only shows up as the radio
//! status staying down on later polls.

use cyw43::{Control, JoinOptions};
use cyw43_pio::PioSpi;
use defmt::*;
use embassy_net::{Runner as NetRunner, Stack};
use embassy_rp::gpio::Output;
use embassy_rp::peripherals::{DMA_CH1, PIO0};
use portable_atomic::{AtomicBool, Ordering};

use ecodash_core::config::DashConfig;
use ecodash_core::link::RadioStatus;

use crate::channels::CONNECT_REQUEST;

/// Set while a join request is being processed by the radio
static JOIN_IN_PROGRESS: AtomicBool = AtomicBool::new(false);

/// Coarse link status for the supervisor's once-per-tick poll
pub fn radio_status(stack: Stack<'static>) -> RadioStatus {
    if stack.config_v4().is_some() {
        RadioStatus::HasAddress
    } else if JOIN_IN_PROGRESS.load(Ordering::Relaxed) || stack.is_link_up() {
        RadioStatus::Associating
    } else {
        RadioStatus::Idle
    }
}

/// CYW43 driver task
#[embassy_executor::task]
pub async fn radio_task(
    runner: cyw43::Runner<'static, Output<'static>, PioSpi<'static, PIO0, 0, DMA_CH1>>,
) -> ! {
    runner.run().await
}

/// Network stack task
#[embassy_executor::task]
pub async fn net_task(mut runner: NetRunner<'static, cyw43::NetDriver<'static>>) -> ! {
    runner.run().await
}

/// Join task - services connect requests with the configured credentials
#[embassy_executor::task]
pub async fn join_task(mut control: Control<'static>, config: &'static DashConfig) {
    loop {
        CONNECT_REQUEST.wait().await;

        if config.wifi.ssid.is_empty() {
            warn!("No network configured, running display-only");
            continue;
        }

        JOIN_IN_PROGRESS.store(true, Ordering::Relaxed);
        let options = if config.wifi.psk.is_empty() {
            JoinOptions::new_open()
        } else {
            JoinOptions::new(config.wifi.psk.as_bytes())
        };
        match control.join(config.wifi.ssid.as_str(), options).await {
            Ok(()) => info!("Joined {}", config.wifi.ssid.as_str()),
            Err(err) => warn!("Join failed with status {}", err.status),
        }
        JOIN_IN_PROGRESS.store(false, Ordering::Relaxed);
    }
}
