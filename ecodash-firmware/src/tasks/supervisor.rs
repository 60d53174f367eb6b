//! Telemetry supervisor task
//!
//! The single recurring task that keeps the dashboard alive: it polls the
//! radio, maintains the collector session, drains both serial sources,
//! and publishes the merged snapshot. All decisions live in
//! `ecodash_core::supervisor`; this task owns the timing and performs the
//! I/O the core logic asks for.
//!
//! Per tick, in fixed order: link monitor, session maintenance, serial
//! ingest, panel update, uplink send. The panel signal always precedes
//! the send, so a rendered value and a sent value never come from
//! different ticks. No failure below is fatal - the loop runs until the
//! device resets.

use defmt::*;
use embassy_net::Stack;
use embassy_rp::uart::BufferedUartRx;
use embassy_time::{Duration, Ticker, Timer};
use embedded_io::{Read, ReadReady};

use ecodash_core::config::DashConfig;
use ecodash_core::link::LinkEvent;
use ecodash_core::supervisor::Supervisor;
use ecodash_protocol::speed::SPEED_FRAME_LEN;

use crate::channels::{CONNECT_REQUEST, PANEL_READY, SNAPSHOT};
use crate::tasks::net::radio_status;
use crate::uplink::CollectorClient;

/// Tick interval in milliseconds
pub const TICK_INTERVAL_MS: u64 = 500;

/// Delay before the first tick, letting the radio settle after power-on
pub const SETTLE_DELAY_S: u64 = 3;

/// Per-iteration read chunk for the GPS stream
const GPS_CHUNK: usize = 32;

/// Ticks between decode statistics log lines (one minute)
const STATS_LOG_TICKS: u32 = 120;

/// Supervisor task - the root telemetry loop
#[embassy_executor::task]
pub async fn supervisor_task(
    mut speed_rx: BufferedUartRx,
    mut gps_rx: BufferedUartRx,
    stack: Stack<'static>,
    mut uplink: CollectorClient,
    config: &'static DashConfig,
) {
    // The panel must finish its boot sequence before any snapshot is
    // pushed, and the link gets a settle window before the first connect.
    PANEL_READY.wait().await;
    Timer::after_secs(SETTLE_DELAY_S).await;

    let mut supervisor = Supervisor::new();
    let mut ticker = Ticker::every(Duration::from_millis(TICK_INTERVAL_MS));
    let mut ticks: u32 = 0;
    info!("Supervisor started");

    loop {
        ticker.next().await;

        // Link monitor
        match supervisor.observe_link(radio_status(stack)) {
            Some(LinkEvent::CameUp) => info!("Link up"),
            Some(LinkEvent::RequestConnect) => {
                debug!("Link down, requesting join");
                CONNECT_REQUEST.signal(());
            }
            None => {}
        }

        // Session maintenance
        if supervisor.session_retry() {
            warn!("Uplink session lost");
            uplink.teardown();
        }
        if supervisor.session_state().is_open() && !uplink.is_live() {
            debug!("Collector closed the connection");
            supervisor.peer_closed();
            uplink.teardown();
        }
        if supervisor.wants_handshake() && config.collector.is_configured() {
            supervisor.handshake_started();
            match uplink.handshake(&config.collector).await {
                Ok(()) => {
                    info!("Collector session open");
                    supervisor.handshake_result(true);
                }
                Err(err) => {
                    // Deliberately swallowed: the next tick retries, and
                    // the dashboard keeps rendering without the uplink.
                    warn!("Handshake failed: {:?}", err);
                    supervisor.handshake_result(false);
                }
            }
        }

        // Serial ingest: one speed frame, then drain the GPS stream
        let mut frame = [0u8; SPEED_FRAME_LEN];
        let n = poll_read(&mut speed_rx, &mut frame);
        supervisor.ingest_speed(&frame[..n]);

        let mut chunk = [0u8; GPS_CHUNK];
        loop {
            let n = poll_read(&mut gps_rx, &mut chunk);
            if n == 0 {
                break;
            }
            supervisor.ingest_gps(&chunk[..n]);
        }

        // Display always updates, and always before the uplink send
        SNAPSHOT.signal(supervisor.snapshot().clone());

        if supervisor.should_send() {
            match uplink.send(supervisor.snapshot()).await {
                Ok(()) => supervisor.send_result(true),
                Err(err) => {
                    warn!("Send failed: {:?}", err);
                    supervisor.send_result(false);
                }
            }
        }

        ticks = ticks.wrapping_add(1);
        if ticks % STATS_LOG_TICKS == 0 {
            let stats = supervisor.stats();
            debug!(
                "Decode stats: speed={} gps={} ignored={} errors={}",
                stats.speed_frames, stats.sentences, stats.ignored, stats.errors
            );
        }
    }
}

/// Read whatever bytes are immediately available, never blocking
fn poll_read(rx: &mut BufferedUartRx, buf: &mut [u8]) -> usize {
    match rx.read_ready() {
        Ok(true) => match rx.read(buf) {
            Ok(n) => n,
            Err(e) => {
                warn!("UART read error: {:?}", e);
                0
            }
        },
        Ok(false) => 0,
        Err(e) => {
            warn!("UART poll error: {:?}", e);
            0
        }
    }
}
