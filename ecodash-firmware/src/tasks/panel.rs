//! Display panel task
//!
//! The panel owns rendering, layout, touch, and fonts; this task only
//! tells it what each field currently reads. It consumes the latest
//! telemetry snapshot, encodes field updates as panel frames, and writes
//! them out over SPI. The supervisor is gated on PANEL_READY so no
//! snapshot is ever pushed at an uninitialized panel.

use core::fmt::Write as _;

use defmt::*;
use embassy_rp::spi::{Async, Spi};
use heapless::String;

use ecodash_core::config::DashConfig;
use ecodash_protocol::frame::MAX_FRAME_SIZE;
use ecodash_protocol::panel::{FieldId, PanelMessage};

use crate::channels::{PANEL_READY, SNAPSHOT};

/// Placeholder shown until the first position fix arrives
const NO_FIX: &str = "--";

/// Panel task - pushes field values to the display panel
#[embassy_executor::task]
pub async fn panel_task(mut spi: Spi<'static, Async>, config: &'static DashConfig) {
    info!("Panel task started");

    // Boot sequence: known field state, configured backlight, first paint.
    send_message(&mut spi, &PanelMessage::Clear).await;
    send_message(
        &mut spi,
        &PanelMessage::Backlight {
            percent: config.panel.backlight,
        },
    )
    .await;
    send_message(&mut spi, &PanelMessage::Render).await;

    PANEL_READY.signal(());
    info!("Panel initialized, backlight {}%", config.panel.backlight);

    loop {
        let snapshot = SNAPSHOT.wait().await;

        let mut speed_text: String<12> = String::new();
        // u32 always fits in 12 characters
        let _ = write!(speed_text, "{}", snapshot.speed);
        send_message(
            &mut spi,
            &PanelMessage::SetField {
                field: FieldId::Speed,
                text: speed_text.as_str(),
            },
        )
        .await;

        let ground_speed = if snapshot.ground_speed.is_empty() {
            NO_FIX
        } else {
            snapshot.ground_speed.as_str()
        };
        send_message(
            &mut spi,
            &PanelMessage::SetField {
                field: FieldId::GroundSpeed,
                text: ground_speed,
            },
        )
        .await;

        send_message(&mut spi, &PanelMessage::Render).await;
    }
}

/// Encode one message and write it to the panel
async fn send_message(spi: &mut Spi<'static, Async>, message: &PanelMessage<'_>) {
    let frame = match message.to_frame() {
        Ok(frame) => frame,
        Err(e) => {
            warn!("Panel message rejected: {:?}", e);
            return;
        }
    };

    let mut buf = [0u8; MAX_FRAME_SIZE];
    match frame.encode(&mut buf) {
        Ok(len) => {
            if let Err(e) = spi.write(&buf[..len]).await {
                warn!("Panel write failed: {:?}", e);
            }
        }
        Err(e) => warn!("Panel frame encode failed: {:?}", e),
    }
}
