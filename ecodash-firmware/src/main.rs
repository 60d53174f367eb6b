//! Ecodash - Eco-marathon Vehicle Dashboard Firmware
//!
//! Main firmware binary for Pico W class boards (RP2040 + CYW43).
//!
//! Two serial sources feed the dashboard: the vehicle's instrument bus
//! (binary speed frames on UART0) and a positioning receiver (NMEA
//! sentences on UART1). A supervisor task merges both into a telemetry
//! snapshot each tick, pushes it to the display panel on SPI1, and
//! streams it to the team's collector whenever the WiFi uplink is alive.

#![no_std]
#![no_main]

use cyw43_pio::{PioSpi, DEFAULT_CLOCK_DIVIDER};
use defmt::*;
use embassy_executor::Spawner;
use embassy_net::StackResources;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::{PIO0, UART0, UART1};
use embassy_rp::pio::Pio;
use embassy_rp::spi::{self, Spi};
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use ecodash_core::config::DashConfig;

/// Embedded default configuration (compiled into firmware)
/// Edit ecodash.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../ecodash.toml");

mod channels;
mod config;
mod tasks;
mod uplink;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    UART1_IRQ => BufferedInterruptHandler<UART1>;
    PIO0_IRQ_0 => embassy_rp::pio::InterruptHandler<PIO0>;
});

// Static cells for UART buffers (must live forever)
static SPEED_TX_BUF: StaticCell<[u8; 32]> = StaticCell::new();
static SPEED_RX_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static GPS_TX_BUF: StaticCell<[u8; 32]> = StaticCell::new();
static GPS_RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

// Radio, network stack, and uplink state (must live forever)
static CYW43_STATE: StaticCell<cyw43::State> = StaticCell::new();
static NET_RESOURCES: StaticCell<StackResources<8>> = StaticCell::new();
static UPLINK_RX_BUF: StaticCell<[u8; 1024]> = StaticCell::new();
static UPLINK_TX_BUF: StaticCell<[u8; 1024]> = StaticCell::new();
static DASH_CONFIG: StaticCell<DashConfig> = StaticCell::new();

/// Network stack seed; fixed per build, only perturbs local port choice
const NET_SEED: u64 = 0x5eed_ba5e_0e11_ca11;

/// Instrument bus and positioning receiver baud rate
const SERIAL_BAUD: u32 = 9600;

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Ecodash firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Load configuration (embedded TOML, safe defaults on failure)
    let dash_config: &'static DashConfig = DASH_CONFIG.init(config::load(EMBEDDED_CONFIG));

    // Instrument bus UART (binary speed frames)
    let mut speed_uart_config = UartConfig::default();
    speed_uart_config.baudrate = SERIAL_BAUD;
    let speed_tx_buf = SPEED_TX_BUF.init([0u8; 32]);
    let speed_rx_buf = SPEED_RX_BUF.init([0u8; 64]);
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, speed_uart_config);
    let uart = uart.into_buffered(Irqs, speed_tx_buf, speed_rx_buf);
    let (_speed_tx, speed_rx) = uart.split();

    // Positioning receiver UART (NMEA sentences)
    let mut gps_uart_config = UartConfig::default();
    gps_uart_config.baudrate = SERIAL_BAUD;
    let gps_tx_buf = GPS_TX_BUF.init([0u8; 32]);
    let gps_rx_buf = GPS_RX_BUF.init([0u8; 256]);
    let uart = Uart::new_blocking(p.UART1, p.PIN_8, p.PIN_9, gps_uart_config);
    let uart = uart.into_buffered(Irqs, gps_tx_buf, gps_rx_buf);
    let (_gps_tx, gps_rx) = uart.split();

    info!("UARTs initialized for instrument bus and GPS");

    // Display panel SPI (controller to panel only)
    let mut panel_spi_config = spi::Config::default();
    panel_spi_config.frequency = 8_000_000;
    let panel_spi = Spi::new_txonly(p.SPI1, p.PIN_10, p.PIN_11, p.DMA_CH0, panel_spi_config);

    info!("Panel SPI initialized");

    // CYW43 radio. Firmware blobs are flashed separately:
    //   probe-rs download 43439A0.bin --binary-format bin --base-address 0x10100000
    //   probe-rs download 43439A0_clm.bin --binary-format bin --base-address 0x10140000
    let fw = unsafe { core::slice::from_raw_parts(0x10100000 as *const u8, 230321) };
    let clm = unsafe { core::slice::from_raw_parts(0x10140000 as *const u8, 4752) };

    let pwr = Output::new(p.PIN_23, Level::Low);
    let cs = Output::new(p.PIN_25, Level::High);
    let mut pio = Pio::new(p.PIO0, Irqs);
    let radio_spi = PioSpi::new(
        &mut pio.common,
        pio.sm0,
        DEFAULT_CLOCK_DIVIDER,
        pio.irq0,
        cs,
        p.PIN_24,
        p.PIN_29,
        p.DMA_CH1,
    );

    let state = CYW43_STATE.init(cyw43::State::new());
    let (net_device, mut control, runner) = cyw43::new(state, pwr, radio_spi, fw).await;
    spawner.spawn(tasks::radio_task(runner)).unwrap();

    control.init(clm).await;
    control
        .set_power_management(cyw43::PowerManagementMode::PowerSave)
        .await;
    info!("Radio initialized");

    // Network stack (DHCP)
    let net_config = embassy_net::Config::dhcpv4(Default::default());
    let (stack, net_runner) = embassy_net::new(
        net_device,
        net_config,
        NET_RESOURCES.init(StackResources::new()),
        NET_SEED,
    );
    spawner.spawn(tasks::net_task(net_runner)).unwrap();

    // Collector uplink client (socket lives for the whole uptime)
    let uplink = uplink::CollectorClient::new(
        stack,
        UPLINK_RX_BUF.init([0u8; 1024]),
        UPLINK_TX_BUF.init([0u8; 1024]),
    );

    // Spawn tasks
    spawner.spawn(tasks::join_task(control, dash_config)).unwrap();
    spawner.spawn(tasks::panel_task(panel_spi, dash_config)).unwrap();
    spawner
        .spawn(tasks::supervisor_task(
            speed_rx,
            gps_rx,
            stack,
            uplink,
            dash_config,
        ))
        .unwrap();

    info!("All tasks spawned, firmware running");

    // Main task has nothing else to do - all work happens in spawned tasks
    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
