//! ZeroClaw firmware entry point.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  UART1 ──▶ link-rx (core 0) ──▶ queue ──▶ link-proc (core 1)│
//! │                                              │              │
//! │                        Board (GPIO bank, sensor, identity)  │
//! │                                                             │
//! │  main: heartbeat LED · periodic link statistics             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::time::{Duration, Instant};

use anyhow::Result;
use esp_idf_hal::gpio::{AnyIOPin, AnyOutputPin, IOPin, InputOutput, Output, OutputPin, PinDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::uart::{UartDriver, config::Config as UartConfig};
use esp_idf_hal::units::Hertz;
use log::{info, warn};

use zeroclaw::adapters::board::Board;
use zeroclaw::adapters::sim::SimSensor;
use zeroclaw::adapters::uart;
use zeroclaw::config::LinkConfig;
use zeroclaw::drivers::status_led::Heartbeat;
use zeroclaw::link;

const BAUD_RATE: u32 = 115_200;
/// Main loop period; also the UART poll deadline.
const TICK_MS: u32 = 20;

/// Host-addressable GPIO: driven by GPIO_WRITE, sampled by GPIO_READ.
type Line = PinDriver<'static, AnyIOPin, InputOutput>;
type Led = PinDriver<'static, AnyOutputPin, Output>;

fn line(pin: impl IOPin + 'static) -> Result<Line> {
    Ok(PinDriver::input_output(pin.downgrade())?)
}

fn output(pin: impl OutputPin + 'static) -> Result<Led> {
    Ok(PinDriver::output(pin.downgrade_output())?)
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    let config = LinkConfig::default();
    config.validate()?;
    info!(
        "ZeroClaw v{} on {}",
        env!("CARGO_PKG_VERSION"),
        config.board_name
    );

    let p = Peripherals::take()?;

    // ── 2. Board: host-addressable GPIO bank ──────────────────
    let lines = [
        (4, line(p.pins.gpio4)?),
        (5, line(p.pins.gpio5)?),
        (6, line(p.pins.gpio6)?),
        (7, line(p.pins.gpio7)?),
    ];
    let mut board = Board::<Line, SimSensor>::new(config.board_name.clone());
    for (id, line) in lines {
        board = board
            .with_pin(id, line)
            .map_err(|_| anyhow::anyhow!("GPIO bank full at pin {id}"))?;
    }
    warn!("No ambient sensor fitted; SENSOR_READ will report unavailable");

    // ── 3. Serial link ────────────────────────────────────────
    let uart_config = UartConfig::default().baudrate(Hertz(BAUD_RATE));
    let driver = UartDriver::new(
        p.uart1,
        p.pins.gpio17,
        p.pins.gpio18,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &uart_config,
    )?;
    let (source, sink) = uart::split(driver, TICK_MS);
    let handle = link::spawn(&config, source, board, sink)?;

    // ── 4. Main loop: heartbeat and statistics ────────────────
    let mut heartbeat = Heartbeat::new(output(p.pins.gpio2)?, config.heartbeat_interval_ms);
    let stats_every = Duration::from_secs(u64::from(config.stats_log_interval_secs));
    let mut last_tick = Instant::now();
    let mut last_stats = last_tick;

    info!("ZeroClaw ready, {} baud", BAUD_RATE);

    loop {
        std::thread::sleep(Duration::from_millis(u64::from(TICK_MS)));

        let now = Instant::now();
        let elapsed = now.duration_since(last_tick).as_millis() as u32;
        last_tick = now;
        heartbeat.tick(elapsed)?;

        if !stats_every.is_zero() && now.duration_since(last_stats) >= stats_every {
            last_stats = now;
            handle.shared().stats.log_summary();
        }
    }
}
