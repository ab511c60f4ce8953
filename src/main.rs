//! Counter-monitor firmware — main entry point.
//!
//! Hexagonal architecture: interrupt handlers write shared atomics and raise
//! a pending-work flag; the main loop drains, reports, and sleeps.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  EspBoard            EspCpu           LogHostLink   console    │
//! │  (GPIO/ADC/timers)   (task wake)      (HostPort)    (Router)   │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │  Interrupts ──▶ SharedState ◀── Router                 │    │
//! │  │                     │                                  │    │
//! │  │                     ▼                                  │    │
//! │  │               DispatchLoop (ACTIVE ⇄ SLEEP)            │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::info;

// Provides the critical-section implementation (a FreeRTOS mutex).
use esp_idf_hal as _;

use counter_monitor::adapters::console;
use counter_monitor::adapters::hardware::{EspBoard, EspCpu};
use counter_monitor::adapters::log_sink::LogHostLink;
use counter_monitor::app::commands::{Router, default_table};
use counter_monitor::app::ports::Board;
use counter_monitor::app::service::DispatchLoop;
use counter_monitor::config::SystemConfig;
use counter_monitor::drivers::watchdog::Watchdog;
use counter_monitor::error::Error;
use counter_monitor::isr::Interrupts;
use counter_monitor::state::SharedState;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Counter Monitor v{}              ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Config ─────────────────────────────────────────────
    let config = SystemConfig::default();
    config.validate().map_err(Error::from)?;

    // ── 3. Shared state + handler set (live for the whole run) ─
    let shared: &'static SharedState = Box::leak(Box::new(SharedState::new(&config)));
    let interrupts: &'static Interrupts<'static> =
        Box::leak(Box::new(Interrupts::new(shared, &config)));

    // ── 4. Board bring-up, interrupts still masked ────────────
    let mut board = EspBoard::new(&config);
    board.init(interrupts).map_err(Error::from)?;

    // ── 5. Startup report ─────────────────────────────────────
    let mut host = LogHostLink::new();
    let mut dispatch = DispatchLoop::new(shared);
    dispatch.report_startup(&mut host);

    // ── 6. Host command path ──────────────────────────────────
    let router = Router::new(default_table().map_err(Error::from)?, shared);
    info!("commands: {:?}", router.table().names().collect::<Vec<_>>());

    // ── 7. Enable interrupts ──────────────────────────────────
    // The wake latch must name this task before the first tick.
    let mut cpu = EspCpu::new();
    board.enable_interrupts().map_err(Error::from)?;
    let _console = console::spawn(router)?;

    let watchdog = Watchdog::new();
    info!("System ready. Entering dispatch loop.");

    // ── 8. Dispatch loop ──────────────────────────────────────
    loop {
        dispatch.step(&mut host, &mut cpu);
        watchdog.feed();
    }
}
