//! Hardware adapter bridging the ESP32 board to the dispatch core's ports.
//!
//! [`EspBoard`] implements [`Board`] on top of the `drivers` layer and
//! [`EspCpu`] implements [`CpuPort`].  This is the only module that decides
//! when peripherals start.  On non-espidf targets the underlying drivers use
//! cfg-gated simulation stubs.

use critical_section::CriticalSection;
use log::{info, trace};

use crate::app::ports::{Board, CpuPort};
use crate::config::SystemConfig;
use crate::drivers::{hw_init, hw_timer, wake};
use crate::error::BoardError;
use crate::isr::Interrupts;

// ── CpuPort implementation ────────────────────────────────────

/// Loop-task sleep on the task's wake latch.
///
/// On ESP-IDF the critical section is a FreeRTOS mutex that the timer
/// callbacks also take, so nothing may halt while holding it.  The masked
/// check runs, the section is released, and the task then blocks on its
/// notification.  A tick landing in between has already bumped the count,
/// so the block returns at once.  Blocking also lets the idle task run.
#[derive(Debug)]
pub struct EspCpu {
    wake_timeout_ms: u32,
}

impl EspCpu {
    /// Longest block before the loop re-checks and feeds the watchdog.
    pub const WAKE_TIMEOUT_MS: u32 = 1_000;

    /// Bind the wake latch to the calling task.  Call from the loop task.
    pub fn new() -> Self {
        wake::register_current_task();
        Self {
            wake_timeout_ms: Self::WAKE_TIMEOUT_MS,
        }
    }
}

impl Default for EspCpu {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuPort for EspCpu {
    fn wait_for_interrupt(&mut self, _cs: CriticalSection<'_>) {}

    fn wait_for_wake(&mut self) {
        if !wake::wait(self.wake_timeout_ms) {
            trace!("cpu: wake timeout, re-checking");
        }
    }
}

// ── Board implementation ──────────────────────────────────────

/// ESP32 board: buttons, indicator, ADC1, and the two periodic timers.
pub struct EspBoard {
    tick_ms: u32,
    sample_ms: u32,
    interrupts: Option<&'static Interrupts<'static>>,
    timers: Option<hw_timer::PeriodicTimers>,
}

impl EspBoard {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            tick_ms: config.tick_interval_ms,
            sample_ms: config.adc_sample_interval_ms,
            interrupts: None,
            timers: None,
        }
    }

    /// Whether the periodic sources are running.
    pub fn is_running(&self) -> bool {
        self.timers.is_some()
    }
}

impl Board for EspBoard {
    fn init(&mut self, interrupts: &'static Interrupts<'static>) -> Result<(), BoardError> {
        hw_init::init_peripherals()?;
        hw_init::init_isr_service(interrupts)?;
        self.interrupts = Some(interrupts);
        Ok(())
    }

    fn enable_interrupts(&mut self) -> Result<(), BoardError> {
        let interrupts = self.interrupts.ok_or(BoardError::NotInitialized)?;
        if self.timers.is_some() {
            return Ok(());
        }
        hw_init::enable_button_interrupts()?;
        self.timers = Some(hw_timer::start_timers(interrupts, self.tick_ms, self.sample_ms)?);
        info!("board: interrupts enabled");
        Ok(())
    }
}
