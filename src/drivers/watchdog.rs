//! Task Watchdog Timer (TWDT) driver.
//!
//! Subscribes the dispatch-loop task and also watches the core 0 idle task,
//! so a loop that stops blocking between reports trips it as surely as one
//! that stalls.  The loop calls [`Watchdog::feed`] once per pass.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use log::info;

/// Device resets if the loop misses feeds for this long.
pub const WATCHDOG_TIMEOUT_MS: u32 = 10_000;

pub struct Watchdog {
    #[cfg(target_os = "espidf")]
    subscribed: bool,
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new()
    }
}

impl Watchdog {
    /// Configure the TWDT and subscribe the current task.
    #[cfg(target_os = "espidf")]
    pub fn new() -> Self {
        let cfg = esp_task_wdt_config_t {
            timeout_ms: WATCHDOG_TIMEOUT_MS,
            idle_core_mask: 1,
            trigger_panic: true,
        };
        // SAFETY: plain FFI calls with a config that outlives them.
        let ret = unsafe { esp_task_wdt_reconfigure(&cfg) };
        if ret != ESP_OK as i32 {
            log::warn!("watchdog: reconfigure returned {} (may already be configured)", ret);
        }

        let ret = unsafe { esp_task_wdt_add(core::ptr::null_mut()) };
        let subscribed = ret == ESP_OK as i32;
        if subscribed {
            info!("watchdog: subscribed ({} ms, idle core 0 watched)", WATCHDOG_TIMEOUT_MS);
        } else {
            log::warn!("watchdog: failed to subscribe ({})", ret);
        }
        Self { subscribed }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Self {
        info!("watchdog(sim): no-op");
        Self {}
    }

    /// Reset the countdown for the subscribed task.
    pub fn feed(&self) {
        #[cfg(target_os = "espidf")]
        if self.subscribed {
            // SAFETY: the calling task subscribed in new().
            unsafe {
                esp_task_wdt_reset();
            }
        }
    }
}
