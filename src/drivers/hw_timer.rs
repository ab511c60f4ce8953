//! Hardware timers using ESP-IDF's esp_timer API.
//!
//! Two periodic timers drive the interrupt handlers: the report tick and
//! the ADC sample clock.  Callbacks use task dispatch (the esp_timer task,
//! not ISR context), so they may block on the critical section and the
//! one-shot ADC read.  On simulation targets no timers are created.
//!
//! The critical section here is the FreeRTOS mutex behind esp-idf-hal's
//! `critical-section` feature.  It masks no interrupts, so each callback
//! runs its handler inside it to stay out of the loop's report snapshot.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use log::info;

use crate::app::ports::{AdcPort, IndicatorPort};
use crate::drivers::wake;
use crate::error::BoardError;
use crate::isr::Interrupts;

/// Tick expiry as run by the esp_timer task: advance the counters under the
/// critical section, then wake the dispatch loop.
pub fn tick_expired(interrupts: &Interrupts<'_>) {
    critical_section::with(|_| interrupts.on_tick());
    wake::notify();
}

/// Sample expiry: one comparator pass under the critical section.  No
/// report is requested, so the loop is not woken.
pub fn sample_expired(
    interrupts: &Interrupts<'_>,
    adc: &mut impl AdcPort,
    indicator: &mut impl IndicatorPort,
) {
    critical_section::with(|_| interrupts.on_conversion(adc, indicator));
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn tick_cb(arg: *mut core::ffi::c_void) {
    // SAFETY: created by start_timers() with an isr_arg() pointer.
    let interrupts = unsafe { crate::drivers::hw_init::isr_context(arg) };
    tick_expired(interrupts);
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn sample_cb(arg: *mut core::ffi::c_void) {
    use crate::drivers::adc::OneshotAdc;
    use crate::drivers::indicator::board_indicator;

    // SAFETY: as tick_cb.
    let interrupts = unsafe { crate::drivers::hw_init::isr_context(arg) };
    let mut adc = OneshotAdc::new(crate::pins::MONITOR_ADC_CHANNEL);
    let mut indicator = board_indicator();
    sample_expired(interrupts, &mut adc, &mut indicator);
}

/// Running periodic timers.  Dropping stops and deletes them.
pub struct PeriodicTimers {
    #[cfg(target_os = "espidf")]
    handles: heapless::Vec<esp_timer_handle_t, 2>,
}

#[cfg(target_os = "espidf")]
unsafe fn start_periodic(
    name: &'static core::ffi::CStr,
    callback: unsafe extern "C" fn(*mut core::ffi::c_void),
    arg: *mut core::ffi::c_void,
    period_ms: u32,
) -> Result<esp_timer_handle_t, BoardError> {
    let args = esp_timer_create_args_t {
        callback: Some(callback),
        arg,
        dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
        name: name.as_ptr(),
        skip_unhandled_events: false,
    };
    let mut handle: esp_timer_handle_t = core::ptr::null_mut();
    // SAFETY: `args` outlives the call; esp_timer copies it.
    let ret = unsafe { esp_timer_create(&args, &mut handle) };
    if ret != ESP_OK as i32 {
        return Err(BoardError::TimerFailed(ret));
    }
    let ret = unsafe { esp_timer_start_periodic(handle, u64::from(period_ms) * 1_000) };
    if ret != ESP_OK as i32 {
        unsafe { esp_timer_delete(handle) };
        return Err(BoardError::TimerFailed(ret));
    }
    Ok(handle)
}

/// Start the tick and ADC sample timers.
#[cfg(target_os = "espidf")]
pub fn start_timers(
    interrupts: &'static Interrupts<'static>,
    tick_ms: u32,
    sample_ms: u32,
) -> Result<PeriodicTimers, BoardError> {
    let arg = crate::drivers::hw_init::isr_arg(interrupts);
    let mut timers = PeriodicTimers { handles: heapless::Vec::new() };

    // SAFETY: `arg` points at a leaked handler set; callbacks only take
    // shared borrows of it.  Partial failure drops `timers`, stopping any
    // timer already started.
    unsafe {
        let tick = start_periodic(c"tick", tick_cb, arg, tick_ms)?;
        let _ = timers.handles.push(tick);
        let sample = start_periodic(c"adc_sample", sample_cb, arg, sample_ms)?;
        let _ = timers.handles.push(sample);
    }

    info!("hw_timer: tick@{}ms + adc_sample@{}ms started", tick_ms, sample_ms);
    Ok(timers)
}

#[cfg(not(target_os = "espidf"))]
pub fn start_timers(
    _interrupts: &'static Interrupts<'static>,
    tick_ms: u32,
    sample_ms: u32,
) -> Result<PeriodicTimers, BoardError> {
    info!("hw_timer(sim): tick@{}ms + adc_sample@{}ms not started", tick_ms, sample_ms);
    Ok(PeriodicTimers {})
}

#[cfg(target_os = "espidf")]
impl Drop for PeriodicTimers {
    fn drop(&mut self) {
        for &handle in &self.handles {
            // SAFETY: handles were created by start_periodic() and are
            // deleted exactly once, here.
            unsafe {
                esp_timer_stop(handle);
                esp_timer_delete(handle);
            }
        }
    }
}
