//! Main-task wake-up latch.
//!
//! Producers that request a report call [`notify`]; the dispatch loop blocks
//! in [`wait`] once its masked check has found nothing pending.  Wake-ups
//! are counted, so one signalled before the loop blocks is not lost.
//!
//! On ESP-IDF this is the loop task's FreeRTOS notification.  On host it is
//! a counter behind a mutex and condvar.

#[cfg(target_os = "espidf")]
use core::sync::atomic::{AtomicPtr, Ordering};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(not(target_os = "espidf"))]
use std::sync::{Condvar, Mutex};

#[cfg(target_os = "espidf")]
static LOOP_TASK: AtomicPtr<core::ffi::c_void> = AtomicPtr::new(core::ptr::null_mut());

/// Make the calling task the one [`notify`] wakes.
#[cfg(target_os = "espidf")]
pub fn register_current_task() {
    // SAFETY: returns the running task's handle; valid for the task's life,
    // and the loop task never exits.
    let handle = unsafe { xTaskGetCurrentTaskHandle() };
    LOOP_TASK.store(handle.cast(), Ordering::Release);
}

#[cfg(target_os = "espidf")]
pub fn notify() {
    let handle = LOOP_TASK.load(Ordering::Acquire);
    if handle.is_null() {
        return;
    }
    // SAFETY: `handle` was stored by register_current_task().  Called from
    // task context only (esp_timer task, console thread).
    unsafe {
        xTaskGenericNotify(
            handle.cast(),
            0,
            0,
            eNotifyAction_eIncrement,
            core::ptr::null_mut(),
        );
    }
}

/// Block for at most `timeout_ms`.  Returns whether a wake-up was taken.
#[cfg(target_os = "espidf")]
pub fn wait(timeout_ms: u32) -> bool {
    let ticks = (u64::from(timeout_ms) * u64::from(configTICK_RATE_HZ) / 1000).max(1);
    // SAFETY: waits on the calling task's own notification slot 0.
    let taken = unsafe { ulTaskGenericNotifyTake(0, 1, ticks as TickType_t) };
    taken != 0
}

#[cfg(not(target_os = "espidf"))]
static PENDING: Mutex<u32> = Mutex::new(0);

#[cfg(not(target_os = "espidf"))]
static WOKEN: Condvar = Condvar::new();

#[cfg(not(target_os = "espidf"))]
pub fn register_current_task() {}

#[cfg(not(target_os = "espidf"))]
pub fn notify() {
    if let Ok(mut pending) = PENDING.lock() {
        *pending = pending.saturating_add(1);
        WOKEN.notify_one();
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn wait(timeout_ms: u32) -> bool {
    let Ok(pending) = PENDING.lock() else {
        return false;
    };
    let timeout = std::time::Duration::from_millis(u64::from(timeout_ms));
    match WOKEN.wait_timeout_while(pending, timeout, |n| *n == 0) {
        Ok((mut pending, _)) => {
            let woke = *pending > 0;
            *pending = 0;
            woke
        }
        Err(_) => false,
    }
}
