//! Push-button edge handlers.
//!
//! ## Hardware
//!
//! Two active-low momentary switches with pull-ups.  The GPIO fires on the
//! falling edge and the handler bumps that button's counter directly; there
//! is no debounce, so every edge counts.
//!
//! These run in true ISR context and cannot take the critical section.  They
//! only bump one atomic counter and never request a report, so a press that
//! lands during a report snapshot goes out in that report or the next.

use crate::isr::Button;
use crate::pins;

/// Button wired to `gpio`, if any.
pub fn button_for_gpio(gpio: i32) -> Option<Button> {
    match gpio {
        pins::SW1_GPIO => Some(Button::Sw1),
        pins::SW2_GPIO => Some(Button::Sw2),
        _ => None,
    }
}

/// GPIO wired to `button`.
pub fn gpio_for_button(button: Button) -> i32 {
    match button {
        Button::Sw1 => pins::SW1_GPIO,
        Button::Sw2 => pins::SW2_GPIO,
    }
}

/// SW1 falling edge.  Register with the arg from
/// [`isr_arg`](crate::drivers::hw_init::isr_arg).
#[cfg(target_os = "espidf")]
pub(crate) unsafe extern "C" fn sw1_gpio_isr(arg: *mut core::ffi::c_void) {
    // SAFETY: registered by init_isr_service() with an isr_arg() pointer.
    let interrupts = unsafe { crate::drivers::hw_init::isr_context(arg) };
    interrupts.on_button(Button::Sw1);
}

/// SW2 falling edge.
#[cfg(target_os = "espidf")]
pub(crate) unsafe extern "C" fn sw2_gpio_isr(arg: *mut core::ffi::c_void) {
    // SAFETY: as sw1_gpio_isr.
    let interrupts = unsafe { crate::drivers::hw_init::isr_context(arg) };
    interrupts.on_button(Button::Sw2);
}
