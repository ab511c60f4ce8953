//! One-shot hardware peripheral initialization.
//!
//! Configures the ADC channel, button inputs, and indicator output using
//! raw ESP-IDF sys calls, and registers the button edge handlers.  Called
//! once from `main()` before the dispatch loop starts.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

use crate::error::BoardError;
use crate::isr::Interrupts;
#[cfg(target_os = "espidf")]
use crate::pins;

// ── Handler context ───────────────────────────────────────────

/// Encode the handler set as the opaque `arg` passed to C callbacks.
pub fn isr_arg(interrupts: &'static Interrupts<'static>) -> *mut core::ffi::c_void {
    core::ptr::from_ref(interrupts).cast_mut().cast()
}

/// Recover the handler set inside a C callback.
///
/// # Safety
///
/// `arg` must come from [`isr_arg`].  The pointee is leaked at boot and
/// never freed, and every access through it is a shared borrow.
pub unsafe fn isr_context(arg: *mut core::ffi::c_void) -> &'static Interrupts<'static> {
    // SAFETY: caller contract above.
    unsafe { &*arg.cast_const().cast::<Interrupts<'static>>() }
}

// ── Peripherals ───────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), BoardError> {
    // SAFETY: Called once from main() before interrupts are enabled.
    unsafe {
        init_adc()?;
        init_button_inputs()?;
        init_indicator_output()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), BoardError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: ADC1_HANDLE is written once by `init_adc()` before the sample
/// timer starts; afterwards it is only read, from the esp_timer task.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<(), BoardError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 {
        return Err(BoardError::AdcInitFailed(ret));
    }

    // 12 dB attenuation, 12-bit: 0..=4095 over roughly 0 to 3.1 V.
    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };
    let ret = unsafe { adc_oneshot_config_channel(adc1_handle(), pins::MONITOR_ADC_CHANNEL, &chan_cfg) };
    if ret != ESP_OK as i32 {
        return Err(BoardError::AdcInitFailed(ret));
    }

    info!("hw_init: ADC1 CH{} configured", pins::MONITOR_ADC_CHANNEL);
    Ok(())
}

/// Blocking one-shot read.  A failed read reports 0 (below any threshold).
#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> u16 {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract; only the sample timer reads.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return 0;
    }
    raw.max(0) as u16
}

#[cfg(not(target_os = "espidf"))]
pub fn adc1_read(_channel: u32) -> u16 {
    0
}

// ── GPIO ──────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_button_inputs() -> Result<(), BoardError> {
    let cfg = gpio_config_t {
        pin_bit_mask: (1u64 << pins::SW1_GPIO) | (1u64 << pins::SW2_GPIO),
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_NEGEDGE,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 {
        return Err(BoardError::GpioConfigFailed(ret));
    }
    info!("hw_init: buttons on GPIO{}/GPIO{}", pins::SW1_GPIO, pins::SW2_GPIO);
    Ok(())
}

#[cfg(target_os = "espidf")]
unsafe fn init_indicator_output() -> Result<(), BoardError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::INDICATOR_GPIO,
        mode: gpio_mode_t_GPIO_MODE_OUTPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 {
        return Err(BoardError::GpioConfigFailed(ret));
    }
    unsafe { gpio_set_level(pins::INDICATOR_GPIO, 0) };
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) -> Result<(), BoardError> {
    // SAFETY: gpio_set_level is a single register write on a pin configured
    // as output in init_indicator_output().
    let ret = unsafe { gpio_set_level(pin, u32::from(high)) };
    if ret != ESP_OK as i32 {
        return Err(BoardError::GpioWriteFailed(ret));
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_pin: i32, _high: bool) -> Result<(), BoardError> {
    Ok(())
}

// ── GPIO ISR Service ──────────────────────────────────────────

/// Install the per-pin ISR service and attach the button handlers.
/// Edge interrupts stay masked until [`enable_button_interrupts`].
#[cfg(target_os = "espidf")]
pub fn init_isr_service(interrupts: &'static Interrupts<'static>) -> Result<(), BoardError> {
    use crate::drivers::button::{sw1_gpio_isr, sw2_gpio_isr};

    let arg = isr_arg(interrupts);
    // SAFETY: gpio_install_isr_service is idempotent; ESP_ERR_INVALID_STATE
    // means it was already installed.  `arg` points at a leaked handler set
    // that outlives every registration.
    unsafe {
        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK as i32 && ret != ESP_ERR_INVALID_STATE as i32 {
            return Err(BoardError::IsrInstallFailed(ret));
        }

        type GpioIsr = unsafe extern "C" fn(*mut core::ffi::c_void);
        for (pin, handler) in [
            (pins::SW1_GPIO, sw1_gpio_isr as GpioIsr),
            (pins::SW2_GPIO, sw2_gpio_isr as GpioIsr),
        ] {
            gpio_intr_disable(pin);
            let ret = gpio_isr_handler_add(pin, Some(handler), arg);
            if ret != ESP_OK as i32 {
                return Err(BoardError::IsrInstallFailed(ret));
            }
        }
    }
    info!("hw_init: ISR service installed (sw1, sw2)");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_isr_service(_interrupts: &'static Interrupts<'static>) -> Result<(), BoardError> {
    log::info!("hw_init(sim): ISR service skipped");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn enable_button_interrupts() -> Result<(), BoardError> {
    for pin in [pins::SW1_GPIO, pins::SW2_GPIO] {
        // SAFETY: handlers were attached in init_isr_service().
        let ret = unsafe { gpio_intr_enable(pin) };
        if ret != ESP_OK as i32 {
            return Err(BoardError::GpioConfigFailed(ret));
        }
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn enable_button_interrupts() -> Result<(), BoardError> {
    Ok(())
}
