//! GPIO / peripheral pin assignments for the counter-monitor board.
//!
//! Single source of truth; drivers reference this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Push-buttons (active-low with internal pull-up, falling-edge interrupt)
// ---------------------------------------------------------------------------

/// SW1: increments `c1`.
pub const SW1_GPIO: i32 = 4;
/// SW2: increments `c2`.
pub const SW2_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// Indicator output (active HIGH)
// ---------------------------------------------------------------------------

/// Driven by the ADC threshold comparator.
pub const INDICATOR_GPIO: i32 = 13;

// ---------------------------------------------------------------------------
// Analog input (ADC1)
// ---------------------------------------------------------------------------

/// Monitored voltage.  ADC1 channel 0 (GPIO 1 on ESP32-S3).
pub const MONITOR_ADC_GPIO: i32 = 1;
/// ADC1 channel number for [`MONITOR_ADC_GPIO`].
pub const MONITOR_ADC_CHANNEL: u32 = 0;
