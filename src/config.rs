//! System configuration parameters
//!
//! Startup defaults, per-event steps, and timing for the counter monitor.
//! The defaults reproduce the reference GUI demo: three counters stepping
//! by 50 / 5000 / 10000 and a Q8 accumulator that climbs by 0.5 per tick
//! and wraps back to 0.0 past 100.0.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::state::Q8;

/// Highest code the 12-bit ADC can return.
pub const ADC_FULL_SCALE: u16 = 4095;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Button counters ---
    /// `c1` start value (SW1 counter, 8-bit)
    pub c1_initial: u8,
    /// `c1` increment per SW1 press
    pub c1_step: u8,
    /// `c2` start value (SW2 counter, 16-bit)
    pub c2_initial: u16,
    /// `c2` increment per SW2 press
    pub c2_step: u16,

    // --- Timer counter ---
    /// `c3` start value (32-bit)
    pub c3_initial: u32,
    /// `c3` increment per timer tick
    pub c3_step: u32,

    // --- Fixed-point accumulator ---
    /// `c4` start value
    pub c4_initial: Q8,
    /// Amount added to `c4` per tick while the feature is enabled
    pub c4_increment: Q8,
    /// Value `c4` resets to after crossing the ceiling
    pub c4_floor: Q8,
    /// Largest value `c4` may hold
    pub c4_ceiling: Q8,
    /// Whether `c4` advances at startup
    pub feature_enabled: bool,

    // --- ADC comparator ---
    /// Conversions strictly above this code switch the indicator on
    pub adc_threshold: u16,

    // --- Timing ---
    /// Periodic timer interval (milliseconds)
    pub tick_interval_ms: u32,
    /// ADC sample interval (milliseconds)
    pub adc_sample_interval_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            c1_initial: 50,
            c1_step: 50,
            c2_initial: 5000,
            c2_step: 5000,

            c3_initial: 10_000,
            c3_step: 10_000,

            c4_initial: Q8::from_bits(128),     // 0.5
            c4_increment: Q8::from_bits(128),   // 0.5
            c4_floor: Q8::ZERO,
            c4_ceiling: Q8::from_bits(25_600),  // 100.0
            feature_enabled: true,

            adc_threshold: 2048, // midscale

            tick_interval_ms: 500,
            adc_sample_interval_ms: 100,
        }
    }
}

impl SystemConfig {
    /// Check ranges before the config is used to seed shared state.
    ///
    /// Invalid values are rejected, not clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.c4_floor > self.c4_ceiling {
            return Err(ConfigError::ValidationFailed("c4_floor above c4_ceiling"));
        }
        // c4 goes out on the wire as a raw i16.
        if self.c4_ceiling.to_bits() > i32::from(i16::MAX)
            || self.c4_floor.to_bits() < i32::from(i16::MIN)
        {
            return Err(ConfigError::ValidationFailed("c4 range does not fit i16"));
        }
        if self.c4_initial < self.c4_floor || self.c4_initial > self.c4_ceiling {
            return Err(ConfigError::ValidationFailed("c4_initial outside floor..=ceiling"));
        }
        if self.c4_increment.to_bits() < 0 || self.c4_increment.to_bits() > i32::from(u16::MAX) {
            return Err(ConfigError::ValidationFailed("c4_increment does not fit u16"));
        }
        if self.adc_threshold > ADC_FULL_SCALE {
            return Err(ConfigError::ValidationFailed("adc_threshold above 12-bit range"));
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("tick_interval_ms must be non-zero"));
        }
        if self.adc_sample_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("adc_sample_interval_ms must be non-zero"));
        }
        Ok(())
    }
}
