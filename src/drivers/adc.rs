//! One-shot ADC1 sampling as the conversion-complete source.
//!
//! ESP32 one-shot reads are synchronous: the sample timer starts a
//! conversion and the result is available on return, so there is no
//! separate completion flag to acknowledge.

use crate::app::ports::AdcPort;
use crate::drivers::hw_init;

/// Reads one ADC1 channel per conversion.
#[derive(Debug, Clone, Copy)]
pub struct OneshotAdc {
    channel: u32,
}

impl OneshotAdc {
    pub const fn new(channel: u32) -> Self {
        Self { channel }
    }

    pub fn channel(&self) -> u32 {
        self.channel
    }
}

impl AdcPort for OneshotAdc {
    fn conversion_result(&mut self) -> u16 {
        hw_init::adc1_read(self.channel)
    }

    fn clear_conversion_flag(&mut self) {}
}
