//! Threshold indicator output.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: [`GpioOutput`] writes the pin through hw_init.  On host/test:
//! the write is a no-op and only the cached level changes.  The comparator
//! drives it through the generic [`PinIndicator`] adapter.

use embedded_hal::digital::{ErrorType, OutputPin, StatefulOutputPin};

use crate::app::ports::PinIndicator;
use crate::drivers::hw_init;
use crate::error::BoardError;
use crate::pins;

/// Indicator as wired on the board.
pub type GpioIndicator = PinIndicator<GpioOutput>;

/// Push-pull GPIO output configured by hw_init.
#[derive(Debug)]
pub struct GpioOutput {
    pin: i32,
    high: bool,
}

impl GpioOutput {
    pub const fn new(pin: i32) -> Self {
        Self { pin, high: false }
    }

    pub fn pin(&self) -> i32 {
        self.pin
    }

    fn write(&mut self, high: bool) -> Result<(), BoardError> {
        hw_init::gpio_write(self.pin, high)?;
        self.high = high;
        Ok(())
    }
}

impl ErrorType for GpioOutput {
    type Error = BoardError;
}

impl OutputPin for GpioOutput {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(true)
    }
}

impl StatefulOutputPin for GpioOutput {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.high)
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.high)
    }
}

/// The board indicator on [`INDICATOR_GPIO`](pins::INDICATOR_GPIO).
pub const fn board_indicator() -> GpioIndicator {
    PinIndicator(GpioOutput::new(pins::INDICATOR_GPIO))
}
