//! Peripheral drivers and one-shot hardware initialisation.

pub mod adc;
pub mod button;
pub mod hw_init;
pub mod hw_timer;
pub mod indicator;
pub mod wake;
pub mod watchdog;
