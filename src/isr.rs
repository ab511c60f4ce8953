//! Interrupt handlers.
//!
//! Board code calls into [`Interrupts`] from its timer, GPIO-edge, and
//! conversion-complete vectors.  Every handler is bounded and non-blocking:
//! a handful of atomic loads/stores, no logging, no waiting.  Only the timer
//! handler requests a report; button presses and conversions are picked up
//! by the next tick-driven drain.

use crate::app::ports::{AdcPort, IndicatorPort};
use crate::config::SystemConfig;
use crate::events::Event;
use crate::state::{Q8, SharedState};

/// Physical buttons, one counter each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Increments `c1`.
    Sw1,
    /// Increments `c2`.
    Sw2,
}

/// Immutable per-event parameters, fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerConfig {
    pub c1_step: u8,
    pub c2_step: u16,
    pub c3_step: u32,
    pub c4_floor: Q8,
    pub c4_ceiling: Q8,
    pub adc_threshold: u16,
}

impl From<&SystemConfig> for HandlerConfig {
    fn from(config: &SystemConfig) -> Self {
        Self {
            c1_step: config.c1_step,
            c2_step: config.c2_step,
            c3_step: config.c3_step,
            c4_floor: config.c4_floor,
            c4_ceiling: config.c4_ceiling,
            adc_threshold: config.adc_threshold,
        }
    }
}

/// Add `increment` to `current`; past `ceiling` the accumulator restarts
/// at `floor` rather than clamping.
pub fn advance_accumulator(current: Q8, increment: Q8, floor: Q8, ceiling: Q8) -> Q8 {
    let next = current.saturating_add(increment);
    if next > ceiling { floor } else { next }
}

/// Handler set bound to one [`SharedState`].
pub struct Interrupts<'a> {
    shared: &'a SharedState,
    cfg: HandlerConfig,
}

impl<'a> Interrupts<'a> {
    pub fn new(shared: &'a SharedState, config: &SystemConfig) -> Self {
        Self {
            shared,
            cfg: HandlerConfig::from(config),
        }
    }

    pub fn shared(&self) -> &'a SharedState {
        self.shared
    }

    pub fn config(&self) -> &HandlerConfig {
        &self.cfg
    }

    /// Periodic timer expiry.
    pub fn on_tick(&self) {
        let shared = self.shared;
        shared.add_c3(self.cfg.c3_step);
        if shared.enabled() {
            let next = advance_accumulator(
                shared.c4(),
                shared.increment(),
                self.cfg.c4_floor,
                self.cfg.c4_ceiling,
            );
            shared.set_c4(next);
        }
        // Last: publishes the writes above to the main loop.
        shared.request_report(Event::Tick);
    }

    /// Button falling edge.
    pub fn on_button(&self, button: Button) {
        match button {
            Button::Sw1 => {
                self.shared.add_c1(self.cfg.c1_step);
                self.shared.record_event(Event::Sw1);
            }
            Button::Sw2 => {
                self.shared.add_c2(self.cfg.c2_step);
                self.shared.record_event(Event::Sw2);
            }
        }
    }

    /// ADC conversion complete: threshold comparator driving the indicator.
    pub fn on_conversion(&self, adc: &mut impl AdcPort, indicator: &mut impl IndicatorPort) {
        let on = adc.conversion_result() > self.cfg.adc_threshold;
        indicator.set_indicator(on);
        self.shared.set_indicator(on);
        // Must precede return or the vector re-enters immediately.
        adc.clear_conversion_flag();
        self.shared.record_event(Event::Conversion);
    }
}
