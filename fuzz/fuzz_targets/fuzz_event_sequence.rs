//! Fuzz target: interleaved interrupts, commands, and drains
//!
//! Each input byte selects one action.  After every action the accumulator
//! must sit inside [floor, ceiling] and at most one report may be pending.
//!
//! cargo fuzz run fuzz_event_sequence

#![no_main]

use counter_monitor::app::commands::{Router, Value, default_table};
use counter_monitor::app::events::HostUpdate;
use counter_monitor::app::ports::{AdcPort, HostPort, IndicatorPort};
use counter_monitor::app::service::DispatchLoop;
use counter_monitor::config::SystemConfig;
use counter_monitor::isr::{Button, Interrupts};
use counter_monitor::state::SharedState;
use libfuzzer_sys::fuzz_target;

struct Sink(usize);

impl HostPort for Sink {
    fn publish(&mut self, _update: &HostUpdate) {
        self.0 += 1;
    }
}

struct Adc(u16);

impl AdcPort for Adc {
    fn conversion_result(&mut self) -> u16 {
        self.0
    }
    fn clear_conversion_flag(&mut self) {}
}

struct Led;

impl IndicatorPort for Led {
    fn set_indicator(&mut self, _on: bool) {}
}

fuzz_target!(|data: &[u8]| {
    let config = SystemConfig::default();
    let shared = SharedState::new(&config);
    let isr = Interrupts::new(&shared, &config);
    let Ok(table) = default_table() else {
        return;
    };
    let router = Router::new(table, &shared);
    let mut dl = DispatchLoop::new(&shared);
    let mut sink = Sink(0);

    for pair in data.chunks(2) {
        let arg = pair.get(1).copied().unwrap_or(0);
        match pair[0] % 7 {
            0 => isr.on_tick(),
            1 => isr.on_button(Button::Sw1),
            2 => isr.on_button(Button::Sw2),
            3 => isr.on_conversion(&mut Adc(u16::from(arg) << 4), &mut Led),
            4 => {
                router.dispatch("bEnable", Value::Bool(arg & 1 == 1));
            }
            5 => {
                router.dispatch("u16Data", Value::U16(u16::from(arg) << 8 | u16::from(arg)));
            }
            _ => {
                dl.drain(&mut sink);
                assert!(!shared.report_pending());
            }
        }
        assert!(shared.c4() >= config.c4_floor && shared.c4() <= config.c4_ceiling);
    }
});
