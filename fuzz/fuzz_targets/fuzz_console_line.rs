//! Fuzz target: console line parsing and routing
//!
//! Drives arbitrary text through `console::handle_line` and asserts that it
//! never panics and that nothing but the two host-writable fields changes.
//!
//! cargo fuzz run fuzz_console_line

#![no_main]

use counter_monitor::adapters::console;
use counter_monitor::app::commands::{Router, default_table};
use counter_monitor::config::SystemConfig;
use counter_monitor::state::SharedState;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    let shared = SharedState::new(&SystemConfig::default());
    let Ok(table) = default_table() else {
        return;
    };
    let router = Router::new(table, &shared);
    let before = shared.snapshot();

    for line in text.lines() {
        let _ = console::handle_line(&router, line);
    }

    let after = shared.snapshot();
    assert_eq!((after.c1, after.c2, after.c3, after.c4), (before.c1, before.c2, before.c3, before.c4));
    assert_eq!(after.indicator, before.indicator);
});
