//! Integration tests for the interrupt → shared state → dispatch loop →
//! host pipeline.
//!
//! Interrupts are placed with `SimCpu` (fired while the core is halted),
//! `InjectingHost` (fired mid-report), or by calling the handlers directly
//! between loop phases.

use std::sync::atomic::{AtomicBool, Ordering};

use counter_monitor::app::commands::{Dispatch, Outcome, Router, Value, default_table};
use counter_monitor::app::events::Field;
use counter_monitor::app::service::{DispatchLoop, LoopState};
use counter_monitor::config::SystemConfig;
use counter_monitor::drivers::hw_timer;
use counter_monitor::isr::{Button, Interrupts, advance_accumulator};
use counter_monitor::state::{Q8, SharedState};

use crate::mock_hw::{InjectingHost, Irq, MockHost, SimCpu};

// ── Startup + tick reporting ──────────────────────────────────

#[test]
fn startup_report_then_tick_drives_first_report() {
    let config = SystemConfig::default();
    let shared = SharedState::new(&config);
    let isr = Interrupts::new(&shared, &config);
    let mut dl = DispatchLoop::new(&shared);
    let mut host = MockHost::new();
    let mut cpu = SimCpu::new(&isr);

    dl.report_startup(&mut host);
    assert_eq!(host.names(), ["c1", "c2", "c3", "c4", "u16Data", "bEnable"]);
    assert_eq!(host.last(Field::Increment), Some(Value::I16(128)));
    host.clear();

    // Nothing pending yet: the loop sleeps and the tick fires during the halt.
    cpu.schedule([Irq::Tick]);
    assert_eq!(dl.step(&mut host, &mut cpu), LoopState::Sleep);
    assert!(host.updates.is_empty());

    dl.step(&mut host, &mut cpu);
    assert_eq!(host.names(), ["c1", "c2", "c3", "c4"]);
    assert_eq!(host.last(Field::C1), Some(Value::U8(50)));
    assert_eq!(host.last(Field::C2), Some(Value::U16(5000)));
    assert_eq!(host.last(Field::C3), Some(Value::U32(20_000)));
    // 0.5 + 0.5 = 1.0 → raw Q8 bits 256.
    assert_eq!(host.last(Field::C4), Some(Value::I16(256)));
    assert_eq!(cpu.halts, 2);
}

#[test]
fn button_presses_reported_on_next_tick_only() {
    let config = SystemConfig::default();
    let shared = SharedState::new(&config);
    let isr = Interrupts::new(&shared, &config);
    let mut dl = DispatchLoop::new(&shared);
    let mut host = MockHost::new();
    let mut cpu = SimCpu::new(&isr);

    cpu.schedule([
        Irq::Button(Button::Sw1),
        Irq::Button(Button::Sw1),
        Irq::Button(Button::Sw2),
        Irq::Tick,
    ]);
    for _ in 0..4 {
        dl.step(&mut host, &mut cpu);
        if cpu.pending() > 0 {
            assert!(host.updates.is_empty(), "buttons alone must not report");
        }
    }
    dl.step(&mut host, &mut cpu);

    assert_eq!(host.count(Field::C1), 1);
    assert_eq!(host.last(Field::C1), Some(Value::U8(150)));
    assert_eq!(host.last(Field::C2), Some(Value::U16(10_000)));

    let stats = dl.stats();
    assert_eq!((stats.sw1, stats.sw2, stats.ticks), (2, 1, 1));
    assert_eq!(stats.reports, 1);
}

// ── Race windows ──────────────────────────────────────────────

#[test]
fn tick_during_report_triggers_second_cycle() {
    let config = SystemConfig::default();
    let shared = SharedState::new(&config);
    let isr = Interrupts::new(&shared, &config);
    let mut dl = DispatchLoop::new(&shared);
    // Fire a tick right after `c2` goes out.
    let mut host = InjectingHost::new(&isr, 2, Irq::Tick);

    isr.on_tick();
    assert_eq!(dl.drain(&mut host), 2);

    let c3: Vec<_> = host
        .inner
        .updates
        .iter()
        .filter(|u| u.field == Field::C3)
        .map(|u| u.value)
        .collect();
    // First cycle sends its snapshot, unaffected by the mid-report tick.
    assert_eq!(c3, [Value::U32(20_000), Value::U32(30_000)]);
    assert!(!shared.report_pending());
}

#[test]
fn tick_between_drain_and_sleep_check_is_not_slept_through() {
    let config = SystemConfig::default();
    let shared = SharedState::new(&config);
    let isr = Interrupts::new(&shared, &config);
    let mut dl = DispatchLoop::new(&shared);
    let mut host = MockHost::new();
    let mut cpu = SimCpu::new(&isr);

    assert_eq!(dl.drain(&mut host), 0);
    isr.on_tick();
    assert_eq!(dl.check_then_sleep(&mut cpu), LoopState::Active);
    assert_eq!(cpu.halts, 0);

    assert_eq!(dl.drain(&mut host), 1);
    assert_eq!(host.last(Field::C3), Some(Value::U32(20_000)));
    assert_eq!(dl.check_then_sleep(&mut cpu), LoopState::Sleep);
    assert_eq!(dl.stats().rechecks, 1);
    assert_eq!(dl.stats().sleeps, 1);
}

#[test]
fn concurrent_ticks_are_never_lost() {
    const TICKS: u32 = 2_000;

    let config = SystemConfig::default();
    let shared = SharedState::new(&config);
    let isr = Interrupts::new(&shared, &config);
    let mut dl = DispatchLoop::new(&shared);
    let mut host = MockHost::new();
    let done = AtomicBool::new(false);

    std::thread::scope(|s| {
        // Same entry point the esp_timer task uses.
        s.spawn(|| {
            for _ in 0..TICKS {
                hw_timer::tick_expired(&isr);
                std::thread::yield_now();
            }
            done.store(true, Ordering::Release);
        });

        while !done.load(Ordering::Acquire) {
            dl.drain(&mut host);
            std::thread::yield_now();
        }
    });
    dl.drain(&mut host);

    let expected = config.c3_initial + TICKS * config.c3_step;
    assert_eq!(shared.c3(), expected);
    assert_eq!(host.last(Field::C3), Some(Value::U32(expected)));

    let mut prev = config.c3_initial;
    for update in host.updates.iter().filter(|u| u.field == Field::C3) {
        let Value::U32(c3) = update.value else {
            panic!("c3 published as {:?}", update.value);
        };
        assert!(c3 > prev, "c3 went backwards: {prev} -> {c3}");
        assert_eq!(c3 % config.c3_step, 0);
        prev = c3;
    }
}

/// c4 after `ticks` timer expiries from the default starting point.
fn c4_after(config: &SystemConfig, ticks: u32) -> Q8 {
    (0..ticks).fold(config.c4_initial, |c4, _| {
        advance_accumulator(c4, config.c4_increment, config.c4_floor, config.c4_ceiling)
    })
}

#[test]
fn concurrent_reports_pair_c3_with_its_c4() {
    const TICKS: u32 = 1_000;

    let config = SystemConfig::default();
    let shared = SharedState::new(&config);
    let isr = Interrupts::new(&shared, &config);
    let mut dl = DispatchLoop::new(&shared);
    let mut host = MockHost::new();
    let done = AtomicBool::new(false);

    std::thread::scope(|s| {
        s.spawn(|| {
            for _ in 0..TICKS {
                hw_timer::tick_expired(&isr);
            }
            done.store(true, Ordering::Release);
        });

        while !done.load(Ordering::Acquire) {
            dl.drain(&mut host);
        }
    });
    dl.drain(&mut host);

    // Every cycle is c1, c2, c3, c4; c3 fixes the tick count, so c4 must
    // be the value that same tick produced.
    let cycles: Vec<_> = host.updates.chunks(4).collect();
    assert!(!cycles.is_empty());
    for cycle in cycles {
        assert_eq!(cycle[2].field, Field::C3);
        assert_eq!(cycle[3].field, Field::C4);
        let Value::U32(c3) = cycle[2].value else {
            panic!("c3 published as {:?}", cycle[2].value);
        };
        let ticks = (c3 - config.c3_initial) / config.c3_step;
        let want = c4_after(&config, ticks).to_bits() as i16;
        assert_eq!(cycle[3].value, Value::I16(want), "torn report at tick {ticks}");
    }
    assert_eq!(host.last(Field::C3), Some(Value::U32(config.c3_initial + TICKS * config.c3_step)));
}

// ── ADC comparator ────────────────────────────────────────────

#[test]
fn conversions_drive_indicator_without_reporting() {
    let config = SystemConfig::default();
    let shared = SharedState::new(&config);
    let isr = Interrupts::new(&shared, &config);
    let mut dl = DispatchLoop::new(&shared);
    let mut host = MockHost::new();
    let mut cpu = SimCpu::new(&isr);

    cpu.schedule([
        Irq::Conversion(3000),
        Irq::Conversion(config.adc_threshold),
        Irq::Conversion(config.adc_threshold + 1),
    ]);
    dl.step(&mut host, &mut cpu);
    assert!(shared.indicator());
    dl.step(&mut host, &mut cpu);
    assert!(!shared.indicator(), "equal to threshold is off");
    dl.step(&mut host, &mut cpu);
    assert!(shared.indicator());

    assert_eq!(cpu.indicator.history, [true, false, true]);
    assert_eq!(cpu.adc.clears, 3);
    assert!(host.updates.is_empty());
    assert!(!shared.report_pending());
}

// ── Accumulator ───────────────────────────────────────────────

#[test]
fn c4_wraps_to_floor_past_ceiling() {
    let config = SystemConfig::default();
    let shared = SharedState::new(&config);
    let isr = Interrupts::new(&shared, &config);
    let mut dl = DispatchLoop::new(&shared);
    let mut host = MockHost::new();

    // 0.5 + 199 × 0.5 = 100.0, exactly the ceiling.
    for _ in 0..199 {
        isr.on_tick();
    }
    assert_eq!(shared.c4(), Q8::from_num(100));

    isr.on_tick();
    assert_eq!(shared.c4(), Q8::ZERO);
    dl.drain(&mut host);
    assert_eq!(host.last(Field::C4), Some(Value::I16(0)));
}

// ── Host commands through the loop ────────────────────────────

#[test]
fn disabling_feature_freezes_c4_and_omits_it() {
    let config = SystemConfig::default();
    let shared = SharedState::new(&config);
    let isr = Interrupts::new(&shared, &config);
    let router = Router::new(default_table().unwrap(), &shared);
    let mut dl = DispatchLoop::new(&shared);
    let mut host = MockHost::new();

    assert_eq!(
        router.dispatch("bEnable", Value::Bool(false)),
        Dispatch::Handled(Outcome::ReportRequested)
    );
    assert_eq!(dl.drain(&mut host), 1);
    assert_eq!(host.names(), ["c1", "c2", "c3"]);

    host.clear();
    isr.on_tick();
    isr.on_tick();
    dl.drain(&mut host);
    assert_eq!(host.count(Field::C4), 0);
    assert_eq!(shared.c4(), config.c4_initial);
    assert_eq!(host.last(Field::C3), Some(Value::U32(30_000)));

    // Re-enable: c4 resumes from where it stopped.
    router.dispatch("bEnable", Value::Bool(true));
    isr.on_tick();
    host.clear();
    dl.drain(&mut host);
    assert_eq!(host.last(Field::C4), Some(Value::I16(256)));
}

#[test]
fn new_increment_applies_on_next_tick_without_report() {
    let config = SystemConfig::default();
    let shared = SharedState::new(&config);
    let isr = Interrupts::new(&shared, &config);
    let router = Router::new(default_table().unwrap(), &shared);
    let mut dl = DispatchLoop::new(&shared);
    let mut host = MockHost::new();

    // 512 raw = 2.0
    assert_eq!(
        router.dispatch("u16Data", Value::U16(512)),
        Dispatch::Handled(Outcome::Quiet)
    );
    assert!(!shared.report_pending());
    assert_eq!(dl.drain(&mut host), 0);

    isr.on_tick();
    dl.drain(&mut host);
    // 0.5 + 2.0 = 2.5 → 640 raw.
    assert_eq!(host.last(Field::C4), Some(Value::I16(640)));
}
