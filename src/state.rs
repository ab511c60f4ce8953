//! Shared state between interrupt handlers, the command router, and the
//! main dispatch loop.
//!
//! Every field is an atomic cell, so no write is ever observable
//! half-finished.  Fields have exactly one writer context:
//!
//! | Field            | Writer                | Readers              |
//! |------------------|-----------------------|----------------------|
//! | `c1`             | SW1 ISR               | main loop            |
//! | `c2`             | SW2 ISR               | main loop            |
//! | `c3`, `c4`       | timer ISR             | main loop            |
//! | `increment`      | router (`u16Data`)    | timer ISR, main loop |
//! | `enabled`        | router (`bEnable`)    | timer ISR, main loop |
//! | `indicator`      | ADC ISR               | main loop            |
//! | `report_pending` | ISR / router set, main loop clears | main loop |
//!
//! Single-writer fields use load + store, not read-modify-write atomics.
//! Outside code gets read access only; writes go through
//! [`Interrupts`](crate::isr::Interrupts) or [`HostFields`].

use core::sync::atomic::{AtomicBool, AtomicI32, AtomicU8, AtomicU16, AtomicU32, Ordering};

use critical_section::CriticalSection;

use crate::config::SystemConfig;
use crate::events::{Event, EventFlags, EventSet};

/// Signed Q8 fixed-point (24 integer bits, 8 fractional bits).
pub type Q8 = fixed::types::I24F8;

/// Point-in-time copy of every shared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub c1: u8,
    pub c2: u16,
    pub c3: u32,
    pub c4: Q8,
    pub increment: Q8,
    pub enabled: bool,
    pub indicator: bool,
}

pub struct SharedState {
    c1: AtomicU8,
    c2: AtomicU16,
    c3: AtomicU32,
    /// Raw Q8 bits.
    c4: AtomicI32,
    /// Raw Q8 bits.
    increment: AtomicI32,
    enabled: AtomicBool,
    indicator: AtomicBool,
    report_pending: AtomicBool,
    events: EventFlags,
}

impl SharedState {
    /// Seed every field from `config`.  The pending-work flag starts clear.
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            c1: AtomicU8::new(config.c1_initial),
            c2: AtomicU16::new(config.c2_initial),
            c3: AtomicU32::new(config.c3_initial),
            c4: AtomicI32::new(config.c4_initial.to_bits()),
            increment: AtomicI32::new(config.c4_increment.to_bits()),
            enabled: AtomicBool::new(config.feature_enabled),
            indicator: AtomicBool::new(false),
            report_pending: AtomicBool::new(false),
            events: EventFlags::new(),
        }
    }

    // ── Reads ─────────────────────────────────────────────────

    pub fn c1(&self) -> u8 {
        self.c1.load(Ordering::Relaxed)
    }

    pub fn c2(&self) -> u16 {
        self.c2.load(Ordering::Relaxed)
    }

    pub fn c3(&self) -> u32 {
        self.c3.load(Ordering::Relaxed)
    }

    pub fn c4(&self) -> Q8 {
        Q8::from_bits(self.c4.load(Ordering::Relaxed))
    }

    pub fn increment(&self) -> Q8 {
        Q8::from_bits(self.increment.load(Ordering::Relaxed))
    }

    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn indicator(&self) -> bool {
        self.indicator.load(Ordering::Relaxed)
    }

    pub fn report_pending(&self) -> bool {
        self.report_pending.load(Ordering::Acquire)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            c1: self.c1(),
            c2: self.c2(),
            c3: self.c3(),
            c4: self.c4(),
            increment: self.increment(),
            enabled: self.enabled(),
            indicator: self.indicator(),
        }
    }

    // ── Main-loop consumer side ───────────────────────────────

    /// If a report is pending, copy every field and clear the flag.
    ///
    /// Requires the critical section, which every report-requesting producer
    /// also holds while it writes: the copy and the clear happen as one step,
    /// so a producer that runs afterwards re-arms the flag and its update is
    /// carried by the next report.
    pub fn take_report(&self, _cs: CriticalSection<'_>) -> Option<Snapshot> {
        if !self.report_pending() {
            return None;
        }
        let snapshot = self.snapshot();
        self.report_pending.store(false, Ordering::Release);
        Some(snapshot)
    }

    /// Read and clear the fired-event set.
    pub fn take_events(&self) -> EventSet {
        self.events.take()
    }

    // ── Producer side (crate-internal) ────────────────────────

    pub(crate) fn add_c1(&self, step: u8) {
        self.c1.store(self.c1().wrapping_add(step), Ordering::Relaxed);
    }

    pub(crate) fn add_c2(&self, step: u16) {
        self.c2.store(self.c2().wrapping_add(step), Ordering::Relaxed);
    }

    pub(crate) fn add_c3(&self, step: u32) {
        self.c3.store(self.c3().wrapping_add(step), Ordering::Relaxed);
    }

    pub(crate) fn set_c4(&self, value: Q8) {
        self.c4.store(value.to_bits(), Ordering::Relaxed);
    }

    pub(crate) fn set_indicator(&self, on: bool) {
        self.indicator.store(on, Ordering::Relaxed);
    }

    /// Publish prior writes and request a report.
    pub(crate) fn request_report(&self, source: Event) {
        self.events.raise(source);
        self.report_pending.store(true, Ordering::Release);
    }

    pub(crate) fn record_event(&self, source: Event) {
        self.events.raise(source);
    }

    /// Host-writable view for command handlers.
    pub fn host_fields(&self) -> HostFields<'_> {
        HostFields(self)
    }
}

/// The fields a host command is allowed to write.
#[derive(Clone, Copy)]
pub struct HostFields<'a>(&'a SharedState);

impl HostFields<'_> {
    pub fn set_enabled(&self, enabled: bool) {
        self.0.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn set_increment(&self, increment: Q8) {
        self.0.increment.store(increment.to_bits(), Ordering::Relaxed);
    }

    /// Ask the main loop to report on its next pass.
    pub fn request_report(&self) {
        self.0.request_report(Event::Command);
    }

    /// Read access, for handlers that need the current value.
    pub fn state(&self) -> &SharedState {
        self.0
    }
}
