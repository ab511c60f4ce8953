//! Main dispatch loop: the only consumer of the pending-work flag.
//!
//! ```text
//!            ┌──────────── report pending ────────────┐
//!            ▼                                        │
//!   ┌─────────────────┐  masked check: clear   ┌──────┴──────┐
//!   │     ACTIVE      │ ─────────────────────▶ │    SLEEP    │
//!   │ drain + report  │                        │ (LPM / WFI) │
//!   └─────────────────┘ ◀───── interrupt ───── └─────────────┘
//! ```
//!
//! Each drain copies the shared fields and clears the flag in one masked
//! step, then publishes the copy.  Sleep is entered only after a masked
//! section has just seen the flag clear: either the halt happens inside that
//! section, or the port blocks on a latched wake-up afterwards.  In both
//! cases a producer landing in the window ends the sleep at once, and the
//! loop drains again.

use log::{debug, info, trace};

use crate::events::{Event, EventSet};
use crate::state::SharedState;

use super::events::{HostUpdate, STARTUP_FIELDS, drain_fields};
use super::ports::{CpuPort, HostPort};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Pending work observed (or not yet checked).
    Active,
    /// Halted or blocked awaiting a wake-up.
    Sleep,
}

/// Counters kept by the loop for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Times the core halted and was woken.
    pub sleeps: u32,
    /// Masked checks that found work and skipped sleep.
    pub rechecks: u32,
    /// Report cycles published.
    pub reports: u32,
    pub ticks: u32,
    pub sw1: u32,
    pub sw2: u32,
    pub conversions: u32,
    pub commands: u32,
}

impl LoopStats {
    fn record(&mut self, fired: EventSet) {
        for event in fired.iter() {
            let counter = match event {
                Event::Tick => &mut self.ticks,
                Event::Sw1 => &mut self.sw1,
                Event::Sw2 => &mut self.sw2,
                Event::Conversion => &mut self.conversions,
                Event::Command => &mut self.commands,
            };
            *counter = counter.wrapping_add(1);
        }
    }
}

pub struct DispatchLoop<'a> {
    shared: &'a SharedState,
    state: LoopState,
    stats: LoopStats,
}

impl<'a> DispatchLoop<'a> {
    pub fn new(shared: &'a SharedState) -> Self {
        Self {
            shared,
            state: LoopState::Active,
            stats: LoopStats::default(),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Send every field once.  Call before interrupts are enabled.
    pub fn report_startup(&mut self, host: &mut impl HostPort) {
        let snap = self.shared.snapshot();
        for field in STARTUP_FIELDS {
            host.publish(&HostUpdate::of(field, &snap));
        }
        info!(
            "startup report: c1={} c2={} c3={} c4={} inc={} enabled={}",
            snap.c1, snap.c2, snap.c3, snap.c4, snap.increment, snap.enabled
        );
    }

    /// One loop pass.  Returns the state the masked check chose.
    pub fn step(&mut self, host: &mut impl HostPort, cpu: &mut impl CpuPort) -> LoopState {
        self.drain(host);
        self.check_then_sleep(cpu)
    }

    // ── ACTIVE ────────────────────────────────────────────────

    /// Publish one report per pending cycle until the flag stays clear.
    /// Returns the number of report cycles sent.
    pub fn drain(&mut self, host: &mut impl HostPort) -> u32 {
        self.state = LoopState::Active;

        let fired = self.shared.take_events();
        if !fired.is_empty() {
            trace!("woke on events 0b{:05b}", fired.bits());
            self.stats.record(fired);
        }

        let shared = self.shared;
        let mut cycles = 0;
        while let Some(snap) = critical_section::with(|cs| shared.take_report(cs)) {
            for field in drain_fields(&snap) {
                host.publish(&HostUpdate::of(field, &snap));
            }
            cycles += 1;
        }

        if cycles > 0 {
            self.stats.reports = self.stats.reports.wrapping_add(cycles);
            debug!("drained {} report cycle(s)", cycles);
        }
        cycles
    }

    // ── ACTIVE → SLEEP ────────────────────────────────────────

    /// With interrupts masked, confirm nothing is pending and halt.
    pub fn check_then_sleep(&mut self, cpu: &mut impl CpuPort) -> LoopState {
        let shared = self.shared;
        let next = critical_section::with(|cs| {
            if shared.report_pending() {
                return LoopState::Active;
            }
            cpu.wait_for_interrupt(cs);
            LoopState::Sleep
        });
        if next == LoopState::Sleep {
            cpu.wait_for_wake();
        }

        match next {
            LoopState::Active => {
                self.stats.rechecks = self.stats.rechecks.wrapping_add(1);
                trace!("work landed before sleep, staying active");
            }
            LoopState::Sleep => {
                self.stats.sleeps = self.stats.sleeps.wrapping_add(1);
            }
        }
        self.state = next;
        next
    }
}
