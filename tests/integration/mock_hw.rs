//! Mock board for integration tests.
//!
//! Records every host update and indicator write, and stands in for the
//! CPU with a scripted interrupt source so tests can place interrupts at
//! exact points in the main loop without real timers or GPIO.

use std::collections::VecDeque;

use counter_monitor::app::commands::Value;
use counter_monitor::app::events::{Field, HostUpdate};
use counter_monitor::app::ports::{AdcPort, CpuPort, HostPort, IndicatorPort};
use counter_monitor::isr::{Button, Interrupts};
use critical_section::CriticalSection;

// ── Interrupt script ──────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)]
pub enum Irq {
    Tick,
    Button(Button),
    /// Conversion completes with this raw result.
    Conversion(u16),
}

// ── MockHost ──────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MockHost {
    pub updates: Vec<HostUpdate>,
}

#[allow(dead_code)]
impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.updates.iter().map(HostUpdate::name).collect()
    }

    /// Most recent value published for `field`.
    pub fn last(&self, field: Field) -> Option<Value> {
        self.updates.iter().rev().find(|u| u.field == field).map(|u| u.value)
    }

    pub fn count(&self, field: Field) -> usize {
        self.updates.iter().filter(|u| u.field == field).count()
    }

    pub fn clear(&mut self) {
        self.updates.clear();
    }
}

impl HostPort for MockHost {
    fn publish(&mut self, update: &HostUpdate) {
        self.updates.push(*update);
    }
}

/// Host link that fires one interrupt while the `nth` update is being sent.
pub struct InjectingHost<'a> {
    pub inner: MockHost,
    interrupts: &'a Interrupts<'a>,
    fire_at: Option<usize>,
    irq: Irq,
}

#[allow(dead_code)]
impl<'a> InjectingHost<'a> {
    pub fn new(interrupts: &'a Interrupts<'a>, nth: usize, irq: Irq) -> Self {
        Self {
            inner: MockHost::new(),
            interrupts,
            fire_at: Some(nth),
            irq,
        }
    }
}

impl HostPort for InjectingHost<'_> {
    fn publish(&mut self, update: &HostUpdate) {
        self.inner.publish(update);
        if self.fire_at == Some(self.inner.updates.len()) {
            self.fire_at = None;
            fire(self.interrupts, self.irq, &mut MockAdc::default(), &mut MockIndicator::default());
        }
    }
}

// ── ADC + indicator ───────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MockAdc {
    pub result: u16,
    pub clears: u32,
}

impl AdcPort for MockAdc {
    fn conversion_result(&mut self) -> u16 {
        self.result
    }

    fn clear_conversion_flag(&mut self) {
        self.clears += 1;
    }
}

#[derive(Debug, Default)]
pub struct MockIndicator {
    pub history: Vec<bool>,
}

impl IndicatorPort for MockIndicator {
    fn set_indicator(&mut self, on: bool) {
        self.history.push(on);
    }
}

pub fn fire(interrupts: &Interrupts<'_>, irq: Irq, adc: &mut MockAdc, indicator: &mut MockIndicator) {
    match irq {
        Irq::Tick => interrupts.on_tick(),
        Irq::Button(b) => interrupts.on_button(b),
        Irq::Conversion(raw) => {
            adc.result = raw;
            interrupts.on_conversion(adc, indicator);
        }
    }
}

// ── SimCpu ────────────────────────────────────────────────────

/// CPU whose halt services the next scripted interrupt.
///
/// An empty script models an interrupt that was already latched while
/// masked: the halt returns at once without running a handler.
pub struct SimCpu<'a> {
    interrupts: &'a Interrupts<'a>,
    script: VecDeque<Irq>,
    pub adc: MockAdc,
    pub indicator: MockIndicator,
    pub halts: u32,
}

#[allow(dead_code)]
impl<'a> SimCpu<'a> {
    pub fn new(interrupts: &'a Interrupts<'a>) -> Self {
        Self {
            interrupts,
            script: VecDeque::new(),
            adc: MockAdc::default(),
            indicator: MockIndicator::default(),
            halts: 0,
        }
    }

    pub fn schedule(&mut self, irqs: impl IntoIterator<Item = Irq>) {
        self.script.extend(irqs);
    }

    pub fn pending(&self) -> usize {
        self.script.len()
    }
}

impl CpuPort for SimCpu<'_> {
    fn wait_for_interrupt(&mut self, _cs: CriticalSection<'_>) {
        self.halts += 1;
        if let Some(irq) = self.script.pop_front() {
            fire(self.interrupts, irq, &mut self.adc, &mut self.indicator);
        }
    }
}
