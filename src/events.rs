//! Interrupt event flags.
//!
//! Events are produced by:
//! - the periodic timer (tick)
//! - GPIO edge ISRs (SW1, SW2)
//! - ADC conversion-complete
//! - host command handlers that ask for a report
//!
//! The main loop takes the whole set once per drain, so "event happened" is
//! decoupled from "event was handled".  Repeated firings of the same kind
//! between two drains coalesce into one bit.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Timer ISR   │────▶│              │     │              │
//! │ GPIO ISR    │────▶│  EventFlags  │────▶│  Main Loop   │
//! │ ADC ISR     │────▶│  (AtomicU8)  │     │  (consumer)  │
//! │ Router      │────▶│              │     │              │
//! └─────────────┘     └──────────────┘     └──────────────┘
//! ```

use core::sync::atomic::{AtomicU8, Ordering};

/// Interrupt sources, one bit each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Event {
    /// Periodic timer expired.
    Tick = 0b0000_0001,
    /// SW1 falling edge.
    Sw1 = 0b0000_0010,
    /// SW2 falling edge.
    Sw2 = 0b0000_0100,
    /// ADC conversion complete.
    Conversion = 0b0000_1000,
    /// A host command requested a report.
    Command = 0b0001_0000,
}

impl Event {
    pub const ALL: [Event; 5] = [
        Event::Tick,
        Event::Sw1,
        Event::Sw2,
        Event::Conversion,
        Event::Command,
    ];

    /// Return the bitmask for this event.
    pub const fn mask(self) -> u8 {
        self as u8
    }
}

/// Lock-free set of fired events.  Producers `raise`, the main loop `take`s.
#[derive(Debug, Default)]
pub struct EventFlags(AtomicU8);

impl EventFlags {
    pub const fn new() -> Self {
        Self(AtomicU8::new(0))
    }

    /// Mark `event` as fired.  Safe from interrupt context.
    pub fn raise(&self, event: Event) {
        self.0.fetch_or(event.mask(), Ordering::Release);
    }

    /// Atomically read and clear every fired event.
    pub fn take(&self) -> EventSet {
        EventSet(self.0.swap(0, Ordering::Acquire))
    }

    pub fn is_empty(&self) -> bool {
        self.0.load(Ordering::Acquire) == 0
    }
}

/// Snapshot of [`EventFlags`] returned by [`EventFlags::take`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventSet(u8);

impl EventSet {
    pub const EMPTY: Self = Self(0);

    pub fn contains(self, event: Event) -> bool {
        self.0 & event.mask() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    /// Fired events in [`Event::ALL`] order.
    pub fn iter(self) -> impl Iterator<Item = Event> {
        Event::ALL.into_iter().filter(move |e| self.contains(*e))
    }
}
