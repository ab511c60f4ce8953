//! Port traits — the boundary between the dispatch core and the board.
//!
//! ```text
//!   Board / host link ──▶ Port trait ──▶ DispatchLoop, Interrupts
//! ```
//!
//! Driven adapters (host link, CPU sleep, ADC, indicator output) implement
//! these traits.  The core consumes them via generics, so it never touches
//! registers directly and runs unchanged against mocks on the host.

use critical_section::CriticalSection;

use crate::error::BoardError;
use crate::isr::Interrupts;

use super::events::HostUpdate;

// ───────────────────────────────────────────────────────────────
// Host port (driven adapter: core → GUI)
// ───────────────────────────────────────────────────────────────

/// Outbound report channel.  The transport below it already frames
/// messages; this layer only hands over `(name, value)` pairs.
pub trait HostPort {
    fn publish(&mut self, update: &HostUpdate);
}

// ───────────────────────────────────────────────────────────────
// CPU port (driven adapter: core → low-power mode)
// ───────────────────────────────────────────────────────────────

/// Two ways to sleep, and a port uses one of them:
///
/// - halt inside the masked section ([`wait_for_interrupt`](Self::wait_for_interrupt)),
///   for bare-metal cores whose halt instruction unmasks atomically;
/// - block after the section ends ([`wait_for_wake`](Self::wait_for_wake)) on
///   a primitive that latches wake-ups, for RTOS tasks whose critical section
///   is a lock the producers also take.
pub trait CpuPort {
    /// Halt until an interrupt has been serviced.
    ///
    /// Called with interrupts masked (`cs`).  Implementations must unmask and
    /// halt as one indivisible step (LPM entry with GIE, `WFI`, `waiti 0`), so
    /// an interrupt that became pending while masked wakes the core at once
    /// instead of being slept through.
    fn wait_for_interrupt(&mut self, cs: CriticalSection<'_>);

    /// Block until woken, after the masked check saw nothing pending.
    ///
    /// A wake-up signalled between that check and this call must make it
    /// return immediately.  May return spuriously.
    fn wait_for_wake(&mut self) {}
}

// ───────────────────────────────────────────────────────────────
// ADC + indicator (driven adapters used from interrupt context)
// ───────────────────────────────────────────────────────────────

pub trait AdcPort {
    /// Result of the conversion that just completed.
    fn conversion_result(&mut self) -> u16;

    /// Acknowledge the conversion-complete interrupt.
    fn clear_conversion_flag(&mut self);
}

/// Binary output driven by the ADC comparator.
pub trait IndicatorPort {
    fn set_indicator(&mut self, on: bool);
}

/// [`IndicatorPort`] over any embedded-hal output pin (active high).
pub struct PinIndicator<P>(pub P);

impl<P: embedded_hal::digital::OutputPin> IndicatorPort for PinIndicator<P> {
    fn set_indicator(&mut self, on: bool) {
        // Called from the conversion handler, which must not log.  A failed
        // write is dropped; the next conversion rewrites the level.
        let _ = if on { self.0.set_high() } else { self.0.set_low() };
    }
}

// ───────────────────────────────────────────────────────────────
// Board (peripheral bring-up + interrupt hook registration)
// ───────────────────────────────────────────────────────────────

pub trait Board {
    /// Configure peripherals and route the tick, button-edge, and
    /// conversion-complete vectors to `interrupts`.  Interrupts stay
    /// disabled until [`enable_interrupts`](Self::enable_interrupts).
    fn init(&mut self, interrupts: &'static Interrupts<'static>) -> Result<(), BoardError>;

    /// Start the periodic sources and unmask the hooks.
    fn enable_interrupts(&mut self) -> Result<(), BoardError>;
}
