//! Application core: dispatch logic, zero I/O.
//!
//! The host-command router, outbound report model, and main dispatch loop.
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
