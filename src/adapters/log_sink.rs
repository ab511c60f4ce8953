//! Log-backed host link.
//!
//! Implements [`HostPort`] by writing each outbound update to the ESP-IDF
//! logger (UART / USB-CDC).  A framed GUI transport would implement the
//! same trait.

use log::info;

use crate::app::events::HostUpdate;
use crate::app::ports::HostPort;

/// Adapter that logs every [`HostUpdate`] to the serial console.
#[derive(Debug, Default)]
pub struct LogHostLink {
    sent: u32,
}

impl LogHostLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates published so far.
    pub fn sent(&self) -> u32 {
        self.sent
    }
}

impl HostPort for LogHostLink {
    fn publish(&mut self, update: &HostUpdate) {
        self.sent = self.sent.wrapping_add(1);
        info!("HOST | {}={}", update.name(), update.value);
    }
}
