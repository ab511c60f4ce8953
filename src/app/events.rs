//! Outbound host updates.
//!
//! The [`DispatchLoop`](super::service::DispatchLoop) turns a shared-state
//! [`Snapshot`] into named values and hands them to the
//! [`HostPort`](super::ports::HostPort).  Adapters on the other side decide
//! how they travel (GUI link, serial log).

use crate::state::Snapshot;

use super::commands::{CMD_ENABLE, CMD_INCREMENT, Value};

/// Reported fields and their wire names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// 8-bit SW1 counter.
    C1,
    /// 16-bit SW2 counter.
    C2,
    /// 32-bit timer counter.
    C3,
    /// Q8 accumulator as raw i16.
    C4,
    /// Q8 increment as raw i16.
    Increment,
    /// Feature flag.
    Enable,
}

impl Field {
    pub const fn name(self) -> &'static str {
        match self {
            Self::C1 => "c1",
            Self::C2 => "c2",
            Self::C3 => "c3",
            Self::C4 => "c4",
            Self::Increment => CMD_INCREMENT,
            Self::Enable => CMD_ENABLE,
        }
    }

    /// Current value of this field in `snap`.
    pub fn value(self, snap: &Snapshot) -> Value {
        match self {
            Self::C1 => Value::U8(snap.c1),
            Self::C2 => Value::U16(snap.c2),
            Self::C3 => Value::U32(snap.c3),
            // Raw bits, truncated to the 16-bit wire width.
            Self::C4 => Value::I16(snap.c4.to_bits() as i16),
            Self::Increment => Value::I16(snap.increment.to_bits() as i16),
            Self::Enable => Value::Bool(snap.enabled),
        }
    }
}

/// One named value sent to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostUpdate {
    pub field: Field,
    pub value: Value,
}

impl HostUpdate {
    pub fn of(field: Field, snap: &Snapshot) -> Self {
        Self {
            field,
            value: field.value(snap),
        }
    }

    pub fn name(&self) -> &'static str {
        self.field.name()
    }
}

/// Every field, sent once at startup.
pub const STARTUP_FIELDS: [Field; 6] = [
    Field::C1,
    Field::C2,
    Field::C3,
    Field::C4,
    Field::Increment,
    Field::Enable,
];

/// Fields sent on each drain; `c4` only while the feature is enabled.
pub fn drain_fields(snap: &Snapshot) -> heapless::Vec<Field, 4> {
    let mut fields = heapless::Vec::new();
    for field in [Field::C1, Field::C2, Field::C3] {
        let _ = fields.push(field);
    }
    if snap.enabled {
        let _ = fields.push(Field::C4);
    }
    fields
}
