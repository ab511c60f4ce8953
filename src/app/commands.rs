//! Inbound host commands.
//!
//! The host sends `(name, value)` pairs.  [`Router::dispatch`] looks the name
//! up in an immutable [`CommandTable`] and hands the value to its handler,
//! which writes the host-writable shared fields.
//!
//! | Name      | Value        | Effect                                    |
//! |-----------|--------------|-------------------------------------------|
//! | `bEnable` | bool         | feature flag gating `c4`, requests report |
//! | `u16Data` | integer ≤ u16| raw Q8 bits of the `c4` increment         |
//!
//! Unknown names are dropped: logged at `warn` and counted, never answered.

use core::sync::atomic::{AtomicU32, Ordering};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{CommandError, TableError};
use crate::state::{HostFields, Q8, SharedState};

/// Longest accepted command name.  Matching cost grows with length.
pub const MAX_NAME_LEN: usize = 16;
/// Command table capacity.
pub const MAX_COMMANDS: usize = 8;

pub const CMD_ENABLE: &str = "bEnable";
pub const CMD_INCREMENT: &str = "u16Data";

// ───────────────────────────────────────────────────────────────
// Values
// ───────────────────────────────────────────────────────────────

/// Typed payload carried by host messages in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    I16(i16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    U8,
    U16,
    U32,
    I16,
}

impl Value {
    pub fn kind(self) -> ValueKind {
        match self {
            Self::Bool(_) => ValueKind::Bool,
            Self::U8(_) => ValueKind::U8,
            Self::U16(_) => ValueKind::U16,
            Self::U32(_) => ValueKind::U32,
            Self::I16(_) => ValueKind::I16,
        }
    }

    pub fn as_bool(self) -> Result<bool, CommandError> {
        match self {
            Self::Bool(b) => Ok(b),
            other => Err(CommandError::TypeMismatch {
                expected: ValueKind::Bool,
                got: other.kind(),
            }),
        }
    }

    /// Any integer variant whose value fits `u16`.
    pub fn as_u16(self) -> Result<u16, CommandError> {
        match self {
            Self::U8(v) => Ok(u16::from(v)),
            Self::U16(v) => Ok(v),
            Self::U32(v) => u16::try_from(v).map_err(|_| CommandError::OutOfRange),
            Self::I16(v) => u16::try_from(v).map_err(|_| CommandError::OutOfRange),
            Self::Bool(_) => Err(CommandError::TypeMismatch {
                expected: ValueKind::U16,
                got: ValueKind::Bool,
            }),
        }
    }
}

impl core::fmt::Display for Value {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::U8(v) => write!(f, "{v}"),
            Self::U16(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::I16(v) => write!(f, "{v}"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Command table
// ───────────────────────────────────────────────────────────────

/// Whether a handled command needs the main loop to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Quiet,
    ReportRequested,
}

pub type CommandHandler = fn(HostFields<'_>, Value) -> Result<Outcome, CommandError>;

#[derive(Clone, Copy)]
pub struct CommandEntry {
    pub name: &'static str,
    pub handler: CommandHandler,
}

impl core::fmt::Debug for CommandEntry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CommandEntry").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Name → handler mapping, validated once and immutable afterwards.
#[derive(Debug)]
pub struct CommandTable {
    entries: heapless::Vec<CommandEntry, MAX_COMMANDS>,
}

impl CommandTable {
    /// Build a table, rejecting empty, over-long, duplicate, and
    /// prefix-overlapping names.
    pub fn new(entries: &[CommandEntry]) -> Result<Self, TableError> {
        let mut table: heapless::Vec<CommandEntry, MAX_COMMANDS> = heapless::Vec::new();
        for entry in entries {
            let name = entry.name;
            if name.is_empty() {
                return Err(TableError::EmptyName);
            }
            if name.len() > MAX_NAME_LEN {
                return Err(TableError::NameTooLong(name));
            }
            for existing in &table {
                if existing.name == name {
                    return Err(TableError::Duplicate(name));
                }
                if existing.name.starts_with(name) || name.starts_with(existing.name) {
                    return Err(TableError::Overlapping(existing.name, name));
                }
            }
            table.push(*entry).map_err(|_| TableError::Full)?;
        }
        Ok(Self { entries: table })
    }

    /// Exact-match lookup.
    pub fn lookup(&self, name: &str) -> Option<&CommandEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ── Reference handlers ────────────────────────────────────────

fn enable_handler(fields: HostFields<'_>, value: Value) -> Result<Outcome, CommandError> {
    fields.set_enabled(value.as_bool()?);
    Ok(Outcome::ReportRequested)
}

fn increment_handler(fields: HostFields<'_>, value: Value) -> Result<Outcome, CommandError> {
    let bits = value.as_u16()?;
    fields.set_increment(Q8::from_bits(i32::from(bits)));
    Ok(Outcome::Quiet)
}

/// The reference GUI command set.
pub fn default_table() -> Result<CommandTable, TableError> {
    CommandTable::new(&[
        CommandEntry { name: CMD_ENABLE, handler: enable_handler },
        CommandEntry { name: CMD_INCREMENT, handler: increment_handler },
    ])
}

// ───────────────────────────────────────────────────────────────
// Router
// ───────────────────────────────────────────────────────────────

/// Result of routing one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Handled(Outcome),
    Unknown,
    Rejected(CommandError),
}

/// Counters kept by the [`Router`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouterStats {
    pub handled: u32,
    pub unknown: u32,
    pub rejected: u32,
}

/// Routes inbound host messages to the command table.
///
/// `dispatch` takes `&self` and writes only atomics, so the host link's
/// receive context can call it while the main loop is asleep.  The handler
/// and its report request run under the critical section, like the tick.
pub struct Router<'a> {
    table: CommandTable,
    shared: &'a SharedState,
    handled: AtomicU32,
    unknown: AtomicU32,
    rejected: AtomicU32,
}

impl<'a> Router<'a> {
    pub fn new(table: CommandTable, shared: &'a SharedState) -> Self {
        Self {
            table,
            shared,
            handled: AtomicU32::new(0),
            unknown: AtomicU32::new(0),
            rejected: AtomicU32::new(0),
        }
    }

    pub fn table(&self) -> &CommandTable {
        &self.table
    }

    pub fn dispatch(&self, name: &str, value: Value) -> Dispatch {
        let Some(entry) = self.table.lookup(name) else {
            warn!("command '{}' unknown, ignored", name);
            bump(&self.unknown);
            return Dispatch::Unknown;
        };

        let fields = self.shared.host_fields();
        let result: Result<Outcome, CommandError> = critical_section::with(|_| {
            let outcome = (entry.handler)(fields, value)?;
            if outcome == Outcome::ReportRequested {
                fields.request_report();
            }
            Ok(outcome)
        });
        match result {
            Ok(outcome) => {
                debug!("command '{}' = {:?} handled", name, value);
                bump(&self.handled);
                Dispatch::Handled(outcome)
            }
            Err(e) => {
                warn!("command '{}' rejected: {}", name, e);
                bump(&self.rejected);
                Dispatch::Rejected(e)
            }
        }
    }

    pub fn stats(&self) -> RouterStats {
        RouterStats {
            handled: self.handled.load(Ordering::Relaxed),
            unknown: self.unknown.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}

/// Single-writer increment (no RMW atomics needed).
fn bump(counter: &AtomicU32) {
    counter.store(counter.load(Ordering::Relaxed).wrapping_add(1), Ordering::Relaxed);
}
