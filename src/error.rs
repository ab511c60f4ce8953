//! Unified error types for the counter-monitor firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! binary's error handling uniform.  All variants are `Copy` so they can be
//! returned from command handlers without allocation.

use core::fmt;

use crate::app::commands::ValueKind;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The command table could not be built.
    Table(TableError),
    /// An inbound command carried a value its handler rejected.
    Command(CommandError),
    /// Configuration failed validation.
    Config(ConfigError),
    /// Board bring-up failed.
    Board(BoardError),
    /// A debug-console line could not be parsed.
    Console(ConsoleError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table(e) => write!(f, "command table: {e}"),
            Self::Command(e) => write!(f, "command: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Board(e) => write!(f, "board: {e}"),
            Self::Console(e) => write!(f, "console: {e}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Command table construction
// ---------------------------------------------------------------------------

/// Rejections raised while building a [`CommandTable`](crate::app::commands::CommandTable).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableError {
    /// A command name was empty.
    EmptyName,
    /// A command name exceeds [`MAX_NAME_LEN`](crate::app::commands::MAX_NAME_LEN).
    NameTooLong(&'static str),
    /// The same name was registered twice.
    Duplicate(&'static str),
    /// One name is a prefix of another, so a length-limited match could
    /// resolve either.
    Overlapping(&'static str, &'static str),
    /// More entries than [`MAX_COMMANDS`](crate::app::commands::MAX_COMMANDS).
    Full,
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "empty command name"),
            Self::NameTooLong(name) => write!(f, "command name too long: '{name}'"),
            Self::Duplicate(name) => write!(f, "duplicate command '{name}'"),
            Self::Overlapping(a, b) => write!(f, "command '{a}' overlaps '{b}'"),
            Self::Full => write!(f, "command table full"),
        }
    }
}

impl From<TableError> for Error {
    fn from(e: TableError) -> Self {
        Self::Table(e)
    }
}

// ---------------------------------------------------------------------------
// Command handler errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// The value's type is not accepted by the handler.
    TypeMismatch { expected: ValueKind, got: ValueKind },
    /// The value does not fit the target field.
    OutOfRange,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeMismatch { expected, got } => {
                write!(f, "expected {expected:?} value, got {got:?}")
            }
            Self::OutOfRange => write!(f, "value out of range"),
        }
    }
}

impl From<CommandError> for Error {
    fn from(e: CommandError) -> Self {
        Self::Command(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Board bring-up errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardError {
    AdcInitFailed(i32),
    GpioConfigFailed(i32),
    IsrInstallFailed(i32),
    TimerFailed(i32),
    GpioWriteFailed(i32),
    /// `enable_interrupts` called before `init`.
    NotInitialized,
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (rc={rc})"),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={rc})"),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR service install failed (rc={rc})"),
            Self::TimerFailed(rc) => write!(f, "esp_timer setup failed (rc={rc})"),
            Self::GpioWriteFailed(rc) => write!(f, "GPIO write failed (rc={rc})"),
            Self::NotInitialized => write!(f, "interrupts enabled before board init"),
        }
    }
}

/// Lets board drivers serve as embedded-hal pins.
impl embedded_hal::digital::Error for BoardError {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

impl From<BoardError> for Error {
    fn from(e: BoardError) -> Self {
        Self::Board(e)
    }
}

// ---------------------------------------------------------------------------
// Debug console
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleError {
    /// Line is not of the form `name=value`.
    Malformed,
    /// Value is not a boolean or an integer representable as a [`Value`](crate::app::commands::Value).
    UnsupportedValue,
}

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "expected name=value"),
            Self::UnsupportedValue => write!(f, "value must be a bool or an integer in i16/u32 range"),
        }
    }
}

impl From<ConsoleError> for Error {
    fn from(e: ConsoleError) -> Self {
        Self::Console(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
