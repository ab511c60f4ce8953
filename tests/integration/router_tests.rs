//! Integration tests for host command routing against shared state.

use counter_monitor::app::commands::{
    CommandEntry, CommandTable, Dispatch, Outcome, Router, RouterStats, Value, default_table,
};
use counter_monitor::app::service::DispatchLoop;
use counter_monitor::config::SystemConfig;
use counter_monitor::error::{CommandError, TableError};
use counter_monitor::state::{HostFields, Q8, SharedState};

use crate::mock_hw::MockHost;

fn force_report(fields: HostFields<'_>, _: Value) -> Result<Outcome, CommandError> {
    fields.request_report();
    Ok(Outcome::Quiet)
}

#[test]
fn unknown_command_is_dropped_silently() {
    let shared = SharedState::new(&SystemConfig::default());
    let router = Router::new(default_table().unwrap(), &shared);
    let mut dl = DispatchLoop::new(&shared);
    let mut host = MockHost::new();
    let before = shared.snapshot();

    assert_eq!(router.dispatch("bReset", Value::Bool(true)), Dispatch::Unknown);
    assert_eq!(router.dispatch("benable", Value::Bool(false)), Dispatch::Unknown);

    assert_eq!(shared.snapshot(), before);
    assert_eq!(dl.drain(&mut host), 0);
    assert!(host.updates.is_empty());
    assert_eq!(router.stats(), RouterStats { handled: 0, unknown: 2, rejected: 0 });
}

#[test]
fn mistyped_values_leave_state_untouched() {
    let shared = SharedState::new(&SystemConfig::default());
    let router = Router::new(default_table().unwrap(), &shared);
    let before = shared.snapshot();

    assert!(matches!(
        router.dispatch("bEnable", Value::U16(0)),
        Dispatch::Rejected(CommandError::TypeMismatch { .. })
    ));
    assert_eq!(
        router.dispatch("u16Data", Value::U32(70_000)),
        Dispatch::Rejected(CommandError::OutOfRange)
    );
    assert_eq!(
        router.dispatch("u16Data", Value::I16(-1)),
        Dispatch::Rejected(CommandError::OutOfRange)
    );

    assert_eq!(shared.snapshot(), before);
    assert!(!shared.report_pending());
    assert_eq!(router.stats().rejected, 3);
}

#[test]
fn narrow_integer_types_accepted_for_increment() {
    let shared = SharedState::new(&SystemConfig::default());
    let router = Router::new(default_table().unwrap(), &shared);

    router.dispatch("u16Data", Value::U8(64));
    assert_eq!(shared.increment(), Q8::from_bits(64));
    router.dispatch("u16Data", Value::U32(65_535));
    assert_eq!(shared.increment(), Q8::from_bits(65_535));
    assert_eq!(router.stats().handled, 2);
}

#[test]
fn custom_table_extends_command_set() {
    let shared = SharedState::new(&SystemConfig::default());
    let table = CommandTable::new(&[
        CommandEntry { name: "bEnable", handler: force_report },
        CommandEntry { name: "refresh", handler: force_report },
    ])
    .unwrap();
    let router = Router::new(table, &shared);
    let mut dl = DispatchLoop::new(&shared);
    let mut host = MockHost::new();

    assert_eq!(router.dispatch("refresh", Value::Bool(true)), Dispatch::Handled(Outcome::Quiet));
    assert_eq!(dl.drain(&mut host), 1);
    assert_eq!(host.names(), ["c1", "c2", "c3", "c4"]);
}

#[test]
fn table_construction_rejects_ambiguous_names() {
    let long = "abcdefghijklmnopq";
    assert_eq!(
        CommandTable::new(&[CommandEntry { name: long, handler: force_report }]).unwrap_err(),
        TableError::NameTooLong(long)
    );
    assert_eq!(
        CommandTable::new(&[
            CommandEntry { name: "u16", handler: force_report },
            CommandEntry { name: "u16Data", handler: force_report },
        ])
        .unwrap_err(),
        TableError::Overlapping("u16", "u16Data")
    );
}
