//! Debug console: `name=value` lines in, [`Router`] dispatch out.
//!
//! ```text
//! bEnable=false
//! u16Data=64
//! ```
//!
//! Values are parsed as JSON scalars, so `true`/`false` and integers are
//! accepted.  Integers map to the narrowest [`Value`] that holds them:
//! `U16` up to 65535, `U32` above, `I16` for negatives.  This is a bench aid
//! on the serial console, not the GUI wire encoding.

use std::io::{BufRead, ErrorKind};
use std::time::Duration;

use log::{info, warn};

use crate::app::commands::{Dispatch, Router, Value};
use crate::drivers::wake;
use crate::error::ConsoleError;

/// Split and type one console line.  Surrounding whitespace is ignored.
pub fn parse_line(line: &str) -> Result<(&str, Value), ConsoleError> {
    let (name, raw) = line.trim().split_once('=').ok_or(ConsoleError::Malformed)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(ConsoleError::Malformed);
    }

    let json: serde_json::Value =
        serde_json::from_str(raw.trim()).map_err(|_| ConsoleError::UnsupportedValue)?;
    let value = match json {
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                if let Ok(v) = u16::try_from(u) {
                    Value::U16(v)
                } else {
                    Value::U32(u32::try_from(u).map_err(|_| ConsoleError::UnsupportedValue)?)
                }
            } else if let Some(i) = n.as_i64() {
                Value::I16(i16::try_from(i).map_err(|_| ConsoleError::UnsupportedValue)?)
            } else {
                return Err(ConsoleError::UnsupportedValue);
            }
        }
        _ => return Err(ConsoleError::UnsupportedValue),
    };
    Ok((name, value))
}

/// Parse and route one line.  Blank lines and `#` comments yield `None`.
pub fn handle_line(router: &Router<'_>, line: &str) -> Option<Result<Dispatch, ConsoleError>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    Some(parse_line(trimmed).map(|(name, value)| router.dispatch(name, value)))
}

/// Pause before re-reading an input that had nothing ready.
pub const RETRY_BACKOFF_MS: u64 = 20;

/// Serve `input` until EOF or a hard read error.  `wake` runs after every
/// handled command.  Returns the lines dispatched.
///
/// ESP-IDF's VFS stdin is non-blocking unless a UART driver is installed,
/// so `WouldBlock` means "nothing yet": back off and read again, keeping
/// any partial line.
pub fn serve(router: &Router<'_>, mut input: impl BufRead, wake: impl Fn()) -> u32 {
    let mut dispatched = 0u32;
    let mut line = String::new();
    loop {
        match input.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) if !line.ends_with('\n') => {
                // Bytes up to EOF; the next read confirms the end.
                continue;
            }
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::WouldBlock => {
                std::thread::sleep(Duration::from_millis(RETRY_BACKOFF_MS));
                continue;
            }
            Err(e) => {
                warn!("console: read failed ({}), closing", e);
                line.clear();
                break;
            }
        }

        route(router, &line, &wake, &mut dispatched);
        line.clear();
    }
    // Unterminated last line.
    route(router, &line, &wake, &mut dispatched);

    info!("console: input closed after {} command(s)", dispatched);
    dispatched
}

fn route(router: &Router<'_>, line: &str, wake: &impl Fn(), dispatched: &mut u32) {
    match handle_line(router, line) {
        None => {}
        Some(Ok(outcome)) => {
            *dispatched = dispatched.wrapping_add(1);
            if matches!(outcome, Dispatch::Handled(_)) {
                wake();
            }
        }
        Some(Err(e)) => warn!("console: '{}': {}", line.trim(), e),
    }
}

/// Run [`serve`] over stdin on a dedicated thread, waking the dispatch loop
/// after each handled command.
pub fn spawn(router: Router<'static>) -> std::io::Result<std::thread::JoinHandle<u32>> {
    std::thread::Builder::new()
        .name("console".into())
        .stack_size(8192)
        .spawn(move || serve(&router, std::io::stdin().lock(), wake::notify))
}
