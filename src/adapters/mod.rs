//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements     | Connects to                   |
//! |------------|----------------|-------------------------------|
//! | `hardware` | Board, CpuPort | ESP32 GPIO, ADC1, esp_timer   |
//! | `log_sink` | HostPort       | Serial log output             |
//! | `console`  | (drives Router)| `name=value` lines on stdin   |

pub mod console;
pub mod hardware;
pub mod log_sink;
