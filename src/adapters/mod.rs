//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter | Implements             | Connects to                     |
//! |---------|------------------------|---------------------------------|
//! | `board` | Peripherals            | embedded-hal pins, SensorDriver |
//! | `sim`   | SensorDriver           | in-memory temperature           |
//! | `uart`  | ByteSource / ByteSink  | ESP-IDF UART (firmware only)    |

pub mod board;
pub mod sim;
#[cfg(feature = "espidf")]
pub mod uart;
