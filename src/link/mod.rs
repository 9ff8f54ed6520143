//! ZeroClaw serial command link.
//!
//! ```text
//!  UART rx ─▶ Reader ─▶ Framer ─▶ CommandQueue ─▶ Processor ─▶ Dispatcher ─▶ Peripherals
//!                                                     │
//!  UART tx ◀────────────────────── Responder ◀────────┘
//! ```
//!
//! Frame layout (both directions, header fields big-endian):
//!
//! ```text
//!  [magic:4][selector:1][data_len:2][data:data_len][crc16:2]
//! ```
//!
//! `selector` is the command type on the way in and the status on the
//! way out.

pub mod crc;
pub mod dispatcher;
pub mod framer;
pub mod io_task;
pub mod packet;
pub mod queue;
pub mod responder;
pub mod transport;

pub use dispatcher::Dispatcher;
pub use framer::{CommandFramer, Framer, ResponseFramer};
pub use io_task::{LinkHandle, LinkShared, Processor, Reader, ReaderExit, spawn};
pub use packet::{CommandPacket, CommandType, ResponsePacket};
pub use queue::CommandQueue;
pub use responder::Responder;
pub use transport::{ByteSink, ByteSource, NullLink};
