//! Unified error types for the ZeroClaw link.
//!
//! Framing errors stay inside the reader task, device errors are turned
//! into a response [`Status`] by the dispatcher, and only [`LinkError`]
//! crosses task boundaries. All variants are `Copy` so they can be
//! counted and logged without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Framing errors
// ---------------------------------------------------------------------------

/// Reasons the framer discarded a candidate packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// The header announced more payload than the frame kind can hold.
    MalformedHeader { data_len: u16 },
    /// The trailing CRC did not match header + payload.
    ChecksumError { expected: u16, actual: u16 },
    /// The accumulator filled up before a frame completed.
    Overflow,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedHeader { data_len } => {
                write!(f, "malformed header (data_len={data_len})")
            }
            Self::ChecksumError { expected, actual } => {
                write!(f, "checksum mismatch (expected {expected:#06x}, got {actual:#06x})")
            }
            Self::Overflow => write!(f, "frame accumulator overflow"),
        }
    }
}

// ---------------------------------------------------------------------------
// Device errors
// ---------------------------------------------------------------------------

/// Failures reported by a peripheral behind the [`Peripherals`](crate::ports::Peripherals) port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceError {
    /// The addressed pin or sensor does not exist on this board.
    NotPresent,
    /// The device exists but has not finished initialising.
    NotReady,
    /// The driver reported an I/O failure.
    Io,
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotPresent => write!(f, "device not present"),
            Self::NotReady => write!(f, "device not ready"),
            Self::Io => write!(f, "device I/O failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Queue backpressure
// ---------------------------------------------------------------------------

/// The command queue had no free slot; the packet was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFull;

impl fmt::Display for QueueFull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "command queue full")
    }
}

// ---------------------------------------------------------------------------
// Response status
// ---------------------------------------------------------------------------

/// Status byte carried in every response.
///
/// Error codes are the two's-complement byte of the matching negative
/// Zephyr errno, which is what existing ZeroClaw hosts already decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0x00,
    /// -EINVAL: payload too short for the command.
    InvalidArgument = 0xEA,
    /// -ENODEV: peripheral absent, not ready, or read failed.
    DeviceUnavailable = 0xED,
    /// -EIO: the peripheral rejected a write.
    IoError = 0xFB,
    /// -ENOSYS: unknown command type.
    Unsupported = 0xDA,
}

impl Status {
    pub const fn code(self) -> u8 {
        self as u8
    }

    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Decode a status byte received from a target.
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0x00 => Some(Self::Ok),
            0xEA => Some(Self::InvalidArgument),
            0xED => Some(Self::DeviceUnavailable),
            0xFB => Some(Self::IoError),
            0xDA => Some(Self::Unsupported),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::InvalidArgument => write!(f, "invalid argument"),
            Self::DeviceUnavailable => write!(f, "device unavailable"),
            Self::IoError => write!(f, "I/O error"),
            Self::Unsupported => write!(f, "unsupported command"),
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level link error
// ---------------------------------------------------------------------------

/// Errors surfaced to whoever composes the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    Frame(FrameError),
    Queue(QueueFull),
    /// The byte sink refused an outgoing frame.
    Transmit,
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Frame(e) => write!(f, "frame: {e}"),
            Self::Queue(e) => write!(f, "queue: {e}"),
            Self::Transmit => write!(f, "transmit failed"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl From<FrameError> for LinkError {
    fn from(e: FrameError) -> Self {
        Self::Frame(e)
    }
}

impl From<QueueFull> for LinkError {
    fn from(e: QueueFull) -> Self {
        Self::Queue(e)
    }
}

impl core::error::Error for FrameError {}
impl core::error::Error for DeviceError {}
impl core::error::Error for QueueFull {}
impl core::error::Error for LinkError {}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Link-wide `Result` alias.
pub type Result<T> = core::result::Result<T, LinkError>;
