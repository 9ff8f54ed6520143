//! Packet types and wire layout.
//!
//! ```text
//! ┌──────────────┬──────────┬──────────────┬──────────────────┬──────────────┐
//! │ magic (4B)   │ sel (1B) │ data_len (2B)│ data (data_len B)│ CRC-16 (2B)  │
//! │ "ZERO"       │ u8       │ BE u16       │                  │ BE u16       │
//! └──────────────┴──────────┴──────────────┴──────────────────┴──────────────┘
//! ```
//!
//! `sel` is the command type on the way in and the status on the way out.
//! In memory the payload lives in a capacity-bounded `heapless::Vec`, so
//! `data_len` is always `data.len()` and the unused tail never exists.

use heapless::Vec;

use super::crc::Crc16;
use crate::error::Status;

/// "ZERO" as a big-endian word; appears as `5A 45 52 4F` on the wire.
pub const MAGIC: u32 = 0x5A45_524F;

/// Magic in wire byte order.
pub const MAGIC_BYTES: [u8; 4] = MAGIC.to_be_bytes();

/// magic + selector + data_len.
pub const HEADER_LEN: usize = 7;

pub const CHECKSUM_LEN: usize = 2;

/// Maximum command payload.
pub const MAX_CMD_DATA: usize = 1024;

/// Maximum response payload.
pub const MAX_RESP_DATA: usize = 2048;

pub const MAX_CMD_FRAME: usize = HEADER_LEN + MAX_CMD_DATA + CHECKSUM_LEN;

pub const MAX_RESP_FRAME: usize = HEADER_LEN + MAX_RESP_DATA + CHECKSUM_LEN;

// ───────────────────────────────────────────────────────────────
// Command types
// ───────────────────────────────────────────────────────────────

/// Operations a host can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    GpioRead = 0x01,
    GpioWrite = 0x02,
    SensorRead = 0x03,
    DeviceInfo = 0x04,
    HealthCheck = 0x05,
}

impl CommandType {
    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for CommandType {
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, u8> {
        match raw {
            0x01 => Ok(Self::GpioRead),
            0x02 => Ok(Self::GpioWrite),
            0x03 => Ok(Self::SensorRead),
            0x04 => Ok(Self::DeviceInfo),
            0x05 => Ok(Self::HealthCheck),
            other => Err(other),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Frame kinds
// ───────────────────────────────────────────────────────────────

/// A frame kind the [`Framer`](super::framer::Framer) can assemble and
/// [`encode_frame`] can serialise.
pub trait WireFrame: Sized {
    /// Payload capacity; a header announcing more is malformed.
    const MAX_DATA: usize;

    /// The byte following the magic (command type or status).
    fn selector(&self) -> u8;

    fn payload(&self) -> &[u8];

    /// Rebuild from decoded parts. `None` if `payload` exceeds capacity.
    fn from_parts(selector: u8, payload: &[u8]) -> Option<Self>;

    /// Serialise into `out`; see [`encode_frame`].
    fn encode_into(&self, out: &mut [u8]) -> Option<usize> {
        encode_frame(self.selector(), self.payload(), out)
    }
}

/// A validated command, moved by value from the framer to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPacket {
    pub cmd_type: u8,
    pub data: Vec<u8, MAX_CMD_DATA>,
}

impl CommandPacket {
    /// Build a command; `None` if `data` exceeds [`MAX_CMD_DATA`].
    pub fn new(cmd_type: u8, data: &[u8]) -> Option<Self> {
        let data = Vec::from_slice(data).ok()?;
        Some(Self { cmd_type, data })
    }

    pub fn command_type(&self) -> Result<CommandType, u8> {
        CommandType::try_from(self.cmd_type)
    }

    pub fn data_len(&self) -> u16 {
        self.data.len() as u16
    }
}

impl WireFrame for CommandPacket {
    const MAX_DATA: usize = MAX_CMD_DATA;

    fn selector(&self) -> u8 {
        self.cmd_type
    }

    fn payload(&self) -> &[u8] {
        &self.data
    }

    fn from_parts(selector: u8, payload: &[u8]) -> Option<Self> {
        Self::new(selector, payload)
    }
}

/// A reply to exactly one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponsePacket {
    /// Raw status byte; see [`Status`].
    pub status: u8,
    pub data: Vec<u8, MAX_RESP_DATA>,
}

impl ResponsePacket {
    /// Successful reply carrying `data` (truncated to capacity).
    pub fn ok(data: &[u8]) -> Self {
        let take = data.len().min(MAX_RESP_DATA);
        let mut buf = Vec::new();
        // Cannot fail: `take` is within capacity.
        let _ = buf.extend_from_slice(&data[..take]);
        Self {
            status: Status::Ok.code(),
            data: buf,
        }
    }

    /// Error reply with an empty payload.
    pub fn error(status: Status) -> Self {
        Self {
            status: status.code(),
            data: Vec::new(),
        }
    }

    /// Decoded status; `None` for codes this firmware never sends.
    pub fn status(&self) -> Option<Status> {
        Status::from_code(self.status)
    }

    pub fn data_len(&self) -> u16 {
        self.data.len() as u16
    }
}

impl WireFrame for ResponsePacket {
    const MAX_DATA: usize = MAX_RESP_DATA;

    fn selector(&self) -> u8 {
        self.status
    }

    fn payload(&self) -> &[u8] {
        &self.data
    }

    fn from_parts(selector: u8, payload: &[u8]) -> Option<Self> {
        let data = Vec::from_slice(payload).ok()?;
        Some(Self {
            status: selector,
            data,
        })
    }
}

// ───────────────────────────────────────────────────────────────
// Encoding
// ───────────────────────────────────────────────────────────────

/// Encode one frame into `out`.
///
/// Writes header, exactly `payload.len()` payload bytes and the CRC.
/// Returns the total number of bytes written, or `None` if `out` is too
/// small or the payload cannot be described by a 16-bit length.
pub fn encode_frame(selector: u8, payload: &[u8], out: &mut [u8]) -> Option<usize> {
    let data_len = u16::try_from(payload.len()).ok()?;
    let body = HEADER_LEN + payload.len();
    let total = body + CHECKSUM_LEN;
    if total > out.len() {
        return None;
    }

    out[..4].copy_from_slice(&MAGIC_BYTES);
    out[4] = selector;
    out[5..HEADER_LEN].copy_from_slice(&data_len.to_be_bytes());
    out[HEADER_LEN..body].copy_from_slice(payload);

    let mut crc = Crc16::new();
    crc.update(&out[..body]);
    out[body..total].copy_from_slice(&crc.finish().to_be_bytes());

    Some(total)
}

/// Encode a command into an owned buffer (host side).
pub fn encode_command(cmd_type: u8, data: &[u8]) -> Option<Vec<u8, MAX_CMD_FRAME>> {
    if data.len() > MAX_CMD_DATA {
        return None;
    }
    let mut buf = [0u8; MAX_CMD_FRAME];
    let len = encode_frame(cmd_type, data, &mut buf)?;
    Vec::from_slice(&buf[..len]).ok()
}

/// Encode a response into a caller-provided buffer (device side).
pub fn encode_response(resp: &ResponsePacket, out: &mut [u8; MAX_RESP_FRAME]) -> usize {
    // Payload is bounded by MAX_RESP_DATA, so the frame always fits.
    encode_frame(resp.status, &resp.data, out).unwrap_or(0)
}
