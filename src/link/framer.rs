//! Streaming frame assembler.
//!
//! Consumes bytes one at a time and yields validated frames. Handles
//! partial reads gracefully: a single transport read may carry part of
//! a header, part of a payload, several frames back to back, or noise.
//!
//! ```text
//!  SeekMagic ──magic──▶ ReadHeader ──len ok──▶ ReadPayload ──▶ ReadChecksum ──crc ok──▶ frame
//!      ▲                    │ len > MAX                                │ crc bad
//!      └────────────────────┴──────────────────────────────────────────┘
//! ```
//!
//! While seeking, the last four bytes form a sliding window; on mismatch
//! the oldest byte falls out, so a frame that starts right after noise
//! is still found. A discarded candidate's bytes, minus its first, go
//! through the machine again, so a valid frame hidden behind a truncated
//! header is recovered.

use core::marker::PhantomData;

use heapless::Vec;

use super::crc::checksum;
use super::packet::{
    CHECKSUM_LEN, CommandPacket, HEADER_LEN, MAGIC_BYTES, MAX_RESP_FRAME, ResponsePacket,
    WireFrame,
};
use crate::error::FrameError;

/// Accumulator capacity, large enough for the biggest frame kind.
const ACCUMULATOR_LEN: usize = MAX_RESP_FRAME;

/// Where the framer is within the current candidate frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    SeekMagic,
    ReadHeader,
    ReadPayload,
    ReadChecksum,
}

/// Streaming decoder for one frame kind.
pub struct Framer<F: WireFrame> {
    phase: Phase,
    window: [u8; 4],
    window_fill: usize,
    buf: Vec<u8, ACCUMULATOR_LEN>,
    /// Bytes of a discarded candidate awaiting a second scan.
    replay: Vec<u8, ACCUMULATOR_LEN>,
    data_len: usize,
    _kind: PhantomData<fn() -> F>,
}

/// Device-side framer: host → target commands.
pub type CommandFramer = Framer<CommandPacket>;

/// Host-side framer: target → host responses.
pub type ResponseFramer = Framer<ResponsePacket>;

impl<F: WireFrame> Framer<F> {
    pub fn new() -> Self {
        Self {
            phase: Phase::SeekMagic,
            window: [0; 4],
            window_fill: 0,
            buf: Vec::new(),
            replay: Vec::new(),
            data_len: 0,
            _kind: PhantomData,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// `true` when no candidate frame is in progress.
    pub fn is_idle(&self) -> bool {
        self.phase == Phase::SeekMagic
    }

    /// Bytes held for the frame in progress (magic included).
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Drop any partial frame and go back to seeking the magic.
    pub fn reset(&mut self) {
        self.phase = Phase::SeekMagic;
        self.window_fill = 0;
        self.buf.clear();
        self.data_len = 0;
    }

    /// Abandon the frame in progress and rescan its bytes, minus the
    /// first, for a later magic. For a link that went quiet mid-frame.
    pub fn expire(&mut self, mut on_frame: impl FnMut(Result<F, FrameError>)) {
        if self.is_idle() {
            return;
        }
        self.discard(None);
        self.rescan(&mut on_frame);
    }

    /// Feed one byte, reporting any completed frame or discard to
    /// `on_frame`.
    ///
    /// When a candidate frame is discarded, the bytes it had swallowed
    /// (all but its first) are scanned again, so a frame that began
    /// inside an aborted one is still decoded. That rescan can report
    /// several outcomes for a single pushed byte.
    pub fn push(&mut self, byte: u8, mut on_frame: impl FnMut(Result<F, FrameError>)) {
        self.push_inner(byte, &mut on_frame);
    }

    /// Feed a chunk, reporting every completed frame or discard to `on_frame`.
    pub fn feed(&mut self, data: &[u8], mut on_frame: impl FnMut(Result<F, FrameError>)) {
        for &byte in data {
            self.push_inner(byte, &mut on_frame);
        }
    }

    fn push_inner(&mut self, byte: u8, on_frame: &mut impl FnMut(Result<F, FrameError>)) {
        match self.step(byte) {
            Ok(None) => {}
            Ok(Some(frame)) => on_frame(Ok(frame)),
            Err(e) => {
                on_frame(Err(e));
                self.rescan(on_frame);
            }
        }
    }

    /// Run the bytes stashed by a discard back through the state machine.
    fn rescan(&mut self, on_frame: &mut impl FnMut(Result<F, FrameError>)) {
        while !self.replay.is_empty() {
            let pending = core::mem::take(&mut self.replay);
            for (i, &byte) in pending.iter().enumerate() {
                match self.step(byte) {
                    Ok(None) => {}
                    Ok(Some(frame)) => on_frame(Ok(frame)),
                    Err(e) => {
                        on_frame(Err(e));
                        // The new stash precedes the bytes not yet replayed.
                        // Cannot overflow: the discarded candidate started
                        // inside `pending`, so the total only shrinks.
                        let _ = self.replay.extend_from_slice(&pending[i + 1..]);
                        break;
                    }
                }
            }
        }
    }

    /// One state-machine step. A discard stashes the candidate's bytes
    /// (minus its first) in `replay` and leaves the framer seeking.
    fn step(&mut self, byte: u8) -> Result<Option<F>, FrameError> {
        if self.phase == Phase::SeekMagic {
            self.slide(byte);
            return Ok(None);
        }

        if self.buf.push(byte).is_err() {
            self.discard(Some(byte));
            return Err(FrameError::Overflow);
        }

        match self.phase {
            Phase::SeekMagic => Ok(None),
            Phase::ReadHeader => {
                if self.buf.len() == HEADER_LEN {
                    self.begin_payload()?;
                }
                Ok(None)
            }
            Phase::ReadPayload => {
                if self.buf.len() == HEADER_LEN + self.data_len {
                    self.phase = Phase::ReadChecksum;
                }
                Ok(None)
            }
            Phase::ReadChecksum => {
                if self.buf.len() < HEADER_LEN + self.data_len + CHECKSUM_LEN {
                    return Ok(None);
                }
                match self.complete() {
                    Ok(frame) => {
                        self.reset();
                        Ok(Some(frame))
                    }
                    Err(e) => {
                        self.discard(None);
                        Err(e)
                    }
                }
            }
        }
    }

    fn discard(&mut self, overflowed: Option<u8>) {
        self.replay.clear();
        // Cannot fail: buf[1..] plus one byte is at most ACCUMULATOR_LEN.
        let _ = self.replay.extend_from_slice(self.buf.get(1..).unwrap_or(&[]));
        if let Some(byte) = overflowed {
            let _ = self.replay.push(byte);
        }
        self.reset();
    }

    fn slide(&mut self, byte: u8) {
        if self.window_fill < self.window.len() {
            self.window[self.window_fill] = byte;
            self.window_fill += 1;
        } else {
            self.window.copy_within(1.., 0);
            self.window[3] = byte;
        }

        if self.window_fill == self.window.len() && self.window == MAGIC_BYTES {
            self.buf.clear();
            // Cannot fail: the accumulator was just cleared.
            let _ = self.buf.extend_from_slice(&MAGIC_BYTES);
            self.window_fill = 0;
            self.phase = Phase::ReadHeader;
        }
    }

    fn begin_payload(&mut self) -> Result<(), FrameError> {
        let data_len = u16::from_be_bytes([self.buf[5], self.buf[6]]);
        let len = data_len as usize;

        if len > F::MAX_DATA {
            self.discard(None);
            return Err(FrameError::MalformedHeader { data_len });
        }
        if HEADER_LEN + len + CHECKSUM_LEN > ACCUMULATOR_LEN {
            self.discard(None);
            return Err(FrameError::Overflow);
        }

        self.data_len = len;
        self.phase = if len == 0 {
            Phase::ReadChecksum
        } else {
            Phase::ReadPayload
        };
        Ok(())
    }

    fn complete(&self) -> Result<F, FrameError> {
        let body_end = HEADER_LEN + self.data_len;
        let received = u16::from_be_bytes([self.buf[body_end], self.buf[body_end + 1]]);

        let computed = checksum(&self.buf[..body_end]);
        if self.buf[..4] != MAGIC_BYTES || computed != received {
            return Err(FrameError::ChecksumError {
                expected: computed,
                actual: received,
            });
        }

        F::from_parts(self.buf[4], &self.buf[HEADER_LEN..body_end]).ok_or(
            FrameError::MalformedHeader {
                data_len: self.data_len as u16,
            },
        )
    }
}

impl<F: WireFrame> Default for Framer<F> {
    fn default() -> Self {
        Self::new()
    }
}
