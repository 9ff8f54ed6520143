//! CRC-16/CCITT-FALSE frame check.
//!
//! Polynomial 0x1021, initial value 0xFFFF, no reflection, no final XOR.
//! Computed over header + payload; transmitted big-endian.

const POLY: u16 = 0x1021;
const INIT: u16 = 0xFFFF;

/// Incremental CRC so the framer can checksum while it accumulates.
#[derive(Debug, Clone, Copy)]
pub struct Crc16(u16);

impl Crc16 {
    pub const fn new() -> Self {
        Self(INIT)
    }

    pub fn update(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= (b as u16) << 8;
            for _ in 0..8 {
                if self.0 & 0x8000 != 0 {
                    self.0 = (self.0 << 1) ^ POLY;
                } else {
                    self.0 <<= 1;
                }
            }
        }
    }

    pub const fn finish(self) -> u16 {
        self.0
    }
}

impl Default for Crc16 {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot checksum of `bytes`.
pub fn checksum(bytes: &[u8]) -> u16 {
    let mut crc = Crc16::new();
    crc.update(bytes);
    crc.finish()
}
