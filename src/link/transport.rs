//! Byte-stream boundary of the link.
//!
//! Concrete implementations:
//! - ESP-IDF UART (see `adapters::uart`, firmware builds only)
//! - in-memory sources and sinks in the test suites
//!
//! The reader and processor are generic over these traits, so adding a
//! transport requires zero changes to framing or dispatch.

/// Receive side of a serial link.
pub trait ByteSource {
    /// Error type for this transport.
    type Error: core::fmt::Debug;

    /// Wait for the next received byte.
    ///
    /// Returns `Ok(None)` if the transport's own poll deadline passed
    /// without data, and `Err` once the link is closed or broken.
    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error>;
}

/// Transmit side of a serial link.
pub trait ByteSink {
    /// Error type for this transport.
    type Error: core::fmt::Debug;

    /// Transmit one complete frame.
    fn write_frame(&mut self, frame: &[u8]) -> Result<(), Self::Error>;
}

/// A null link that never receives and discards all writes.
/// Useful as a default when no host is attached.
pub struct NullLink;

impl ByteSource for NullLink {
    type Error = ();

    fn read_byte(&mut self) -> Result<Option<u8>, ()> {
        Ok(None)
    }
}

impl ByteSink for NullLink {
    type Error = ();

    fn write_frame(&mut self, _frame: &[u8]) -> Result<(), ()> {
        Ok(())
    }
}
