//! ESP-IDF UART adapter: the serial link's byte source and sink.
//!
//! The driver is split once at start-up; the receive half moves into the
//! reader thread and the transmit half into the processor thread, so the
//! two never contend for a lock.

use esp_idf_hal::delay::TickType;
use esp_idf_hal::sys::EspError;
use esp_idf_hal::uart::{UartDriver, UartRxDriver, UartTxDriver};

use crate::link::transport::{ByteSink, ByteSource};

/// Bytes pulled from the driver per read call.
const RX_CHUNK: usize = 64;

/// Split `driver` into link halves. `poll_ms` bounds each blocking read
/// so the reader can apply its own frame deadline.
pub fn split(driver: UartDriver<'static>, poll_ms: u32) -> (UartSource, UartSink) {
    let (tx, rx) = driver.into_split();
    (
        UartSource {
            rx,
            poll_ticks: TickType::new_millis(u64::from(poll_ms)).ticks(),
            buf: [0; RX_CHUNK],
            head: 0,
            tail: 0,
        },
        UartSink { tx },
    )
}

pub struct UartSource {
    rx: UartRxDriver<'static>,
    poll_ticks: u32,
    buf: [u8; RX_CHUNK],
    head: usize,
    tail: usize,
}

impl ByteSource for UartSource {
    type Error = EspError;

    fn read_byte(&mut self) -> Result<Option<u8>, EspError> {
        if self.head == self.tail {
            let n = self.rx.read(&mut self.buf, self.poll_ticks)?;
            if n == 0 {
                return Ok(None);
            }
            self.head = 0;
            self.tail = n;
        }
        let byte = self.buf[self.head];
        self.head += 1;
        Ok(Some(byte))
    }
}

pub struct UartSink {
    tx: UartTxDriver<'static>,
}

impl ByteSink for UartSink {
    type Error = EspError;

    fn write_frame(&mut self, frame: &[u8]) -> Result<(), EspError> {
        let mut rest = frame;
        while !rest.is_empty() {
            let n = self.tx.write(rest)?;
            rest = &rest[n..];
        }
        Ok(())
    }
}
