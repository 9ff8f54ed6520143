//! Response serialiser.
//!
//! Encodes one [`ResponsePacket`] per call into an owned frame buffer
//! (header, exactly `data_len` payload bytes, CRC) and hands it to the
//! sink. There is no acknowledgment channel: a failed write is reported
//! and forgotten, never retried.

use log::warn;

use super::packet::{MAX_RESP_FRAME, ResponsePacket, encode_response};
use super::transport::ByteSink;
use crate::error::{LinkError, Result};

pub struct Responder<K: ByteSink> {
    sink: K,
    frame: [u8; MAX_RESP_FRAME],
}

impl<K: ByteSink> Responder<K> {
    pub fn new(sink: K) -> Self {
        Self {
            sink,
            frame: [0; MAX_RESP_FRAME],
        }
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn into_sink(self) -> K {
        self.sink
    }

    /// Serialise and transmit `resp`. Returns the frame length written.
    pub fn respond(&mut self, resp: &ResponsePacket) -> Result<usize> {
        let len = encode_response(resp, &mut self.frame);
        if len == 0 {
            return Err(LinkError::Transmit);
        }

        self.sink.write_frame(&self.frame[..len]).map_err(|e| {
            warn!("TX: {} byte response not sent: {:?}", len, e);
            LinkError::Transmit
        })?;
        Ok(len)
    }
}
