//! Mock board and in-memory serial link for integration tests.
//!
//! Records every peripheral call so tests can assert on the full command
//! history without touching real GPIO registers.

use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, channel};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use zeroclaw::error::DeviceError;
use zeroclaw::link::framer::ResponseFramer;
use zeroclaw::link::packet::ResponsePacket;
use zeroclaw::link::transport::{ByteSink, ByteSource};
use zeroclaw::ports::{Peripherals, SensorValue};

// ── Peripheral call record ────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeripheralCall {
    GpioRead { pin: u8 },
    GpioWrite { pin: u8, value: u8 },
    SensorRead,
}

// ── MockBoard ─────────────────────────────────────────────────

/// Eight GPIO lines, an optional sensor and a shared call log.
#[derive(Clone)]
pub struct MockBoard {
    pub calls: Arc<Mutex<Vec<PeripheralCall>>>,
    pub levels: Arc<Mutex<[u8; 8]>>,
    pub sensor: Option<SensorValue>,
    pub identity: &'static str,
}

#[allow(dead_code)]
impl MockBoard {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            levels: Arc::new(Mutex::new([0; 8])),
            sensor: None,
            identity: "qemu_cortex_m3",
        }
    }

    pub fn with_sensor(mut self, value: SensorValue) -> Self {
        self.sensor = Some(value);
        self
    }

    pub fn calls(&self) -> Vec<PeripheralCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: PeripheralCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Peripherals for MockBoard {
    fn gpio_read(&mut self, pin: u8) -> Result<u8, DeviceError> {
        self.record(PeripheralCall::GpioRead { pin });
        self.levels
            .lock()
            .unwrap()
            .get(pin as usize)
            .copied()
            .ok_or(DeviceError::NotPresent)
    }

    fn gpio_write(&mut self, pin: u8, value: u8) -> Result<(), DeviceError> {
        self.record(PeripheralCall::GpioWrite { pin, value });
        let mut levels = self.levels.lock().unwrap();
        let slot = levels.get_mut(pin as usize).ok_or(DeviceError::NotPresent)?;
        *slot = u8::from(value != 0);
        Ok(())
    }

    fn sensor_read(&mut self) -> Result<SensorValue, DeviceError> {
        self.record(PeripheralCall::SensorRead);
        self.sensor.ok_or(DeviceError::NotReady)
    }

    fn device_identity(&self) -> &[u8] {
        self.identity.as_bytes()
    }
}

// ── In-memory serial link ─────────────────────────────────────

/// Host end of a fake UART: push chunks in, collect decoded responses.
pub struct HostEnd {
    tx: Option<Sender<Vec<u8>>>,
    rx: Receiver<Vec<u8>>,
    framer: ResponseFramer,
}

#[allow(dead_code)]
impl HostEnd {
    pub fn send(&self, bytes: &[u8]) {
        if let Some(tx) = &self.tx {
            tx.send(bytes.to_vec()).unwrap();
        }
    }

    /// Drop the host's sender; the device's source reports the link closed.
    pub fn hang_up(&mut self) {
        self.tx = None;
    }

    /// Wait for the next complete response frame.
    pub fn recv(&mut self, timeout: Duration) -> Option<ResponsePacket> {
        let frame = self.rx.recv_timeout(timeout).ok()?;
        let mut out = None;
        self.framer.feed(&frame, |r| out = Some(r));
        out?.ok()
    }
}

/// Device-side receive half. Yields bytes in the chunking the host sent.
pub struct ChannelSource {
    rx: Receiver<Vec<u8>>,
    pending: std::collections::VecDeque<u8>,
    poll: Duration,
}

impl ByteSource for ChannelSource {
    type Error = &'static str;

    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        if let Some(b) = self.pending.pop_front() {
            return Ok(Some(b));
        }
        match self.rx.recv_timeout(self.poll) {
            Ok(chunk) => {
                self.pending.extend(chunk);
                Ok(self.pending.pop_front())
            }
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err("host hung up"),
        }
    }
}

/// Device-side transmit half.
pub struct ChannelSink {
    tx: Sender<Vec<u8>>,
}

impl ByteSink for ChannelSink {
    type Error = &'static str;

    fn write_frame(&mut self, frame: &[u8]) -> Result<(), Self::Error> {
        self.tx.send(frame.to_vec()).map_err(|_| "host gone")
    }
}

pub fn serial_pair() -> (HostEnd, ChannelSource, ChannelSink) {
    let (host_tx, dev_rx) = channel();
    let (dev_tx, host_rx) = channel();
    (
        HostEnd {
            tx: Some(host_tx),
            rx: host_rx,
            framer: ResponseFramer::new(),
        },
        ChannelSource {
            rx: dev_rx,
            pending: Default::default(),
            poll: Duration::from_millis(5),
        },
        ChannelSink { tx: dev_tx },
    )
}
