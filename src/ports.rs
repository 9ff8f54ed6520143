//! Port traits: the boundary between the command engine and the board.
//!
//! ```text
//!   Dispatcher ──▶ Peripherals ──▶ Board adapter ──▶ embedded-hal pins / sensor driver
//! ```
//!
//! The dispatcher owns one [`Peripherals`] implementation, injected by
//! whoever composes the link, so no driver handle is ever global.

use core::fmt;

use crate::error::DeviceError;

// ───────────────────────────────────────────────────────────────
// Sensor reading
// ───────────────────────────────────────────────────────────────

/// Fixed-point sensor reading: integer part plus millionths.
///
/// Same layout as Zephyr's `struct sensor_value`, which is what hosts
/// expect to find in a SENSOR_READ reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SensorValue {
    pub val1: i32,
    pub val2: i32,
}

impl SensorValue {
    /// Encoded size on the wire.
    pub const WIRE_LEN: usize = 8;

    pub const fn new(val1: i32, val2: i32) -> Self {
        Self { val1, val2 }
    }

    /// Build from milli-units (e.g. millidegrees Celsius).
    pub const fn from_milli(milli: i32) -> Self {
        Self {
            val1: milli / 1000,
            val2: (milli % 1000) * 1000,
        }
    }

    pub fn to_le_bytes(self) -> [u8; Self::WIRE_LEN] {
        let mut out = [0u8; Self::WIRE_LEN];
        out[..4].copy_from_slice(&self.val1.to_le_bytes());
        out[4..].copy_from_slice(&self.val2.to_le_bytes());
        out
    }

    pub fn from_le_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::WIRE_LEN {
            return None;
        }
        let val1 = i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let val2 = i32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        Some(Self { val1, val2 })
    }

    pub fn as_f64(self) -> f64 {
        self.val1 as f64 + self.val2 as f64 / 1_000_000.0
    }
}

impl fmt::Display for SensorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:06}", self.val1, self.val2.unsigned_abs())
    }
}

// ───────────────────────────────────────────────────────────────
// Peripheral port (driven adapter: engine → hardware)
// ───────────────────────────────────────────────────────────────

/// Everything the dispatcher may ask of the board.
///
/// Calls are synchronous; implementations bound their own latency.
pub trait Peripherals {
    /// Read the current level of `pin` (0 or 1).
    fn gpio_read(&mut self, pin: u8) -> Result<u8, DeviceError>;

    /// Drive `pin`; any nonzero `value` means high.
    fn gpio_write(&mut self, pin: u8, value: u8) -> Result<(), DeviceError>;

    /// Take one fresh sample from the board sensor.
    fn sensor_read(&mut self) -> Result<SensorValue, DeviceError>;

    /// Board / identity string. Never fails.
    fn device_identity(&self) -> &[u8];
}

// ───────────────────────────────────────────────────────────────
// Sensor driver (driven adapter: board → sensor chip)
// ───────────────────────────────────────────────────────────────

/// Two-step sensor access: latch a sample, then read the channel.
pub trait SensorDriver {
    /// Trigger a conversion and latch the result inside the driver.
    fn sample_fetch(&mut self) -> Result<(), DeviceError>;

    /// Return the most recently latched ambient temperature.
    fn channel_get(&mut self) -> Result<SensorValue, DeviceError>;
}

impl<P: Peripherals + ?Sized> Peripherals for &mut P {
    fn gpio_read(&mut self, pin: u8) -> Result<u8, DeviceError> {
        (**self).gpio_read(pin)
    }

    fn gpio_write(&mut self, pin: u8, value: u8) -> Result<(), DeviceError> {
        (**self).gpio_write(pin, value)
    }

    fn sensor_read(&mut self) -> Result<SensorValue, DeviceError> {
        (**self).sensor_read()
    }

    fn device_identity(&self) -> &[u8] {
        (**self).device_identity()
    }
}
