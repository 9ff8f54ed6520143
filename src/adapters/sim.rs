//! Simulated ambient-temperature sensor.
//!
//! Deterministic stand-in for a real die/ambient sensor on host builds
//! and in tests. The latched value only changes on `sample_fetch()`, the
//! same two-step contract a hardware driver follows.

use crate::error::DeviceError;
use crate::ports::{SensorDriver, SensorValue};

#[derive(Debug, Clone)]
pub struct SimSensor {
    /// Value the next fetch will latch (millidegrees Celsius).
    source_milli: i32,
    latched: Option<SensorValue>,
    ready: bool,
    fetches: u32,
}

impl SimSensor {
    pub fn new(millidegrees: i32) -> Self {
        Self {
            source_milli: millidegrees,
            latched: None,
            ready: true,
            fetches: 0,
        }
    }

    /// A sensor that exists but never finishes initialising.
    pub fn not_ready() -> Self {
        Self {
            ready: false,
            ..Self::new(0)
        }
    }

    pub fn set_millidegrees(&mut self, millidegrees: i32) {
        self.source_milli = millidegrees;
    }

    pub fn fetches(&self) -> u32 {
        self.fetches
    }
}

impl Default for SimSensor {
    fn default() -> Self {
        Self::new(25_000)
    }
}

impl SensorDriver for SimSensor {
    fn sample_fetch(&mut self) -> Result<(), DeviceError> {
        if !self.ready {
            return Err(DeviceError::NotReady);
        }
        self.fetches += 1;
        self.latched = Some(SensorValue::from_milli(self.source_milli));
        Ok(())
    }

    fn channel_get(&mut self) -> Result<SensorValue, DeviceError> {
        self.latched.ok_or(DeviceError::NotReady)
    }
}
