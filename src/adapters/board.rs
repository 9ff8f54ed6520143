//! Board adapter: bridges embedded-hal pins and a sensor driver to the
//! [`Peripherals`] port.
//!
//! Owns a bank of bidirectional pins keyed by the pin number a host uses
//! on the wire, an optional ambient-temperature driver, and the identity
//! string returned by DEVICE_INFO. This is the only module that touches
//! pin handles; on ESP-IDF they are input-output `PinDriver`s, in tests
//! plain structs.
//!
//! GPIO_READ samples the line level through [`InputPin`], so an external
//! pull or a shorted line shows up even while the pin is driven.

use embedded_hal::digital::{InputPin, StatefulOutputPin};
use heapless::Vec;
use log::debug;

use crate::config::BoardName;
use crate::error::DeviceError;
use crate::ports::{Peripherals, SensorDriver, SensorValue};

/// Default pin bank capacity.
pub const DEFAULT_PIN_SLOTS: usize = 16;

/// Concrete adapter combining pins, sensor and identity behind the port.
pub struct Board<P, S, const N: usize = DEFAULT_PIN_SLOTS>
where
    P: StatefulOutputPin + InputPin,
    S: SensorDriver,
{
    pins: Vec<(u8, P), N>,
    sensor: Option<S>,
    identity: BoardName,
}

impl<P, S, const N: usize> Board<P, S, N>
where
    P: StatefulOutputPin + InputPin,
    S: SensorDriver,
{
    pub fn new(identity: BoardName) -> Self {
        Self {
            pins: Vec::new(),
            sensor: None,
            identity,
        }
    }

    /// Register `pin` under wire id `id`. A second registration for the
    /// same id replaces the first. Returns the pin back if the bank is full.
    pub fn with_pin(mut self, id: u8, pin: P) -> Result<Self, P> {
        if let Some(slot) = self.pins.iter_mut().find(|(slot_id, _)| *slot_id == id) {
            slot.1 = pin;
            return Ok(self);
        }
        match self.pins.push((id, pin)) {
            Ok(()) => Ok(self),
            Err((_, pin)) => Err(pin),
        }
    }

    pub fn with_sensor(mut self, sensor: S) -> Self {
        self.sensor = Some(sensor);
        self
    }

    pub fn pin_count(&self) -> usize {
        self.pins.len()
    }

    pub fn has_sensor(&self) -> bool {
        self.sensor.is_some()
    }

    pub fn sensor_mut(&mut self) -> Option<&mut S> {
        self.sensor.as_mut()
    }

    fn pin_mut(&mut self, id: u8) -> Result<&mut P, DeviceError> {
        self.pins
            .iter_mut()
            .find(|(slot_id, _)| *slot_id == id)
            .map(|(_, pin)| pin)
            .ok_or(DeviceError::NotPresent)
    }
}

impl<P, S, const N: usize> Peripherals for Board<P, S, N>
where
    P: StatefulOutputPin + InputPin,
    S: SensorDriver,
{
    fn gpio_read(&mut self, pin: u8) -> Result<u8, DeviceError> {
        let high = self.pin_mut(pin)?.is_high().map_err(|_| DeviceError::Io)?;
        Ok(u8::from(high))
    }

    fn gpio_write(&mut self, pin: u8, value: u8) -> Result<(), DeviceError> {
        let line = self.pin_mut(pin)?;
        let res = if value != 0 {
            line.set_high()
        } else {
            line.set_low()
        };
        res.map_err(|_| DeviceError::Io)
    }

    fn sensor_read(&mut self) -> Result<SensorValue, DeviceError> {
        let sensor = self.sensor.as_mut().ok_or(DeviceError::NotPresent)?;
        sensor.sample_fetch()?;
        let value = sensor.channel_get()?;
        debug!("BOARD: sensor sample {}", value);
        Ok(value)
    }

    fn device_identity(&self) -> &[u8] {
        self.identity.as_bytes()
    }
}
