//! Command dispatcher: routes one validated command to the board.
//!
//! Dispatch is a pure mapping from command type to handler. Every
//! handler returns a [`ResponsePacket`]; peripheral failures become a
//! nonzero status, so any syntactically valid command gets an answer.
//!
//! | cmd          | needs            | reply on success          |
//! |--------------|------------------|---------------------------|
//! | GPIO_READ    | `[pin]`          | `[level]`                 |
//! | GPIO_WRITE   | `[pin, value]`   | empty                     |
//! | SENSOR_READ  | none             | `val1:i32 val2:i32` LE    |
//! | DEVICE_INFO  | none             | identity bytes            |
//! | HEALTH_CHECK | none             | `[0x01]`                  |

use log::{debug, info, warn};

use super::packet::{CommandPacket, CommandType, MAX_RESP_DATA, ResponsePacket};
use crate::error::{DeviceError, Status};
use crate::ports::Peripherals;

/// Payload of a HEALTH_CHECK reply.
pub const ALIVE: u8 = 0x01;

/// Executes commands against an injected peripheral port.
pub struct Dispatcher<P: Peripherals> {
    peripherals: P,
}

impl<P: Peripherals> Dispatcher<P> {
    pub fn new(peripherals: P) -> Self {
        Self { peripherals }
    }

    pub fn peripherals(&self) -> &P {
        &self.peripherals
    }

    pub fn peripherals_mut(&mut self) -> &mut P {
        &mut self.peripherals
    }

    pub fn into_peripherals(self) -> P {
        self.peripherals
    }

    /// Execute `cmd` and build its response.
    pub fn dispatch(&mut self, cmd: &CommandPacket) -> ResponsePacket {
        debug!(
            "DISPATCH: type=0x{:02x} len={}",
            cmd.cmd_type,
            cmd.data_len()
        );

        match cmd.command_type() {
            Ok(CommandType::GpioRead) => self.gpio_read(&cmd.data),
            Ok(CommandType::GpioWrite) => self.gpio_write(&cmd.data),
            Ok(CommandType::SensorRead) => self.sensor_read(),
            Ok(CommandType::DeviceInfo) => self.device_info(),
            Ok(CommandType::HealthCheck) => {
                info!("Health check OK");
                ResponsePacket::ok(&[ALIVE])
            }
            Err(raw) => {
                warn!("Unknown command: 0x{:02x}", raw);
                ResponsePacket::error(Status::Unsupported)
            }
        }
    }

    fn gpio_read(&mut self, data: &[u8]) -> ResponsePacket {
        let Some(&pin) = data.first() else {
            return ResponsePacket::error(Status::InvalidArgument);
        };

        match self.peripherals.gpio_read(pin) {
            Ok(level) => {
                info!("GPIO read pin {} = {}", pin, level);
                ResponsePacket::ok(&[level])
            }
            Err(e) => {
                warn!("GPIO read pin {} failed: {}", pin, e);
                ResponsePacket::error(Status::DeviceUnavailable)
            }
        }
    }

    fn gpio_write(&mut self, data: &[u8]) -> ResponsePacket {
        let &[pin, value, ..] = data else {
            return ResponsePacket::error(Status::InvalidArgument);
        };

        match self.peripherals.gpio_write(pin, value) {
            Ok(()) => {
                info!("GPIO write pin {} = {}", pin, value);
                ResponsePacket::ok(&[])
            }
            Err(e) => {
                warn!("GPIO write pin {} failed: {}", pin, e);
                ResponsePacket::error(write_failure_status(e))
            }
        }
    }

    fn sensor_read(&mut self) -> ResponsePacket {
        match self.peripherals.sensor_read() {
            Ok(value) => {
                info!("Sensor read: {}", value);
                ResponsePacket::ok(&value.to_le_bytes())
            }
            Err(e) => {
                warn!("Sensor read failed: {}", e);
                ResponsePacket::error(Status::DeviceUnavailable)
            }
        }
    }

    fn device_info(&self) -> ResponsePacket {
        let identity = self.peripherals.device_identity();
        let len = identity.len().min(MAX_RESP_DATA - 1);
        ResponsePacket::ok(&identity[..len])
    }
}

/// GPIO_WRITE passes the driver's failure through; absence is still
/// reported as an unavailable device.
fn write_failure_status(err: DeviceError) -> Status {
    match err {
        DeviceError::NotPresent | DeviceError::NotReady => Status::DeviceUnavailable,
        DeviceError::Io => Status::IoError,
    }
}
