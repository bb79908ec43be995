//! Sentinel-valued front end for code written against the classic C-style Si7021 API.
//!
//! Failures are folded into out-of-band values that share the range of real readings, so prefer
//! the `Result` API on [`Si7021`] for new code.

use crate::bus::Transport;
use crate::hw_def::Command;
use crate::types::{Error, Si7021};

use embedded_hal::delay::DelayNs;

/// Returned by temperature and humidity reads that failed
pub const MEASUREMENT_SENTINEL: f32 = -999.0;
/// Returned by [`Legacy::get_heater_register`] when the command could not be sent
pub const HEATER_COMMAND_FAILED: u8 = 0xFF;
/// Returned by [`Legacy::get_heater_register`] when the register could not be read
pub const HEATER_READ_FAILED: u8 = 0xEE;
/// Returned by [`Legacy::read_firmware_revision`] when the command could not be sent
pub const FIRMWARE_COMMAND_FAILED: u8 = 0xEE;
/// Returned by [`Legacy::read_firmware_revision`] when the revision could not be read
pub const FIRMWARE_READ_FAILED: u8 = 0xDE;
/// Returned by [`Legacy::get_electronic_id`] on any failure
pub const ELECTRONIC_ID_SENTINEL: u64 = u64::MAX;

/// Numeric status code for a result: 0 on success, otherwise the classic error number
pub fn error_code(result: Result<(), Error>) -> u8 {
    match result {
        Ok(()) => 0x00,
        Err(Error::ConfigError) => 0x01,
        Err(Error::InstallError) => 0x02,
        Err(Error::NotFound) => 0x03,
        Err(Error::InvalidArgument) => 0x04,
        Err(Error::BusFailure) => 0x05,
        Err(Error::InvalidState) => 0x06,
        Err(Error::Timeout) => 0x07,
        Err(Error::ChecksumMismatch) => 0x08,
    }
}

/// Borrowed view of a driver returning sentinels instead of errors
#[derive(Debug)]
pub struct Legacy<'a, T, Delay> {
    sensor: &'a mut Si7021<T, Delay>,
}

impl<T, Delay> Si7021<T, Delay>
where
    T: Transport,
    Delay: DelayNs,
{
    /// Sentinel-valued view of this driver
    pub fn legacy(&mut self) -> Legacy<'_, T, Delay> {
        Legacy { sensor: self }
    }
}

impl<T, Delay> Legacy<'_, T, Delay>
where
    T: Transport,
    Delay: DelayNs,
{
    /// Temperature in degrees centigrade, or [`MEASUREMENT_SENTINEL`]
    pub fn read_temperature(&mut self) -> f32 {
        self.sensor.read_temperature().unwrap_or(MEASUREMENT_SENTINEL)
    }

    /// Relative humidity in percent, or [`MEASUREMENT_SENTINEL`]
    pub fn read_humidity(&mut self) -> f32 {
        self.sensor.read_humidity().unwrap_or(MEASUREMENT_SENTINEL)
    }

    fn command_then_byte(&mut self, cmd: Command, command_failed: u8, read_failed: u8) -> u8 {
        if self.sensor.ensure_ready().is_err() || self.sensor.write_command(cmd, &[]).is_err() {
            return command_failed;
        }
        match self.sensor.read_bytes::<1>() {
            Ok([byte]) => byte,
            Err(_) => read_failed,
        }
    }

    /// Raw heater register, or [`HEATER_COMMAND_FAILED`] / [`HEATER_READ_FAILED`]
    pub fn get_heater_register(&mut self) -> u8 {
        self.command_then_byte(Command::ReadHeaterReg, HEATER_COMMAND_FAILED, HEATER_READ_FAILED)
    }

    /// Raw firmware revision, or [`FIRMWARE_COMMAND_FAILED`] / [`FIRMWARE_READ_FAILED`]
    pub fn read_firmware_revision(&mut self) -> u8 {
        self.command_then_byte(Command::ReadFirmwareRev, FIRMWARE_COMMAND_FAILED, FIRMWARE_READ_FAILED)
    }

    /// Electronic ID, or [`ELECTRONIC_ID_SENTINEL`]
    pub fn get_electronic_id(&mut self) -> u64 {
        self.sensor.get_electronic_id().map_or(ELECTRONIC_ID_SENTINEL, |id| id.0)
    }

    /// Software reset as a numeric status code
    pub fn soft_reset(&mut self) -> u8 {
        error_code(self.sensor.soft_reset())
    }
}
