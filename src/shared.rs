//! Mutex-guarded driver handle for sharing one sensor between threads.

use crate::bus::Transport;
use crate::register::{HeaterCurrent, Resolution, VddStatus};
use crate::types::{ElectronicId, Error, FirmwareRevision, Si7021, TempAndRelHumid};

use embedded_hal::delay::DelayNs;
use std::sync::{Mutex, MutexGuard};

/// An [`Si7021`] behind a [`Mutex`].
///
/// Every call holds the lock from the first bus transaction to the last, settle delays included,
/// so a measurement's command, wait and read can never be split by another caller.
#[derive(Debug)]
pub struct SharedSi7021<T, Delay> {
    inner: Mutex<Si7021<T, Delay>>,
}

impl<T, Delay> SharedSi7021<T, Delay>
where
    T: Transport,
    Delay: DelayNs,
{
    /// Wrap an initialized driver
    pub fn new(sensor: Si7021<T, Delay>) -> Self {
        Self { inner: Mutex::new(sensor) }
    }

    /// Lock the driver for a custom sequence of operations.  A poisoned lock is reported as
    /// [`Error::InvalidState`].
    pub fn lock(&self) -> Result<MutexGuard<'_, Si7021<T, Delay>>, Error> {
        self.inner.lock().map_err(|_| Error::InvalidState)
    }

    /// Run `f` with exclusive access to the driver
    pub fn with<R>(&self, f: impl FnOnce(&mut Si7021<T, Delay>) -> Result<R, Error>) -> Result<R, Error> {
        let mut sensor = self.lock()?;
        f(&mut sensor)
    }

    /// Measure the temperature in degrees centigrade
    pub fn read_temperature(&self) -> Result<f32, Error> {
        self.with(|sensor| sensor.read_temperature())
    }

    /// Measure the relative humidity in percent
    pub fn read_humidity(&self) -> Result<f32, Error> {
        self.with(|sensor| sensor.read_humidity())
    }

    /// Measure relative humidity and the temperature taken along with it
    pub fn read_temperature_and_humidity(&self) -> Result<TempAndRelHumid, Error> {
        self.with(|sensor| sensor.read_temperature_and_humidity())
    }

    /// Measurement resolution
    pub fn get_resolution(&self) -> Result<Resolution, Error> {
        self.with(|sensor| sensor.get_resolution())
    }

    /// Change the measurement resolution
    pub fn set_resolution(&self, resolution: Resolution) -> Result<(), Error> {
        self.with(|sensor| sensor.set_resolution(resolution))
    }

    /// Whether the on-chip heater is enabled
    pub fn get_heater_status(&self) -> Result<bool, Error> {
        self.with(|sensor| sensor.get_heater_status())
    }

    /// Enable or disable the on-chip heater
    pub fn set_heater_status(&self, enabled: bool) -> Result<(), Error> {
        self.with(|sensor| sensor.set_heater_status(enabled))
    }

    /// Heater drive current
    pub fn get_heater_register(&self) -> Result<HeaterCurrent, Error> {
        self.with(|sensor| sensor.get_heater_register())
    }

    /// Set the heater drive current
    pub fn set_heater_register(&self, current: impl Into<HeaterCurrent>) -> Result<(), Error> {
        let current = current.into();
        self.with(|sensor| sensor.set_heater_register(current))
    }

    /// Supply voltage status
    pub fn read_vdd_status(&self) -> Result<VddStatus, Error> {
        self.with(|sensor| sensor.read_vdd_status())
    }

    /// Read the firmware revision
    pub fn read_firmware_revision(&self) -> Result<FirmwareRevision, Error> {
        self.with(|sensor| sensor.read_firmware_revision())
    }

    /// Read the 64-bit electronic ID
    pub fn get_electronic_id(&self) -> Result<ElectronicId, Error> {
        self.with(|sensor| sensor.get_electronic_id())
    }

    /// Software reset
    pub fn soft_reset(&self) -> Result<(), Error> {
        self.with(|sensor| sensor.soft_reset())
    }

    /// Unwrap the driver
    pub fn into_inner(self) -> Result<Si7021<T, Delay>, Error> {
        self.inner.into_inner().map_err(|_| Error::InvalidState)
    }
}
