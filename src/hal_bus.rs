//! [`Transport`] over any blocking [`embedded_hal::i2c::I2c`] bus.

use crate::bus::{BusConfig, BusMode, Frame, ReadBuf, Transaction, Transport, TransportError};

use embedded_hal::i2c::{ErrorKind, I2c};

/// Highest SCL frequency the Si7021 supports
const MAX_CLOCK_HZ: u32 = 1_000_000;

/// Adapter running [`Transaction`]s on an embedded-hal I²C bus.
///
/// Pin routing and clocking are fixed when the HAL bus is constructed, so [`Transport::configure`]
/// only validates the parameters.  The deadline passed to [`Transport::execute`] is left to the
/// HAL implementation, which owns the peripheral's timeout.  Every written byte must be
/// acknowledged; the HAL reports a missing acknowledge as an error and the write stops there.
#[derive(Debug)]
pub struct HalBus<I2C> {
    i2c: I2C,
    configured: bool,
    port: Option<u8>,
}

impl<I2C: I2c> HalBus<I2C> {
    /// Wrap an embedded-hal I²C bus
    pub fn new(i2c: I2C) -> Self {
        Self { i2c, configured: false, port: None }
    }

    /// Logical port the bus was installed on
    pub fn port(&self) -> Option<u8> {
        self.port
    }

    /// Give back the wrapped bus
    pub fn release(self) -> I2C {
        self.i2c
    }
}

fn map_i2c_error<E: embedded_hal::i2c::Error>(err: E) -> TransportError {
    match err.kind() {
        ErrorKind::ArbitrationLoss => TransportError::InvalidState,
        _ => TransportError::Fail,
    }
}

impl<I2C: I2c> Transport for HalBus<I2C> {
    fn configure(&mut self, config: &BusConfig) -> Result<(), TransportError> {
        if config.mode != BusMode::Master
            || config.sda_pin == config.scl_pin
            || config.clock_hz == 0
            || config.clock_hz > MAX_CLOCK_HZ
        {
            return Err(TransportError::InvalidArgument);
        }
        self.configured = true;
        Ok(())
    }

    fn install(&mut self, port: u8) -> Result<(), TransportError> {
        if !self.configured {
            return Err(TransportError::InvalidState);
        }
        self.port = Some(port);
        Ok(())
    }

    fn execute(&mut self, transaction: &Transaction, _timeout_ms: u32) -> Result<ReadBuf, TransportError> {
        if self.port.is_none() {
            return Err(TransportError::InvalidState);
        }
        let mut read_buf = ReadBuf::new();
        match transaction.frame()? {
            Frame::Write { address, payload } => {
                self.i2c.write(address, &payload).map_err(map_i2c_error)?;
            }
            Frame::Read { address, len } => {
                read_buf.resize_default(len).map_err(|_| TransportError::InvalidArgument)?;
                self.i2c.read(address, &mut read_buf).map_err(map_i2c_error)?;
            }
        }
        Ok(read_buf)
    }
}
