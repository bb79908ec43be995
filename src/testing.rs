//! In-memory Si7021 used by the unit tests.

use crate::bus::{BusConfig, Frame, ReadBuf, Transaction, Transport, TransportError};
use crate::crc8::checksum;
use crate::hw_def::{I2C_ADDR, USER_REG_FIELD_LSBIT_VDD_LOW, USER_REG_RESET_VALUE};

use std::vec::Vec;

/// Models the device's command set at register level and records every transaction it executes
#[derive(Debug)]
pub(crate) struct FakeSi7021 {
    pub present: bool,
    pub user_reg: u8,
    pub heater_reg: u8,
    pub temperature: u16,
    pub humidity: u16,
    pub corrupt_checksum: bool,
    pub sna: u32,
    pub snb: u32,
    pub firmware: u8,
    pub configure_result: Result<(), TransportError>,
    pub install_result: Result<(), TransportError>,
    /// (execution index, error) pairs; the transaction with that index fails with that error
    pub failures: Vec<(usize, TransportError)>,
    pub log: Vec<Frame>,
    pub timeouts: Vec<u32>,
    pub configured_with: Option<BusConfig>,
    pub installed_on: Option<u8>,
    pub previous_temperature: u16,
    pub pending: Vec<u8>,
}

impl Default for FakeSi7021 {
    fn default() -> Self {
        Self {
            present: true,
            user_reg: USER_REG_RESET_VALUE,
            heater_reg: 0x00,
            temperature: 0x683A,
            humidity: 0x7C80,
            corrupt_checksum: false,
            sna: 0x1122_3344,
            snb: 0x1566_7788,
            firmware: 0x20,
            configure_result: Ok(()),
            install_result: Ok(()),
            failures: Vec::new(),
            log: Vec::new(),
            timeouts: Vec::new(),
            configured_with: None,
            installed_on: None,
            previous_temperature: 0,
            pending: Vec::new(),
        }
    }
}

impl FakeSi7021 {
    pub fn fail_at(mut self, index: usize, err: TransportError) -> Self {
        self.failures.push((index, err));
        self
    }

    fn word(&self, value: u16) -> Vec<u8> {
        let crc = checksum(value) ^ if self.corrupt_checksum { 0xFF } else { 0x00 };
        let [msb, lsb] = value.to_be_bytes();
        std::vec![msb, lsb, crc]
    }

    fn command(&mut self, payload: &[u8]) -> Result<(), TransportError> {
        self.pending = match payload {
            [] => Vec::new(),
            [0xF3] => self.word(self.temperature),
            [0xF5] => {
                self.previous_temperature = self.temperature;
                self.word(self.humidity)
            }
            [0xE0] => self.previous_temperature.to_be_bytes().to_vec(),
            [0xE7] => std::vec![self.user_reg],
            [0xE6, value] => {
                let vdd = 1 << USER_REG_FIELD_LSBIT_VDD_LOW;
                self.user_reg = (value & !vdd) | (self.user_reg & vdd);
                Vec::new()
            }
            [0x11] => std::vec![self.heater_reg],
            [0x51, value] => {
                self.heater_reg = *value;
                Vec::new()
            }
            [0xFA, 0x0F] => self.sna.to_be_bytes().to_vec(),
            [0xFC, 0xC9] => self.snb.to_be_bytes().to_vec(),
            [0x84, 0xB8] => std::vec![self.firmware],
            [0xFE] => {
                self.user_reg = USER_REG_RESET_VALUE;
                self.heater_reg = 0x00;
                Vec::new()
            }
            _ => return Err(TransportError::Fail),
        };
        Ok(())
    }
}

impl Transport for FakeSi7021 {
    fn configure(&mut self, config: &BusConfig) -> Result<(), TransportError> {
        self.configured_with = Some(*config);
        self.configure_result
    }

    fn install(&mut self, port: u8) -> Result<(), TransportError> {
        self.installed_on = Some(port);
        self.install_result
    }

    fn execute(&mut self, transaction: &Transaction, timeout_ms: u32) -> Result<ReadBuf, TransportError> {
        let index = self.log.len();
        let frame = transaction.frame()?;
        self.log.push(frame.clone());
        self.timeouts.push(timeout_ms);

        if let Some((_, err)) = self.failures.iter().find(|(ii, _)| *ii == index) {
            return Err(*err);
        }

        let mut read_buf = ReadBuf::new();
        match frame {
            Frame::Write { address, .. } | Frame::Read { address, .. }
                if address != I2C_ADDR || !self.present =>
            {
                return Err(TransportError::Fail);
            }
            Frame::Write { payload, .. } => self.command(&payload)?,
            Frame::Read { len, .. } => {
                if self.pending.len() < len {
                    return Err(TransportError::Fail);
                }
                read_buf
                    .extend_from_slice(&self.pending[..len])
                    .map_err(|_| TransportError::InvalidArgument)?;
                self.pending.clear();
            }
        }
        Ok(read_buf)
    }
}

/// Delay that only adds up how long it was asked to wait
#[derive(Debug, Default)]
pub(crate) struct RecordingDelay {
    pub total_ns: u64,
}

impl RecordingDelay {
    pub fn total_ms(&self) -> u64 {
        self.total_ns / 1_000_000
    }
}

impl embedded_hal::delay::DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
    }
}

#[cfg(feature = "async")]
impl embedded_hal_async::delay::DelayNs for RecordingDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
    }
}
